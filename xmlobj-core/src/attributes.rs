//! Attribute parsing.
//!
//! Works on the raw text between a tag name and its `>` / `/>`, as
//! captured by the scanner. Pairs are `name="value"` or `name='value'`
//! with optional whitespace around `=`; anything that does not form a
//! pair (bare names, unquoted values, stray quotes) is skipped.

use crate::namespace;
use crate::options::Options;
use crate::value::Value;

/// A `name="value"` pair exactly as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawAttribute<'a> {
    /// Attribute name (may include namespace prefix)
    pub name: &'a str,
    /// Text between the quotes, untouched
    pub value: &'a str,
}

/// Extract every quoted `name=value` pair, in document order.
pub fn scan(raw: &str) -> Vec<RawAttribute<'_>> {
    let bytes = raw.as_bytes();
    let mut attrs = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        pos = skip_whitespace(bytes, pos);
        if pos >= bytes.len() {
            break;
        }

        let name_start = pos;
        while pos < bytes.len() && !is_whitespace(bytes[pos]) && !matches!(bytes[pos], b'=' | b'"' | b'\'') {
            pos += 1;
        }
        let name = &raw[name_start..pos];

        if name.is_empty() {
            // Stray `=` or a quoted run with no name in front of it
            pos = match bytes[pos] {
                quote @ (b'"' | b'\'') => closing_quote(bytes, pos + 1, quote).map_or(bytes.len(), |end| end + 1),
                _ => pos + 1,
            };
            continue;
        }

        pos = skip_whitespace(bytes, pos);
        if pos >= bytes.len() || bytes[pos] != b'=' {
            // Bare name without a value
            continue;
        }
        pos = skip_whitespace(bytes, pos + 1);
        if pos >= bytes.len() {
            break;
        }

        match bytes[pos] {
            quote @ (b'"' | b'\'') => {
                let value_start = pos + 1;
                let Some(end) = closing_quote(bytes, value_start, quote) else {
                    break;
                };
                attrs.push(RawAttribute {
                    name,
                    value: &raw[value_start..end],
                });
                pos = end + 1;
            }
            _ => {
                // Unquoted value: skip it
                while pos < bytes.len() && !is_whitespace(bytes[pos]) {
                    pos += 1;
                }
            }
        }
    }

    attrs
}

/// Parse a tag's attribute text into output entries.
///
/// Keys carry `options.attribute_name_prefix`. With `ignore_namespace`,
/// `xmlns*` declarations are dropped and other prefixes stripped. Values
/// are trimmed, decoded and coerced according to `options`.
pub fn parse(raw: &str, options: &Options) -> Vec<(String, Value)> {
    if options.ignore_attributes {
        return Vec::new();
    }

    scan(raw)
        .into_iter()
        .filter(|attr| !(options.ignore_namespace && namespace::is_declaration(attr.name)))
        .map(|attr| {
            let name = if options.ignore_namespace {
                namespace::strip_prefix(attr.name)
            } else {
                attr.name
            };
            let key = format!("{}{}", options.attribute_name_prefix, name);
            let value = Value::coerce(&options.clean(attr.value), options.parse_attribute_value);
            (key, value)
        })
        .collect()
}

#[inline]
fn closing_quote(bytes: &[u8], from: usize, quote: u8) -> Option<usize> {
    memchr::memchr(quote, &bytes[from..]).map(|p| from + p)
}

#[inline]
fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && is_whitespace(bytes[pos]) {
        pos += 1;
    }
    pos
}

#[inline]
fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &str) -> Vec<(&str, &str)> {
        scan(raw).into_iter().map(|a| (a.name, a.value)).collect()
    }

    #[test]
    fn test_scan_quotes_and_spacing() {
        assert_eq!(
            pairs(r#" a="1" b='two' c = "x y"  d='it"s'"#),
            vec![("a", "1"), ("b", "two"), ("c", "x y"), ("d", "it\"s")]
        );
    }

    #[test]
    fn test_scan_prefixed_and_multiline() {
        assert_eq!(
            pairs(" ns:arg='value'\n\tns:arg2='value2' "),
            vec![("ns:arg", "value"), ("ns:arg2", "value2")]
        );
    }

    #[test]
    fn test_scan_skips_malformed_pieces() {
        assert_eq!(pairs(r#" checked a="1""#), vec![("a", "1")]);
        assert_eq!(pairs(r#" x=1 y="2""#), vec![("y", "2")]);
        assert_eq!(pairs(r#" "junk" z='3'"#), vec![("z", "3")]);
        assert_eq!(pairs(r#" = w="4""#), vec![("w", "4")]);
        assert_eq!(pairs(r#" open="never"#), vec![]);
        assert_eq!(pairs(""), vec![]);
    }

    #[test]
    fn test_parse_ignored_by_default() {
        assert!(parse(" a='1'", &Options::default()).is_empty());
    }

    #[test]
    fn test_parse_prefix_and_coercion() {
        let mut opts = Options::with_attributes();
        assert_eq!(
            parse(" int='045' float='65.34'", &opts),
            vec![
                ("@_int".to_owned(), Value::from("045")),
                ("@_float".to_owned(), Value::from("65.34")),
            ]
        );

        opts.parse_attribute_value = true;
        opts.attribute_name_prefix = String::new();
        assert_eq!(
            parse(" int='045' float='65.34' flag='true'", &opts),
            vec![
                ("int".to_owned(), Value::Integer(45)),
                ("float".to_owned(), Value::Float(65.34)),
                ("flag".to_owned(), Value::Bool(true)),
            ]
        );
    }

    #[test]
    fn test_parse_namespace_handling() {
        let raw = " xmlns='urn:a' xmlns:tns='urn:none' tns:attr='tns' plain='p'";

        let mut opts = Options::with_attributes();
        let kept: Vec<_> = parse(raw, &opts).into_iter().map(|(k, _)| k).collect();
        assert_eq!(kept, ["@_xmlns", "@_xmlns:tns", "@_tns:attr", "@_plain"]);

        opts.ignore_namespace = true;
        assert_eq!(
            parse(raw, &opts),
            vec![
                ("@_attr".to_owned(), Value::from("tns")),
                ("@_plain".to_owned(), Value::from("p")),
            ]
        );
    }

    #[test]
    fn test_parse_trimming_and_entities() {
        let mut opts = Options::with_attributes();
        assert_eq!(parse(" a=' some val '", &opts), vec![("@_a".to_owned(), Value::from("some val"))]);

        opts.trim_values = false;
        assert_eq!(parse(" a=' some val '", &opts), vec![("@_a".to_owned(), Value::from(" some val "))]);

        opts.decode_html_char = true;
        assert_eq!(
            parse(r#" q="Meeting &apos;A&apos; &amp; more""#, &opts),
            vec![("@_q".to_owned(), Value::from("Meeting 'A' & more"))]
        );
    }
}
