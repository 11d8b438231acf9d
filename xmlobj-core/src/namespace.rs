//! Namespace prefix handling.
//!
//! Only consulted when `Options::ignore_namespace` is set. Prefixes are
//! not resolved against their URIs; they are simply dropped.

use memchr::memchr;

/// `prefix:local` → `local`. Names without a `:` come back unchanged.
#[inline]
pub fn strip_prefix(name: &str) -> &str {
    split_name(name).1
}

/// Split a name at its first `:` into `(prefix, local)`.
pub fn split_name(name: &str) -> (Option<&str>, &str) {
    match memchr(b':', name.as_bytes()) {
        Some(colon) => (Some(&name[..colon]), &name[colon + 1..]),
        None => (None, name),
    }
}

/// `xmlns` or `xmlns:*` - a namespace declaration, not data.
#[inline]
pub fn is_declaration(attr_name: &str) -> bool {
    attr_name == "xmlns" || attr_name.starts_with("xmlns:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_prefix() {
        assert_eq!(strip_prefix("soapenv:Envelope"), "Envelope");
        assert_eq!(strip_prefix("Envelope"), "Envelope");
        assert_eq!(strip_prefix("a:b:c"), "b:c");
    }

    #[test]
    fn test_split_name() {
        assert_eq!(split_name("ns:arg"), (Some("ns"), "arg"));
        assert_eq!(split_name("arg"), (None, "arg"));
    }

    #[test]
    fn test_is_declaration() {
        assert!(is_declaration("xmlns"));
        assert!(is_declaration("xmlns:tns"));
        assert!(!is_declaration("xmlnsfoo"));
        assert!(!is_declaration("tns:attr"));
    }
}
