//! Character entity decoding.
//!
//! Matching is non-strict: `&` followed by a known entity name decodes
//! whether or not a `;` follows (`foo&ampbar` → `foo&bar`). A `;` right
//! after the name is consumed. Numeric references (`&#38;`, `&#x26;`)
//! need their `;`. Anything unrecognized is copied through verbatim.
//!
//! Uses Cow for zero-copy when no `&` is present.

use std::borrow::Cow;

use memchr::memchr;
use phf::phf_map;

static NAMED: phf::Map<&'static str, &'static str> = phf_map! {
    "amp" => "&",
    "apos" => "'",
    "lt" => "<",
    "gt" => ">",
    "quot" => "\"",
};

/// Longest key in `NAMED`.
const MAX_NAME_LEN: usize = 4;

/// Decode entity references in `input`.
///
/// Returns Borrowed if there is no `&` at all.
pub fn decode(input: &str) -> Cow<'_, str> {
    let bytes = input.as_bytes();
    let Some(first) = memchr(b'&', bytes) else {
        return Cow::Borrowed(input);
    };

    let mut out = String::with_capacity(input.len());
    out.push_str(&input[..first]);
    let mut pos = first;

    while pos < input.len() {
        match memchr(b'&', &bytes[pos..]) {
            Some(offset) => {
                out.push_str(&input[pos..pos + offset]);
                pos += offset;
                let tail = &input[pos + 1..];
                match decode_reference(tail) {
                    Some((decoded, consumed)) => {
                        out.push_str(decoded.as_ref());
                        pos += 1 + consumed;
                    }
                    None => {
                        out.push('&');
                        pos += 1;
                    }
                }
            }
            None => {
                out.push_str(&input[pos..]);
                break;
            }
        }
    }

    Cow::Owned(out)
}

/// Decode the reference at the start of `tail` (the text after `&`).
///
/// Returns the replacement and the number of bytes of `tail` it used.
fn decode_reference(tail: &str) -> Option<(Cow<'static, str>, usize)> {
    if let Some(numeric) = tail.strip_prefix('#') {
        let (ch, used) = decode_numeric(numeric)?;
        return Some((Cow::Owned(ch.to_string()), used + 1));
    }

    let run = tail
        .bytes()
        .take(MAX_NAME_LEN)
        .take_while(u8::is_ascii_alphabetic)
        .count();

    (1..=run).rev().find_map(|len| {
        NAMED.get(&tail[..len]).map(|&text| {
            let used = if tail.as_bytes().get(len) == Some(&b';') { len + 1 } else { len };
            (Cow::Borrowed(text), used)
        })
    })
}

/// `NN;` or `xHH;` after `&#`.
fn decode_numeric(body: &str) -> Option<(char, usize)> {
    let (digits, radix, prefix) = match body.strip_prefix(|c: char| c == 'x' || c == 'X') {
        Some(hex) => (hex, 16, 1),
        None => (body, 10, 0),
    };
    let len = digits.bytes().take_while(|b| b.is_ascii_hexdigit()).count();
    if len == 0 || digits.as_bytes().get(len) != Some(&b';') {
        return None;
    }
    let code = u32::from_str_radix(&digits[..len], radix).ok()?;
    let ch = char::from_u32(code)?;
    Some((ch, prefix + len + 1))
}
