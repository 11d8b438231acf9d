//! Markup scanner.
//!
//! Walks the raw text with a single cursor and yields [`Event`]s lazily.
//! Comments, processing instructions and DOCTYPE blocks come out as
//! `Skip` events so the tree builder never has to look inside them.
//!
//! The scanner does no recovery: the first malformed construct yields an
//! `Err` and the iterator is fused from then on.

use std::iter::FusedIterator;

use log::trace;
use memchr::{memchr, memmem};
use unicode_xid::UnicodeXID;

use crate::error::{Error, ErrorCode, Result};
use crate::event::{Event, SkipKind};
use crate::span::Span;

const CDATA_OPEN: &[u8] = b"<![CDATA[";

/// Lazy event iterator over an XML text buffer.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    input: &'a str,
    pos: usize,
    done: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0, done: false }
    }

    /// The source buffer being scanned.
    pub fn source(&self) -> &'a str {
        self.input
    }

    /// Current byte offset of the cursor.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn error(&self, code: ErrorCode, offset: usize) -> Error {
        Error::malformed(code, self.input, offset)
    }

    fn next_event(&mut self) -> Result<Event<'a>> {
        let bytes = self.input.as_bytes();
        let start = self.pos;

        if bytes[start] != b'<' {
            let end = memchr(b'<', &bytes[start..]).map_or(bytes.len(), |p| start + p);
            self.pos = end;
            return Ok(Event::Text {
                content: &self.input[start..end],
                span: Span::new(start, end),
            });
        }

        let rest = &bytes[start..];
        if rest.starts_with(b"<?") {
            self.skip_until(
                start,
                2,
                b"?>",
                SkipKind::ProcessingInstruction,
                ErrorCode::UnclosedProcessingInstruction,
            )
        } else if rest.starts_with(b"<!--") {
            self.skip_until(start, 4, b"-->", SkipKind::Comment, ErrorCode::UnclosedComment)
        } else if rest.starts_with(CDATA_OPEN) {
            self.scan_cdata(start)
        } else if rest.starts_with(b"<!") {
            self.scan_doctype(start)
        } else if rest.starts_with(b"</") {
            self.scan_close_tag(start)
        } else {
            self.scan_open_tag(start)
        }
    }

    fn skip_until(
        &mut self,
        start: usize,
        open_len: usize,
        terminator: &[u8],
        kind: SkipKind,
        code: ErrorCode,
    ) -> Result<Event<'a>> {
        let body = start + open_len;
        let found = memmem::find(&self.input.as_bytes()[body..], terminator)
            .ok_or_else(|| self.error(code, start))?;
        let end = body + found + terminator.len();
        self.pos = end;
        trace!("skipping {:?} at {}..{}", kind, start, end);
        Ok(Event::Skip { kind, span: Span::new(start, end) })
    }

    fn scan_cdata(&mut self, start: usize) -> Result<Event<'a>> {
        let body = start + CDATA_OPEN.len();
        let found = memmem::find(&self.input.as_bytes()[body..], b"]]>")
            .ok_or_else(|| self.error(ErrorCode::UnclosedCData, start))?;
        let end = body + found + 3;
        self.pos = end;
        Ok(Event::CData {
            content: &self.input[body..body + found],
            span: Span::new(start, end),
        })
    }

    /// `<!DOCTYPE ...>` with an optional `[ ... ]` internal subset.
    ///
    /// The block ends at the first `>` seen outside brackets, quoted
    /// literals and comments, so declarations such as `<!ELEMENT foo>`
    /// inside the subset do not end it early.
    fn scan_doctype(&mut self, start: usize) -> Result<Event<'a>> {
        let bytes = self.input.as_bytes();
        let mut depth = 0usize;
        let mut i = start + 2;

        while i < bytes.len() {
            match bytes[i] {
                b'[' => depth += 1,
                b']' => depth = depth.saturating_sub(1),
                quote @ (b'"' | b'\'') => match memchr(quote, &bytes[i + 1..]) {
                    Some(p) => i += p + 1,
                    None => return Err(self.error(ErrorCode::UnclosedDoctype, start)),
                },
                b'<' if bytes[i..].starts_with(b"<!--") => {
                    match memmem::find(&bytes[i + 4..], b"-->") {
                        Some(p) => i += 4 + p + 2,
                        None => return Err(self.error(ErrorCode::UnclosedComment, i)),
                    }
                }
                b'<' if bytes[i..].starts_with(b"<?") => match memmem::find(&bytes[i + 2..], b"?>") {
                    Some(p) => i += 2 + p + 1,
                    None => return Err(self.error(ErrorCode::UnclosedProcessingInstruction, i)),
                },
                b'>' if depth == 0 => {
                    let end = i + 1;
                    self.pos = end;
                    trace!("skipping doctype at {}..{}", start, end);
                    return Ok(Event::Skip {
                        kind: SkipKind::Doctype,
                        span: Span::new(start, end),
                    });
                }
                _ => {}
            }
            i += 1;
        }

        Err(self.error(ErrorCode::UnclosedDoctype, start))
    }

    fn scan_close_tag(&mut self, start: usize) -> Result<Event<'a>> {
        let bytes = self.input.as_bytes();
        let name_start = start + 2;
        let name_end = self.scan_name(name_start);
        if name_end == name_start {
            return Err(self.error(ErrorCode::InvalidTagName, name_start));
        }

        let mut i = name_end;
        while i < bytes.len() && is_whitespace(bytes[i]) {
            i += 1;
        }
        if i >= bytes.len() {
            return Err(self.error(ErrorCode::UnclosedTag, start));
        }
        if bytes[i] != b'>' {
            return Err(self.error(ErrorCode::InvalidCloseTag, i));
        }

        self.pos = i + 1;
        Ok(Event::CloseTag {
            name: &self.input[name_start..name_end],
            span: Span::new(start, i + 1),
        })
    }

    fn scan_open_tag(&mut self, start: usize) -> Result<Event<'a>> {
        let bytes = self.input.as_bytes();
        let name_start = start + 1;
        let name_end = self.scan_name(name_start);
        if name_end == name_start {
            return Err(self.error(ErrorCode::InvalidTagName, name_start));
        }
        if name_end < bytes.len() && !matches!(bytes[name_end], b'/' | b'>') && !is_whitespace(bytes[name_end]) {
            return Err(self.error(ErrorCode::InvalidTagName, name_end));
        }

        // First `>` outside a quoted attribute value
        let mut quote: Option<u8> = None;
        let mut i = name_end;
        loop {
            if i >= bytes.len() {
                return Err(self.error(ErrorCode::UnclosedTag, start));
            }
            let b = bytes[i];
            match quote {
                Some(q) if b == q => quote = None,
                Some(_) => {}
                None => match b {
                    b'"' | b'\'' => quote = Some(b),
                    b'>' => break,
                    b'<' => return Err(self.error(ErrorCode::UnclosedTag, start)),
                    _ => {}
                },
            }
            i += 1;
        }

        let inner = &self.input[name_end..i];
        let (attrs, self_closing) = match inner.trim_end().strip_suffix('/') {
            Some(attrs) => (attrs, true),
            None => (inner, false),
        };

        self.pos = i + 1;
        Ok(Event::OpenTag {
            name: &self.input[name_start..name_end],
            attrs,
            self_closing,
            span: Span::new(start, i + 1),
        })
    }

    /// Byte offset just past the tag name starting at `from`.
    fn scan_name(&self, from: usize) -> usize {
        self.input[from..]
            .char_indices()
            .find(|&(_, c)| !is_name_char(c))
            .map_or(self.input.len(), |(i, _)| from + i)
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Event<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.pos >= self.input.len() {
            return None;
        }
        let result = self.next_event();
        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }
}

impl FusedIterator for Scanner<'_> {}

/// Letters, digits, `_`, `.`, `-` and the namespace separator `:`.
#[inline]
pub(crate) fn is_name_char(c: char) -> bool {
    c.is_xid_continue() || matches!(c, '.' | '-' | ':')
}

#[inline]
fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(input: &str) -> Vec<Event<'_>> {
        Scanner::new(input).collect::<Result<Vec<_>>>().unwrap()
    }

    fn error_code(input: &str) -> ErrorCode {
        let err = Scanner::new(input)
            .find_map(|r| r.err())
            .expect("expected a scan error");
        err.code().unwrap()
    }

    #[test]
    fn test_open_text_close() {
        let evs = events("<a>hi</a>");
        assert_eq!(evs.len(), 3);
        assert!(matches!(evs[0], Event::OpenTag { name: "a", attrs: "", self_closing: false, .. }));
        assert!(matches!(evs[1], Event::Text { content: "hi", .. }));
        assert!(matches!(evs[2], Event::CloseTag { name: "a", .. }));
        assert_eq!(evs[2].span(), Span::new(5, 9));
    }

    #[test]
    fn test_self_closing_with_attrs() {
        let evs = events("<tag arg='value'/>");
        assert_eq!(evs.len(), 1);
        assert!(matches!(
            evs[0],
            Event::OpenTag { name: "tag", attrs: " arg='value'", self_closing: true, .. }
        ));

        let evs = events("<br />");
        assert!(matches!(evs[0], Event::OpenTag { name: "br", attrs: " ", self_closing: true, .. }));
    }

    #[test]
    fn test_quoted_gt_does_not_end_tag() {
        let evs = events(r#"<a expr="x > 1" other='/'>t</a>"#);
        assert!(matches!(
            evs[0],
            Event::OpenTag { name: "a", attrs: r#" expr="x > 1" other='/'"#, self_closing: false, .. }
        ));
    }

    #[test]
    fn test_names_keep_prefix_and_punctuation() {
        let evs = events("<root:node><tag.1/><my-el_x/></root:node>");
        let names: Vec<_> = evs.iter().filter_map(|e| e.name()).collect();
        assert_eq!(names, ["root:node", "tag.1", "my-el_x", "root:node"]);
    }

    #[test]
    fn test_event_classification() {
        let evs = events("<a><b/>t<![CDATA[c]]></a>");
        let starts: Vec<_> = evs.iter().map(Event::is_structure_start).collect();
        assert_eq!(starts, [true, false, false, false, false]);
        let content: Vec<_> = evs.iter().map(Event::is_content).collect();
        assert_eq!(content, [false, false, true, true, false]);
    }

    #[test]
    fn test_skips() {
        let evs = events("<?xml version=\"1.0\"?><!-- c --><a/>");
        assert!(matches!(evs[0], Event::Skip { kind: SkipKind::ProcessingInstruction, .. }));
        assert!(matches!(evs[1], Event::Skip { kind: SkipKind::Comment, .. }));
        assert!(matches!(evs[2], Event::OpenTag { name: "a", .. }));
    }

    #[test]
    fn test_doctype_internal_subset() {
        let input = "<!DOCTYPE foo [<!--define the internal DTD--><!ELEMENT foo (#PCDATA)>\
                     <!ATTLIST foo a CDATA \"x>y\">]><foo>Hello World.</foo>";
        let evs = events(input);
        assert!(matches!(evs[0], Event::Skip { kind: SkipKind::Doctype, .. }));
        assert!(matches!(evs[1], Event::OpenTag { name: "foo", .. }));
        assert!(matches!(evs[2], Event::Text { content: "Hello World.", .. }));
    }

    #[test]
    fn test_doctype_subset_with_pi() {
        let evs = events("<!DOCTYPE a [<?pi it's [ ?>]><a>1</a>");
        assert!(matches!(evs[0], Event::Skip { kind: SkipKind::Doctype, .. }));
        assert_eq!(evs[0].span(), Span::new(0, 29));
        assert!(matches!(evs[1], Event::OpenTag { name: "a", .. }));

        assert_eq!(error_code("<!DOCTYPE a [<?pi "), ErrorCode::UnclosedProcessingInstruction);
    }

    #[test]
    fn test_cdata_body_is_raw() {
        let evs = events("<a><![CDATA[<b>&amp;</b>]]></a>");
        assert!(matches!(evs[1], Event::CData { content: "<b>&amp;</b>", .. }));
        assert_eq!(evs.len(), 3);
    }

    #[test]
    fn test_text_is_verbatim() {
        let evs = events("  lead <a> x &amp; y </a>");
        assert!(matches!(evs[0], Event::Text { content: "  lead ", .. }));
        assert!(matches!(evs[2], Event::Text { content: " x &amp; y ", .. }));
    }

    #[test]
    fn test_close_tag_whitespace() {
        let evs = events("<a></a  >");
        assert!(matches!(evs[1], Event::CloseTag { name: "a", .. }));
    }

    #[test]
    fn test_errors() {
        assert_eq!(error_code("<a"), ErrorCode::UnclosedTag);
        assert_eq!(error_code("<a x='1>"), ErrorCode::UnclosedTag);
        assert_eq!(error_code("<a <b>"), ErrorCode::UnclosedTag);
        assert_eq!(error_code("<a></a"), ErrorCode::UnclosedTag);
        assert_eq!(error_code("<!-- never"), ErrorCode::UnclosedComment);
        assert_eq!(error_code("<?xml "), ErrorCode::UnclosedProcessingInstruction);
        assert_eq!(error_code("<!DOCTYPE x [ <!ELEMENT x> "), ErrorCode::UnclosedDoctype);
        assert_eq!(error_code("<![CDATA[ x"), ErrorCode::UnclosedCData);
        assert_eq!(error_code("< a>"), ErrorCode::InvalidTagName);
        assert_eq!(error_code("<>"), ErrorCode::InvalidTagName);
        assert_eq!(error_code("<a=1>"), ErrorCode::InvalidTagName);
        assert_eq!(error_code("<a></a b>"), ErrorCode::InvalidCloseTag);
    }

    #[test]
    fn test_fused_after_error() {
        let mut scanner = Scanner::new("<a><");
        assert!(scanner.next().unwrap().is_ok());
        assert!(scanner.next().unwrap().is_err());
        assert!(scanner.next().is_none());
    }

    #[test]
    fn test_position_tracks_cursor() {
        let input = "<a>hi</a>";
        let mut scanner = Scanner::new(input);
        assert_eq!(scanner.source(), input);
        assert_eq!(scanner.position(), 0);

        let mut ends = Vec::new();
        while let Some(event) = scanner.next() {
            event.unwrap();
            ends.push(scanner.position());
        }
        assert_eq!(ends, [3, 5, 9]);
        assert_eq!(scanner.position(), input.len());
    }

    #[test]
    fn test_error_offset_points_at_tag() {
        let err = Scanner::new("<r>\n  <unclosed").find_map(|r| r.err()).unwrap();
        assert_eq!(err.offset(), Some(6));
        match err {
            Error::MalformedMarkup { location, .. } => {
                assert_eq!((location.line, location.column), (2, 3));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
