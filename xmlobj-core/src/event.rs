//! Scanner events - the flat token stream the tree builder consumes.
//!
//! Events carry no interpretation: names keep their namespace prefix,
//! attribute text is raw, and text runs are verbatim (no trimming, no
//! entity decoding). All of that happens in the tree builder.
//!
//! ## Event Sequences
//!
//! `<a x='1'>hi<b/></a>` emits:
//! ```text
//! OpenTag { name: "a", attrs: " x='1'", self_closing: false }
//! Text("hi")
//! OpenTag { name: "b", attrs: "", self_closing: true }
//! CloseTag { name: "a" }
//! ```
//!
//! A self-closing tag is a single event; there is no matching `CloseTag`.

use crate::span::Span;

/// What a `Skip` event stood for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipKind {
    /// `<!-- ... -->`
    Comment,
    /// `<? ... ?>`, including the XML declaration
    ProcessingInstruction,
    /// `<!DOCTYPE ...>` or any other `<!` declaration
    Doctype,
}

/// Scanner events.
///
/// The lifetime `'a` refers to the source buffer - all string fields
/// are zero-copy slices of the input text.
#[derive(Debug, Clone, PartialEq)]
pub enum Event<'a> {
    /// `<name attrs>` or `<name attrs/>`
    OpenTag {
        name: &'a str,
        /// Everything between the name and `>` / `/>`.
        attrs: &'a str,
        self_closing: bool,
        span: Span,
    },

    /// `</name>`
    CloseTag { name: &'a str, span: Span },

    /// Character data between tags.
    Text { content: &'a str, span: Span },

    /// Body of a `<![CDATA[ ... ]]>` section.
    CData { content: &'a str, span: Span },

    /// Comment, processing instruction or DOCTYPE block.
    Skip { kind: SkipKind, span: Span },
}

impl<'a> Event<'a> {
    /// Get the span for this event.
    pub fn span(&self) -> Span {
        match self {
            Event::OpenTag { span, .. } => *span,
            Event::CloseTag { span, .. } => *span,
            Event::Text { span, .. } => *span,
            Event::CData { span, .. } => *span,
            Event::Skip { span, .. } => *span,
        }
    }

    /// Tag name for open and close events.
    pub fn name(&self) -> Option<&'a str> {
        match self {
            Event::OpenTag { name, .. } | Event::CloseTag { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Check if this event opens an element that expects a close tag.
    pub fn is_structure_start(&self) -> bool {
        matches!(self, Event::OpenTag { self_closing: false, .. })
    }

    /// Check if this event carries character data.
    pub fn is_content(&self) -> bool {
        matches!(self, Event::Text { .. } | Event::CData { .. })
    }
}
