//! Errors surfaced by the parser.
//!
//! Everything that goes wrong while reading markup collapses into
//! `Error::MalformedMarkup`: the parse is aborted and no partial tree is
//! returned. Unknown entities and values that fail to coerce are not
//! errors; they fall back to their literal text.

use std::fmt;

use crate::span::Location;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// What kind of markup problem stopped the parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCode {
    /// `<name ...` without a closing `>`
    UnclosedTag = 0,
    /// `<!--` without `-->`
    UnclosedComment,
    /// `<?` without `?>`
    UnclosedProcessingInstruction,
    /// `<!DOCTYPE` (or other `<!` declaration) without its final `>`
    UnclosedDoctype,
    /// `<![CDATA[` without `]]>`
    UnclosedCData,
    /// Tag name missing or starting with a character not allowed in names
    InvalidTagName,
    /// Anything but whitespace between a close tag's name and `>`
    InvalidCloseTag,
    /// `</b>` while `<a>` is the innermost open element
    MismatchedCloseTag,
    /// `</a>` with no element open
    UnexpectedCloseTag,
    /// End of input with elements still open
    UnclosedElement,
}

impl ErrorCode {
    /// Get a human-readable message for this error code.
    pub fn message(self) -> &'static str {
        match self {
            Self::UnclosedTag => "unclosed tag",
            Self::UnclosedComment => "unclosed comment",
            Self::UnclosedProcessingInstruction => "unclosed processing instruction",
            Self::UnclosedDoctype => "unclosed doctype",
            Self::UnclosedCData => "unclosed cdata section",
            Self::InvalidTagName => "invalid tag name",
            Self::InvalidCloseTag => "invalid close tag",
            Self::MismatchedCloseTag => "mismatched close tag",
            Self::UnexpectedCloseTag => "unexpected close tag",
            Self::UnclosedElement => "unclosed element",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input is not well-formed enough to build a tree.
    #[error("malformed markup at {location} (byte {offset}): {code}")]
    MalformedMarkup {
        code: ErrorCode,
        offset: usize,
        location: Location,
    },

    /// An options document could not be deserialized.
    #[error("invalid options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn malformed(code: ErrorCode, source: &str, offset: usize) -> Self {
        Error::MalformedMarkup {
            code,
            offset,
            location: Location::from_offset(source, offset),
        }
    }

    /// The markup error code, if this is a markup error.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Error::MalformedMarkup { code, .. } => Some(*code),
            Error::InvalidOptions(_) => None,
        }
    }

    /// Byte offset of the offending markup, if this is a markup error.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::MalformedMarkup { offset, .. } => Some(*offset),
            Error::InvalidOptions(_) => None,
        }
    }
}
