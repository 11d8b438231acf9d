//! xmlobj Core
//!
//! Converts XML text into a plain, ordered key/value tree: attributes,
//! text and child elements become object entries, repeated siblings become
//! arrays, and text values can be coerced to booleans and numbers.
//!
//! ```
//! use xmlobj_core::{parse, Options, Value};
//!
//! let tree = parse("<r><t>value</t><t>45</t></r>", &Options::default()).unwrap();
//! let items = tree.get("r").and_then(|r| r.get("t")).and_then(Value::as_array).unwrap();
//! assert_eq!(items, &[Value::from("value"), Value::Integer(45)]);
//! ```
//!
//! # Architecture
//!
//! - **scanner.rs** - Lazy markup scanner emitting `Event`s
//! - **event.rs** - Scanner event enum
//! - **tree.rs** - Explicit-stack tree builder, array promotion, merge rules
//! - **attributes.rs** - `name="value"` extraction and key placement
//! - **namespace.rs** - Prefix stripping and `xmlns` detection
//! - **entities.rs** - Entity reference decoding
//! - **value.rs** - Output value type and scalar coercion
//! - **options.rs** - Conversion options
//! - **span.rs** - Span/Location types
//! - **error.rs** - Error type

pub mod attributes;
pub mod entities;
pub mod error;
pub mod event;
pub mod namespace;
pub mod options;
pub mod scanner;
pub mod span;
mod tree;
pub mod value;

use log::debug;

pub use error::{Error, ErrorCode, Result};
pub use event::{Event, SkipKind};
pub use options::Options;
pub use scanner::Scanner;
pub use span::{Location, Span};
pub use value::{Map, Value};

use tree::TreeBuilder;

/// Parse `xml` into a tree keyed by its top-level element names.
///
/// The result is always a `Value::Object`. Malformed markup aborts the
/// whole parse; no partial tree is returned.
pub fn parse(xml: &str, options: &Options) -> Result<Value> {
    debug!("parsing {} bytes", xml.len());

    let mut builder = TreeBuilder::new(xml, options);
    for event in Scanner::new(xml) {
        builder.handle_event(event?)?;
    }
    let tree = builder.finish()?;

    debug!("parsed {} top-level element(s)", tree.as_object().map_or(0, Map::len));
    Ok(tree)
}

/// Like [`parse`], for byte buffers. Invalid UTF-8 is replaced with U+FFFD.
pub fn parse_bytes(xml: &[u8], options: &Options) -> Result<Value> {
    parse(&String::from_utf8_lossy(xml), options)
}

/// The raw event stream for `xml`, without building a tree.
pub fn scan(xml: &str) -> Scanner<'_> {
    Scanner::new(xml)
}
