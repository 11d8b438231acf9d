//! Parser options.
//!
//! A plain record with explicit defaults. The serde names follow the
//! camelCase keys commonly used for this kind of converter, so an options
//! document like `{"ignoreAttributes": false, "textNodeName": "_text"}`
//! can be loaded with [`Options::from_json`]. Missing keys take their
//! default; unknown keys are ignored.

use std::borrow::Cow;

use serde::Deserialize;

use crate::entities;
use crate::error::Result;

/// Conversion rules applied by [`parse`](crate::parse).
///
/// The defaults drop attributes, keep namespace prefixes, coerce text
/// values, trim whitespace and leave entities alone.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    /// Drop every attribute.
    pub ignore_attributes: bool,

    /// Drop the attributes of elements that contain child elements.
    pub ignore_non_text_node_attr: bool,

    /// Strip `prefix:` from tag and attribute names and drop `xmlns*`.
    #[serde(rename = "ignoreNameSpace")]
    pub ignore_namespace: bool,

    /// Prepended to every attribute key.
    pub attribute_name_prefix: String,

    /// When set, attributes are grouped into one object under this key.
    pub attr_node_name: Option<String>,

    /// Key for an element's own text when it also has attributes or children.
    pub text_node_name: String,

    /// Coerce element text to booleans and numbers.
    pub parse_node_value: bool,

    /// Coerce attribute values to booleans and numbers.
    pub parse_attribute_value: bool,

    /// Trim leading and trailing whitespace from text and attribute values.
    pub trim_values: bool,

    /// Decode `&amp;`-style entity references.
    #[serde(rename = "decodeHTMLchar")]
    pub decode_html_char: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            ignore_attributes: true,
            ignore_non_text_node_attr: true,
            ignore_namespace: false,
            attribute_name_prefix: "@_".to_owned(),
            attr_node_name: None,
            text_node_name: "#text".to_owned(),
            parse_node_value: true,
            parse_attribute_value: false,
            trim_values: true,
            decode_html_char: false,
        }
    }
}

impl Options {
    /// Load options from a JSON object.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Shorthand for the defaults with attributes kept.
    pub fn with_attributes() -> Self {
        Self {
            ignore_attributes: false,
            ..Self::default()
        }
    }

    /// Trim and entity-decode a text or attribute value, in that order.
    pub(crate) fn clean<'a>(&self, raw: &'a str) -> Cow<'a, str> {
        let text = if self.trim_values { raw.trim() } else { raw };
        if self.decode_html_char {
            entities::decode(text)
        } else {
            Cow::Borrowed(text)
        }
    }
}
