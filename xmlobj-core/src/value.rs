//! Output tree values and scalar coercion.
//!
//! Typing is value sniffing, gated by options: a text run becomes a
//! boolean or number only when it matches one of the patterns in
//! [`Value::coerce`] exactly. Everything else stays a string.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// Insertion-ordered mapping used for element objects.
pub type Map = IndexMap<String, Value>;

/// A node in the output tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Text that was not coerced (or did not match any pattern).
    String(String),

    /// `true` or `false` (lowercase only)
    Bool(bool),

    /// Decimal integer: `42`, `-7`, `045` (leading zeros are not octal)
    Integer(i64),

    /// Decimal fraction: `65.34`; also integers too large for `i64`
    Float(f64),

    /// Repeated sibling elements, in document order.
    Array(Vec<Value>),

    /// Attributes, child elements and text of an element.
    Object(Map),
}

impl Value {
    /// Classify `text` as a boolean, integer, float or string.
    ///
    /// With `enabled` false the text is always returned as a string.
    /// The caller is responsible for trimming.
    pub fn coerce(text: &str, enabled: bool) -> Value {
        if !enabled {
            return Value::String(text.to_owned());
        }

        match text {
            "true" => return Value::Bool(true),
            "false" => return Value::Bool(false),
            _ => {}
        }

        Self::try_parse_number(text).unwrap_or_else(|| Value::String(text.to_owned()))
    }

    /// `[+-]?digits` or `[+-]?digits.digits`, nothing else.
    fn try_parse_number(text: &str) -> Option<Value> {
        let unsigned = text.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(text);
        let (int_part, frac_part) = match unsigned.split_once('.') {
            Some((int_part, frac_part)) => (int_part, Some(frac_part)),
            None => (unsigned, None),
        };

        if !is_digits(int_part) {
            return None;
        }

        match frac_part {
            None => match text.parse::<i64>() {
                Ok(i) => Some(Value::Integer(i)),
                // Out of i64 range
                Err(_) => parse_finite(text),
            },
            Some(frac) if is_digits(frac) => parse_finite(text),
            Some(_) => None,
        }
    }

    /// Check if this is a string value.
    #[inline]
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Check if this is an object value.
    #[inline]
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// Check if this is an array value.
    #[inline]
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Try to get as string.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as boolean.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as integer.
    #[inline]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as float. Integers widen.
    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    #[inline]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    #[inline]
    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Look up `key` if this is an object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }
}

/// Digit runs past the `f64` range stay strings.
fn parse_finite(text: &str) -> Option<Value> {
    text.parse::<f64>().ok().filter(|f| f.is_finite()).map(Value::Float)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::String(s) => serializer.serialize_str(s),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(map) => {
                let mut ser = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    ser.serialize_entry(key, value)?;
                }
                ser.end()
            }
        }
    }
}

/// Nested containers are drained onto a heap worklist so that dropping a
/// deeply nested tree does not recurse once per level.
impl Drop for Value {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        take_children(self, &mut pending);
        while let Some(mut value) = pending.pop() {
            take_children(&mut value, &mut pending);
        }
    }
}

fn take_children(value: &mut Value, pending: &mut Vec<Value>) {
    match value {
        Value::Array(items) => pending.append(items),
        Value::Object(map) => pending.extend(map.drain(..).map(|(_, child)| child)),
        _ => {}
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}
