//! Tree construction from scanner events.
//!
//! The builder keeps an explicit stack of open elements instead of
//! recursing, so document depth only costs heap. Each open element is a
//! [`NodeRecord`] that collects text and finished children; when its close
//! tag arrives it is folded into a [`Value`] and merged into its parent.
//!
//! # Merge rules
//!
//! - An element with neither attributes nor child elements becomes its
//!   coerced text, `""` if it had none.
//! - Otherwise it becomes an object: attributes first, then children in
//!   first-occurrence order, then the text under `text_node_name` if the
//!   text is not blank.
//! - The second sibling with a given name turns that key into an array;
//!   later siblings are appended.

use indexmap::map::Entry;
use indexmap::IndexMap;
use log::trace;

use crate::attributes;
use crate::error::{Error, ErrorCode, Result};
use crate::event::Event;
use crate::namespace;
use crate::options::Options;
use crate::span::Span;
use crate::value::{Map, Value};

// ============================================================================
// Child slots
// ============================================================================

/// Everything a parent has received under one child name.
#[derive(Debug, Clone, PartialEq)]
enum Child {
    Single(Value),
    Many(Vec<Value>),
}

impl Child {
    /// Add another sibling, promoting to `Many` on the second one.
    fn push(&mut self, value: Value) {
        *self = match std::mem::replace(self, Child::Many(Vec::new())) {
            Child::Single(first) => Child::Many(vec![first, value]),
            Child::Many(mut items) => {
                items.push(value);
                Child::Many(items)
            }
        };
    }

    fn into_value(self) -> Value {
        match self {
            Child::Single(value) => value,
            Child::Many(items) => Value::Array(items),
        }
    }
}

type Children = IndexMap<String, Child>;

/// Insert `value` under `key`, promoting repeated keys to arrays.
fn merge_child(children: &mut Children, key: String, value: Value) {
    match children.entry(key) {
        Entry::Occupied(mut slot) => {
            trace!("repeated sibling {:?}", slot.key());
            slot.get_mut().push(value);
        }
        Entry::Vacant(slot) => {
            slot.insert(Child::Single(value));
        }
    }
}

// ============================================================================
// NodeRecord
// ============================================================================

/// An element between its open and close tags.
#[derive(Debug)]
struct NodeRecord<'a> {
    /// Name as written, used to match the close tag.
    raw_name: &'a str,
    /// Name used as the key in the parent.
    key: &'a str,
    /// Raw attribute text, parsed when the element is finished.
    attrs: &'a str,
    text: String,
    /// Number of non-blank text runs appended to `text`.
    fragments: usize,
    children: Children,
    span: Span,
}

impl<'a> NodeRecord<'a> {
    fn new(raw_name: &'a str, attrs: &'a str, span: Span, options: &Options) -> Self {
        let key = if options.ignore_namespace {
            namespace::strip_prefix(raw_name)
        } else {
            raw_name
        };
        NodeRecord {
            raw_name,
            key,
            attrs,
            text: String::new(),
            fragments: 0,
            children: Children::new(),
            span,
        }
    }

    fn push_text(&mut self, fragment: &str) {
        if fragment.is_empty() {
            return;
        }
        if !fragment.trim().is_empty() {
            self.fragments += 1;
        }
        self.text.push_str(fragment);
    }

    /// Text split around child elements stays a plain string once joined.
    fn take_text_value(&mut self, options: &Options) -> Value {
        let text = std::mem::take(&mut self.text);
        if self.fragments > 1 {
            Value::String(text)
        } else {
            Value::coerce(&text, options.parse_node_value)
        }
    }

    /// Fold the record into its final value.
    fn finish(mut self, options: &Options) -> (String, Value) {
        let key = self.key.to_owned();
        let has_children = !self.children.is_empty();

        let attrs = if has_children && options.ignore_non_text_node_attr {
            Vec::new()
        } else {
            attributes::parse(self.attrs, options)
        };

        if attrs.is_empty() && !has_children {
            return (key, self.take_text_value(options));
        }

        let mut map = Map::with_capacity(attrs.len() + self.children.len() + 1);
        match &options.attr_node_name {
            Some(group) if !attrs.is_empty() => {
                map.insert(group.clone(), Value::Object(attrs.into_iter().collect()));
            }
            _ => map.extend(attrs),
        }

        for (name, child) in std::mem::take(&mut self.children) {
            map.insert(name, child.into_value());
        }

        if !self.text.trim().is_empty() {
            let text = self.take_text_value(options);
            map.insert(options.text_node_name.clone(), text);
        }

        (key, Value::Object(map))
    }
}

// ============================================================================
// TreeBuilder (event consumer)
// ============================================================================

/// Builds the output tree from scanner events.
pub(crate) struct TreeBuilder<'a, 'o> {
    source: &'a str,
    options: &'o Options,
    /// Open elements, innermost last.
    stack: Vec<NodeRecord<'a>>,
    /// Top-level elements.
    root: Children,
}

impl<'a, 'o> TreeBuilder<'a, 'o> {
    pub(crate) fn new(source: &'a str, options: &'o Options) -> Self {
        TreeBuilder {
            source,
            options,
            stack: Vec::new(),
            root: Children::new(),
        }
    }

    pub(crate) fn handle_event(&mut self, event: Event<'a>) -> Result<()> {
        match event {
            Event::OpenTag { name, attrs, self_closing, span } => {
                let record = NodeRecord::new(name, attrs, span, self.options);
                if self_closing {
                    self.close(record);
                } else {
                    self.stack.push(record);
                }
            }

            Event::CloseTag { name, span } => {
                let Some(record) = self.stack.pop() else {
                    return Err(Error::malformed(ErrorCode::UnexpectedCloseTag, self.source, span.start));
                };
                if record.raw_name != name {
                    return Err(Error::malformed(ErrorCode::MismatchedCloseTag, self.source, span.start));
                }
                self.close(record);
            }

            Event::Text { content, span } => match self.stack.last_mut() {
                Some(top) => top.push_text(&self.options.clean(content)),
                None => trace!("ignoring top-level text at {}..{}", span.start, span.end),
            },

            // CDATA is never entity-decoded
            Event::CData { content, span } => match self.stack.last_mut() {
                Some(top) => top.push_text(if self.options.trim_values { content.trim() } else { content }),
                None => trace!("ignoring top-level cdata at {}..{}", span.start, span.end),
            },

            Event::Skip { .. } => {}
        }
        Ok(())
    }

    fn close(&mut self, record: NodeRecord<'a>) {
        let (key, value) = record.finish(self.options);
        let parent = match self.stack.last_mut() {
            Some(parent) => &mut parent.children,
            None => &mut self.root,
        };
        merge_child(parent, key, value);
    }

    /// Finish the document. Fails if any element is still open.
    pub(crate) fn finish(self) -> Result<Value> {
        if let Some(open) = self.stack.last() {
            return Err(Error::malformed(ErrorCode::UnclosedElement, self.source, open.span.start));
        }
        Ok(Value::Object(
            self.root.into_iter().map(|(key, child)| (key, child.into_value())).collect(),
        ))
    }
}

// ============================================================================
// Tests
// ============================================================================
