//! Text codec for document trees.
//!
//! Serialization is deterministic: object members are written in insertion
//! order (never sorted), compact mode emits no insignificant whitespace and
//! pretty mode indents by a fixed step. Parsing is a pure function from text
//! to a fresh tree; it never touches an existing one.
//!
//! Trees are capped at [`MAX_DEPTH`] nested containers, the most the parser
//! accepts, so every tree the engine holds can be saved and read back.

use std::fmt;

use jsonedit_path::Path;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter};
use serde_json::Number;

use crate::error::{EditError, EditResult, ParseError};
use crate::node::{Node, Object};

/// Indent step used by [`Mode::Pretty`] unless configured otherwise.
pub const DEFAULT_INDENT: usize = 2;

/// Deepest container nesting [`parse`] accepts. serde_json stops at its
/// 128th nested array or object.
pub const MAX_DEPTH: usize = 127;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Pretty,
    Compact,
}

/// Serialize `node` with the default indent step.
pub fn serialize(node: &Node, mode: Mode) -> String {
    serialize_with_indent(node, mode, DEFAULT_INDENT)
}

/// Serialize `node`; `indent` is ignored in compact mode.
pub fn serialize_with_indent(node: &Node, mode: Mode, indent: usize) -> String {
    match mode {
        Mode::Compact => write_with(node, CompactFormatter),
        Mode::Pretty => {
            let pad = " ".repeat(indent);
            write_with(node, PrettyFormatter::with_indent(pad.as_bytes()))
        }
    }
}

fn write_with<F: Formatter>(node: &Node, formatter: F) -> String {
    let mut out = Vec::new();
    // Infallible: keys are strings and the sink is a Vec.
    let written = node.serialize(&mut serde_json::Serializer::with_formatter(&mut out, formatter));
    match written {
        Ok(()) => String::from_utf8(out).unwrap_or_default(),
        Err(_) => String::new(),
    }
}

/// Checks that `node`, placed at `path`, stays within [`MAX_DEPTH`].
///
/// # Errors
///
/// [`EditError::TooDeep`] with the nesting the tree would reach.
pub fn check_depth(path: &Path, node: &Node) -> EditResult<()> {
    let depth = path.len() + node.depth();
    if depth > MAX_DEPTH {
        return Err(EditError::TooDeep {
            path: path.clone(),
            depth,
            limit: MAX_DEPTH,
        });
    }
    Ok(())
}

/// Parse `text` into a fresh tree.
///
/// Duplicate keys inside one object keep the last value at the position of
/// the first occurrence.
///
/// # Errors
///
/// [`ParseError`] with the byte offset, line and column of the problem.
pub fn parse(text: &str) -> Result<Node, ParseError> {
    let mut de = serde_json::Deserializer::from_str(text);
    let node = Node::deserialize(&mut de).map_err(|e| to_parse_error(text, &e))?;
    de.end().map_err(|e| to_parse_error(text, &e))?;
    Ok(node)
}

fn to_parse_error(text: &str, err: &serde_json::Error) -> ParseError {
    let (line, column) = (err.line(), err.column());
    let full = err.to_string();
    let suffix = format!(" at line {line} column {column}");
    let message = full.strip_suffix(&suffix).unwrap_or(&full).to_owned();
    ParseError {
        offset: byte_offset(text, line, column),
        line: line.max(1),
        column: column.max(1),
        message,
    }
}

fn byte_offset(text: &str, line: usize, column: usize) -> usize {
    if line == 0 {
        return 0;
    }
    let line_start: usize = text
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(text.len())
}

// ── serde ─────────────────────────────────────────────────────────────────

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Object(map) => {
                let mut ser = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    ser.serialize_entry(key, value)?;
                }
                ser.end()
            }
            Node::Array(arr) => serializer.collect_seq(arr),
            Node::String(s) => serializer.serialize_str(s),
            Node::Number(n) => n.serialize(serializer),
            Node::Bool(b) => serializer.serialize_bool(*b),
            Node::Null => serializer.serialize_unit(),
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NodeVisitor)
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Node, E> {
        Ok(Node::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Node, E> {
        Ok(Node::Number(v.into()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Node, E> {
        Ok(Node::Number(v.into()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Node, E> {
        Number::from_f64(v)
            .map(Node::Number)
            .ok_or_else(|| E::custom("number out of range"))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Node, E> {
        Ok(Node::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Node, E> {
        Ok(Node::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Node, D::Error> {
        Node::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Node, A::Error> {
        let mut arr = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<Node>()? {
            arr.push(item);
        }
        Ok(Node::Array(arr))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Node, A::Error> {
        let mut obj = Object::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, Node>()? {
            obj.insert(key, value);
        }
        Ok(Node::Object(obj))
    }
}
