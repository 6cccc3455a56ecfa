//! The document: one root plus free-form metadata.

use indexmap::IndexMap;
use jsonedit_path::Path;

use crate::codec::{parse, serialize_with_indent, Mode, DEFAULT_INDENT, MAX_DEPTH};
use crate::error::{EditResult, ParseError};
use crate::node::Node;

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub root: Node,
    /// Annotations carried alongside the tree. Never exported.
    pub metadata: IndexMap<String, Node>,
}

impl Document {
    /// Wraps `root`, which must be an object or an array.
    ///
    /// # Errors
    ///
    /// [`ParseError`] at offset 0 for a scalar root or one nested deeper
    /// than [`MAX_DEPTH`].
    pub fn new(root: Node) -> Result<Self, ParseError> {
        if !root.is_container() {
            return Err(ParseError::at_start("root must be an object or array"));
        }
        if root.depth() > MAX_DEPTH {
            return Err(ParseError::at_start(format!(
                "nesting exceeds {MAX_DEPTH} levels"
            )));
        }
        Ok(Document {
            root,
            metadata: IndexMap::new(),
        })
    }

    pub fn annotate(&mut self, key: impl Into<String>, value: impl Into<Node>) -> Option<Node> {
        self.metadata.insert(key.into(), value.into())
    }

    pub fn annotation(&self, key: &str) -> Option<&Node> {
        self.metadata.get(key)
    }

    pub fn remove_annotation(&mut self, key: &str) -> Option<Node> {
        self.metadata.shift_remove(key)
    }

    /// Serializes the subtree at `path`.
    ///
    /// # Errors
    ///
    /// [`crate::EditError::NodeNotFound`] if `path` does not resolve.
    pub fn export(&self, path: &Path, mode: Mode, indent: usize) -> EditResult<String> {
        let node = self.root.child_at(path)?;
        Ok(serialize_with_indent(node, mode, indent))
    }
}

/// Parses `text` into a document.
///
/// # Errors
///
/// [`ParseError`] for malformed text or a scalar root.
///
/// # Example
///
/// ```
/// use jsonedit::load_document;
///
/// let doc = load_document(r#"{"a": [1, 2]}"#).unwrap();
/// assert_eq!(doc.root.child_count(), 1);
/// assert!(load_document("42").is_err());
/// ```
pub fn load_document(text: &str) -> Result<Document, ParseError> {
    let root = parse(text)?;
    let doc = Document::new(root)?;
    tracing::debug!(bytes = text.len(), "document loaded");
    Ok(doc)
}

/// Serializes the subtree of `document` at `path` with the default indent.
/// Pass the root path to export the whole document.
///
/// # Errors
///
/// [`crate::EditError::NodeNotFound`] if `path` does not resolve.
pub fn export_text(document: &Document, path: &Path, mode: Mode) -> EditResult<String> {
    document.export(path, mode, DEFAULT_INDENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EditError;
    use jsonedit_path::path;

    #[test]
    fn load_requires_container_root() {
        let err = load_document("\"just a string\"").unwrap_err();
        assert_eq!(err.offset, 0);
        assert_eq!(err.message, "root must be an object or array");
        assert!(load_document("[]").is_ok());
        assert!(load_document("{").is_err());
    }

    #[test]
    fn new_rejects_roots_the_parser_could_not_reopen() {
        let deep = (0..MAX_DEPTH).fold(Node::Null, |inner, _| Node::Array(vec![inner]));
        assert!(Document::new(deep.clone()).is_ok());
        let err = Document::new(Node::Array(vec![deep])).unwrap_err();
        assert_eq!(err.offset, 0);
        assert!(err.message.contains("nesting"));
    }

    #[test]
    fn export_whole_and_subtree() {
        let doc = load_document(r#"{"a": {"b": [1, 2]}}"#).unwrap();
        assert_eq!(
            export_text(&doc, &path![], Mode::Compact).unwrap(),
            r#"{"a":{"b":[1,2]}}"#
        );
        assert_eq!(
            export_text(&doc, &path!["a", "b"], Mode::Pretty).unwrap(),
            "[\n  1,\n  2\n]"
        );
        assert!(matches!(
            export_text(&doc, &path!["x"], Mode::Compact),
            Err(EditError::NodeNotFound { .. })
        ));
    }

    #[test]
    fn metadata_is_not_exported() {
        let mut doc = load_document("{}").unwrap();
        assert_eq!(doc.annotate("source", "clipboard"), None);
        assert_eq!(doc.annotation("source"), Some(&Node::from("clipboard")));
        assert_eq!(export_text(&doc, &path![], Mode::Compact).unwrap(), "{}");
        assert!(doc.remove_annotation("source").is_some());
    }
}
