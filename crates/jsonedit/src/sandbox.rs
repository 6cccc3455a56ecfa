//! Edit sandbox: an uncommitted text buffer bound to one node.
//!
//! ```text
//!   Idle --open--> Editing --begin_commit--> Committing --finish--> Idle
//!                  ^  |  \                       |
//!                  |  |   `--------cancel--------|--> Idle
//!                  |  edit                       |
//!                  `---------- parse error ------'
//! ```
//!
//! The sandbox never touches the tree. [`Sandbox::begin_commit`] only
//! validates and hands back the parsed replacement; the owner swaps it in
//! and then calls [`Sandbox::finish`].

use jsonedit_path::Path;

use crate::codec::{check_depth, parse, serialize_with_indent, Mode};
use crate::error::{EditError, EditResult, ParseError};
use crate::node::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SandboxState {
    Idle,
    Editing,
    Committing,
}

/// How the buffer text maps to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextMode {
    /// Pretty JSON text, parsed on commit.
    #[default]
    Json,
    /// Raw string contents, stored verbatim as a string node on commit.
    Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    pub indent: usize,
    /// Open string leaves in [`TextMode::Value`].
    pub raw_strings: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Sandbox {
    state: Option<Bound>,
    committing: bool,
    last_error: Option<ParseError>,
}

#[derive(Debug, Clone)]
struct Bound {
    path: Path,
    mode: TextMode,
    snapshot: String,
    buffer: String,
}

impl Sandbox {
    pub fn new() -> Self {
        Sandbox::default()
    }

    pub fn state(&self) -> SandboxState {
        match (&self.state, self.committing) {
            (None, _) => SandboxState::Idle,
            (Some(_), false) => SandboxState::Editing,
            (Some(_), true) => SandboxState::Committing,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state.is_some()
    }

    pub fn bound_path(&self) -> Option<&Path> {
        self.state.as_ref().map(|b| &b.path)
    }

    pub fn buffer(&self) -> Option<&str> {
        self.state.as_ref().map(|b| b.buffer.as_str())
    }

    pub fn mode(&self) -> Option<TextMode> {
        self.state.as_ref().map(|b| b.mode)
    }

    /// Whether the buffer differs from the text it was opened with.
    pub fn is_modified(&self) -> bool {
        self.state
            .as_ref()
            .is_some_and(|b| b.buffer != b.snapshot)
    }

    /// The parse error of the last failed commit, cleared by the next edit.
    pub fn last_error(&self) -> Option<&ParseError> {
        self.last_error.as_ref()
    }

    /// Binds the sandbox to the node at `path` and snapshots its text.
    ///
    /// # Errors
    ///
    /// [`EditError::Sandbox`] unless idle, [`EditError::NodeNotFound`] if
    /// `path` is stale.
    pub fn open(&mut self, root: &Node, path: &Path, options: OpenOptions) -> EditResult<&str> {
        self.expect(SandboxState::Idle)?;
        let node = root.child_at(path)?;
        let (mode, snapshot) = match node {
            Node::String(s) if options.raw_strings => (TextMode::Value, s.clone()),
            _ => (
                TextMode::Json,
                serialize_with_indent(node, Mode::Pretty, options.indent),
            ),
        };
        tracing::trace!(%path, ?mode, "sandbox opened");
        self.last_error = None;
        let bound = self.state.insert(Bound {
            path: path.clone(),
            mode,
            buffer: snapshot.clone(),
            snapshot,
        });
        Ok(&bound.buffer)
    }

    /// Replaces the buffer. The document is not affected.
    ///
    /// # Errors
    ///
    /// [`EditError::Sandbox`] unless editing.
    pub fn edit(&mut self, text: impl Into<String>) -> EditResult<()> {
        self.expect(SandboxState::Editing)?;
        if let Some(bound) = self.state.as_mut() {
            bound.buffer = text.into();
            tracing::trace!(path = %bound.path, len = bound.buffer.len(), "sandbox buffer edited");
        }
        self.last_error = None;
        Ok(())
    }

    /// Validates the buffer against `root` and returns the bound path with
    /// its replacement node. On success the sandbox is `Committing` until
    /// [`Sandbox::finish`] or [`Sandbox::resume`].
    ///
    /// # Errors
    ///
    /// [`EditError::Sandbox`] unless editing; [`EditError::NodeNotFound`]
    /// if the bound path went stale; [`EditError::Parse`] for malformed
    /// text or a scalar at the root; [`EditError::TooDeep`] if the text
    /// would nest past the depth limit at the bound path. The sandbox stays
    /// `Editing` on error.
    pub fn begin_commit(&mut self, root: &Node) -> EditResult<(Path, Node)> {
        self.expect(SandboxState::Editing)?;
        let Some(bound) = self.state.as_ref() else {
            return Err(self.wrong_state(SandboxState::Editing));
        };
        root.child_at(&bound.path)?;
        let parsed = match bound.mode {
            TextMode::Value => Ok(Node::String(bound.buffer.clone())),
            TextMode::Json => parse(&bound.buffer),
        };
        let parsed = parsed.and_then(|node| {
            if bound.path.is_root() && !node.is_container() {
                Err(ParseError::at_start("root must be an object or array"))
            } else {
                Ok(node)
            }
        });
        match parsed {
            Ok(node) => {
                check_depth(&bound.path, &node)?;
                let path = bound.path.clone();
                self.committing = true;
                self.last_error = None;
                Ok((path, node))
            }
            Err(err) => {
                tracing::trace!(path = %bound.path, error = %err, "sandbox commit rejected");
                self.last_error = Some(err.clone());
                Err(EditError::Parse(err))
            }
        }
    }

    /// Completes a commit: clears the buffer and returns to `Idle`.
    pub fn finish(&mut self) {
        self.state = None;
        self.committing = false;
    }

    /// Abandons a commit in progress and returns to `Editing`.
    pub fn resume(&mut self) {
        self.committing = false;
    }

    /// Discards the buffer.
    ///
    /// # Errors
    ///
    /// [`EditError::Sandbox`] unless editing.
    pub fn cancel(&mut self) -> EditResult<()> {
        self.expect(SandboxState::Editing)?;
        self.discard();
        Ok(())
    }

    /// Drops whatever is open, in any state. Returns whether a buffer was
    /// discarded.
    pub fn discard(&mut self) -> bool {
        let open = self.state.take().is_some();
        self.committing = false;
        self.last_error = None;
        if open {
            tracing::trace!("sandbox discarded");
        }
        open
    }

    fn expect(&self, expected: SandboxState) -> EditResult<()> {
        if self.state() == expected {
            Ok(())
        } else {
            Err(self.wrong_state(expected))
        }
    }

    fn wrong_state(&self, expected: SandboxState) -> EditError {
        EditError::Sandbox {
            expected,
            actual: self.state(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonedit_path::path;
    use serde_json::json;

    const OPTS: OpenOptions = OpenOptions {
        indent: 2,
        raw_strings: false,
    };

    fn doc() -> Node {
        Node::from(json!({"a": [1, 2, 3], "s": "hi"}))
    }

    #[test]
    fn open_snapshots_pretty_text() {
        let root = doc();
        let mut sb = Sandbox::new();
        assert_eq!(sb.open(&root, &path!["a", 0], OPTS).unwrap(), "1");
        assert_eq!(sb.state(), SandboxState::Editing);
        assert!(!sb.is_modified());

        let mut sb = Sandbox::new();
        assert_eq!(sb.open(&root, &path!["a"], OPTS).unwrap(), "[\n  1,\n  2,\n  3\n]");
    }

    #[test]
    fn open_rejects_stale_path_and_double_open() {
        let root = doc();
        let mut sb = Sandbox::new();
        assert!(sb.open(&root, &path!["zz"], OPTS).is_err());
        assert_eq!(sb.state(), SandboxState::Idle);

        sb.open(&root, &path!["s"], OPTS).unwrap();
        assert_eq!(
            sb.open(&root, &path!["a"], OPTS).unwrap_err(),
            EditError::Sandbox {
                expected: SandboxState::Idle,
                actual: SandboxState::Editing
            }
        );
    }

    #[test]
    fn parse_error_returns_to_editing() {
        let root = doc();
        let mut sb = Sandbox::new();
        sb.open(&root, &path!["a", 0], OPTS).unwrap();
        sb.edit("not json").unwrap();
        assert!(sb.is_modified());
        let err = sb.begin_commit(&root).unwrap_err();
        assert!(matches!(err, EditError::Parse(_)));
        assert_eq!(sb.state(), SandboxState::Editing);
        assert!(sb.last_error().is_some());
        assert_eq!(sb.buffer(), Some("not json"));

        sb.cancel().unwrap();
        assert_eq!(sb.state(), SandboxState::Idle);
        assert_eq!(sb.buffer(), None);
    }

    #[test]
    fn commit_hands_back_parsed_node() {
        let root = doc();
        let mut sb = Sandbox::new();
        sb.open(&root, &path!["a", 1], OPTS).unwrap();
        sb.edit("{\"x\": [true]}").unwrap();
        let (p, node) = sb.begin_commit(&root).unwrap();
        assert_eq!(p, path!["a", 1]);
        assert_eq!(node, Node::from(json!({"x": [true]})));
        assert_eq!(sb.state(), SandboxState::Committing);
        assert!(sb.edit("again").is_err());
        sb.finish();
        assert_eq!(sb.state(), SandboxState::Idle);
    }

    #[test]
    fn root_commit_requires_container() {
        let root = doc();
        let mut sb = Sandbox::new();
        sb.open(&root, &path![], OPTS).unwrap();
        sb.edit("42").unwrap();
        let err = sb.begin_commit(&root).unwrap_err();
        assert_eq!(
            err,
            EditError::Parse(ParseError::at_start("root must be an object or array"))
        );
        sb.edit("[42]").unwrap();
        assert!(sb.begin_commit(&root).is_ok());
    }

    #[test]
    fn raw_string_mode_stores_text_verbatim() {
        let root = doc();
        let mut sb = Sandbox::new();
        let opts = OpenOptions {
            raw_strings: true,
            ..OPTS
        };
        assert_eq!(sb.open(&root, &path!["s"], opts).unwrap(), "hi");
        assert_eq!(sb.mode(), Some(TextMode::Value));
        sb.edit("not \"json\"").unwrap();
        let (_, node) = sb.begin_commit(&root).unwrap();
        assert_eq!(node, Node::from("not \"json\""));

        let mut sb = Sandbox::new();
        sb.open(&root, &path!["a", 0], opts).unwrap();
        assert_eq!(sb.mode(), Some(TextMode::Json));
    }

    #[test]
    fn commit_revalidates_bound_path() {
        let root = doc();
        let mut sb = Sandbox::new();
        sb.open(&root, &path!["a", 2], OPTS).unwrap();
        let shrunk = Node::from(json!({"a": [1]}));
        let err = sb.begin_commit(&shrunk).unwrap_err();
        assert!(matches!(err, EditError::NodeNotFound { .. }));
        assert_eq!(sb.state(), SandboxState::Editing);
    }

    #[test]
    fn commit_rejects_text_nested_past_the_limit() {
        use crate::codec::MAX_DEPTH;

        let root = doc();
        let mut sb = Sandbox::new();
        sb.open(&root, &path!["a", 0], OPTS).unwrap();
        // Below /a/0 there is room for MAX_DEPTH - 2 more containers.
        let fits = "[".repeat(MAX_DEPTH - 2) + &"]".repeat(MAX_DEPTH - 2);
        sb.edit(fits).unwrap();
        assert!(sb.begin_commit(&root).is_ok());
        sb.resume();

        let over = "[".repeat(MAX_DEPTH - 1) + &"]".repeat(MAX_DEPTH - 1);
        sb.edit(over).unwrap();
        let err = sb.begin_commit(&root).unwrap_err();
        assert_eq!(
            err,
            EditError::TooDeep {
                path: path!["a", 0],
                depth: MAX_DEPTH + 1,
                limit: MAX_DEPTH,
            }
        );
        assert_eq!(sb.state(), SandboxState::Editing);
    }

    #[test]
    fn cancel_requires_open_buffer() {
        let mut sb = Sandbox::new();
        assert!(sb.cancel().is_err());
        assert!(!sb.discard());
    }
}
