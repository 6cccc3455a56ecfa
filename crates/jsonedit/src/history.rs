//! Linear undo/redo over subtree snapshots.
//!
//! Each [`Change`] stores the node at its scope before and after the edit,
//! so undo and redo are a single `set` at the scope path. Recording a new
//! change drops the redo tail.

use std::collections::VecDeque;
use std::fmt;

use jsonedit_path::Path;

use crate::error::{EditError, EditResult, HistoryDirection};
use crate::node::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    InsertSibling,
    Duplicate,
    Raise,
    Lower,
    Rename,
    Delete,
    Reorder,
    /// A sandbox commit.
    Commit,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::InsertSibling => "insert-sibling",
            ChangeKind::Duplicate => "duplicate",
            ChangeKind::Raise => "raise",
            ChangeKind::Lower => "lower",
            ChangeKind::Rename => "rename",
            ChangeKind::Delete => "delete",
            ChangeKind::Reorder => "reorder",
            ChangeKind::Commit => "commit",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One committed change.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub kind: ChangeKind,
    /// Root of the smallest subtree the change touched.
    pub scope: Path,
    pub before: Node,
    pub after: Node,
    pub selection_before: Path,
    pub selection_after: Path,
}

impl Change {
    pub fn is_noop(&self) -> bool {
        self.before == self.after
    }
}

#[derive(Debug, Clone, Default)]
pub struct History {
    undo: VecDeque<Change>,
    redo: Vec<Change>,
    limit: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        History::default()
    }

    pub fn with_limit(limit: Option<usize>) -> Self {
        History {
            limit,
            ..History::default()
        }
    }

    /// Pushes `change` and clears the redo stack. No-op changes are ignored;
    /// returns whether the change was recorded.
    pub fn record(&mut self, change: Change) -> bool {
        if change.is_noop() {
            return false;
        }
        self.redo.clear();
        self.undo.push_back(change);
        self.trim();
        true
    }

    /// Reverts the newest change in `root`.
    ///
    /// # Errors
    ///
    /// [`EditError::EmptyHistory`] when there is nothing to undo;
    /// [`EditError::NodeNotFound`] if the scope no longer resolves, in which
    /// case the entry stays on the stack.
    pub fn undo(&mut self, root: &mut Node) -> EditResult<&Change> {
        let change = self
            .undo
            .pop_back()
            .ok_or(EditError::EmptyHistory(HistoryDirection::Undo))?;
        if let Err(err) = root.set(&change.scope, change.before.clone()) {
            self.undo.push_back(change);
            return Err(err);
        }
        self.redo.push(change);
        self.redo
            .last()
            .ok_or(EditError::EmptyHistory(HistoryDirection::Undo))
    }

    /// Re-applies the newest undone change in `root`.
    ///
    /// # Errors
    ///
    /// Same as [`History::undo`], with [`HistoryDirection::Redo`].
    pub fn redo(&mut self, root: &mut Node) -> EditResult<&Change> {
        let change = self
            .redo
            .pop()
            .ok_or(EditError::EmptyHistory(HistoryDirection::Redo))?;
        if let Err(err) = root.set(&change.scope, change.after.clone()) {
            self.redo.push(change);
            return Err(err);
        }
        self.undo.push_back(change);
        self.undo
            .back()
            .ok_or(EditError::EmptyHistory(HistoryDirection::Redo))
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Caps the undo stack, dropping the oldest entries beyond `limit`.
    pub fn set_limit(&mut self, limit: Option<usize>) {
        self.limit = limit;
        self.trim();
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    fn trim(&mut self) {
        if let Some(limit) = self.limit {
            while self.undo.len() > limit {
                self.undo.pop_front();
            }
        }
    }
}
