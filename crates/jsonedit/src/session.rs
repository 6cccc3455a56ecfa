//! The editing session a front end drives.
//!
//! A [`Session`] owns the single live [`Document`] together with the
//! selection, the edit sandbox, history, the active search and the
//! configuration read from the document. Every method is synchronous and
//! either completes or fails without effect; listeners run after the state
//! change is complete.

use jsonedit_path::Path;

use crate::codec::Mode;
use crate::config::EditorConfig;
use crate::document::{load_document, Document};
use crate::error::{EditResult, ParseError};
use crate::events::{
    DocumentEvent, DocumentOrigin, Listeners, SelectionCause, SelectionEvent,
};
use crate::history::{Change, ChangeKind, History};
use crate::node::Node;
use crate::ops::{self, Direction, Mutation};
use crate::sandbox::{OpenOptions, Sandbox};
use crate::search::{next_match_after, search_keys, SearchMatches};
use crate::selection::{self, Role};

/// Result of [`Session::search`] and [`Session::repeat_search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Found {
        path: Path,
        /// 1-based.
        ordinal: usize,
        total: usize,
        wrapped: bool,
    },
    NoMatches {
        query: String,
    },
    NoActiveSearch,
}

#[derive(Debug)]
pub struct Session {
    document: Document,
    selection: Path,
    sandbox: Sandbox,
    history: History,
    config: EditorConfig,
    search: Option<String>,
    dirty: bool,
    selection_listeners: Listeners<SelectionEvent>,
    document_listeners: Listeners<DocumentEvent>,
}

impl Session {
    pub fn new(document: Document) -> Self {
        let config = EditorConfig::from_document(&document.root);
        Session {
            history: History::with_limit(config.history_limit),
            config,
            document,
            selection: Path::root(),
            sandbox: Sandbox::new(),
            search: None,
            dirty: false,
            selection_listeners: Listeners::new(),
            document_listeners: Listeners::new(),
        }
    }

    /// Parses `text` and starts a session on it.
    ///
    /// # Errors
    ///
    /// [`ParseError`] for malformed text or a scalar root.
    pub fn load(text: &str) -> Result<Self, ParseError> {
        Ok(Session::new(load_document(text)?))
    }

    /// Replaces the document with `text`, keeping listeners. History, the
    /// sandbox and the active search are dropped. On error nothing changes.
    ///
    /// # Errors
    ///
    /// [`ParseError`] for malformed text or a scalar root.
    pub fn reload(&mut self, text: &str) -> Result<(), ParseError> {
        let document = load_document(text)?;
        self.document = document;
        self.selection = Path::root();
        self.sandbox.discard();
        self.history.clear();
        self.search = None;
        self.dirty = false;
        self.refresh_config();
        self.document_listeners.emit(DocumentEvent {
            kind: None,
            scope: Path::root(),
            origin: DocumentOrigin::Load,
        });
        self.emit_selection(SelectionCause::Load);
        Ok(())
    }

    // ── State ─────────────────────────────────────────────────────────────

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn root(&self) -> &Node {
        &self.document.root
    }

    /// Metadata is free-form and never recorded in history.
    pub fn metadata_mut(&mut self) -> &mut indexmap::IndexMap<String, Node> {
        &mut self.document.metadata
    }

    pub fn selection(&self) -> &Path {
        &self.selection
    }

    pub fn selected(&self) -> EditResult<&Node> {
        self.document.root.child_at(&self.selection)
    }

    pub fn role(&self) -> EditResult<Role> {
        selection::role_of(&self.document.root, &self.selection)
    }

    pub fn sandbox(&self) -> &Sandbox {
        &self.sandbox
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn title(&self, file_name: Option<&str>) -> String {
        self.config.title(file_name)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Whether the document changed since load or the last
    /// [`Session::mark_saved`].
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Path the front end should expand to after loading.
    pub fn initial_expansion(&self) -> Path {
        selection::first_bifurcation_path(&self.document.root)
    }

    // ── Export ────────────────────────────────────────────────────────────

    /// # Errors
    ///
    /// [`crate::EditError::NodeNotFound`] if `path` does not resolve.
    pub fn export(&self, path: &Path, mode: Mode) -> EditResult<String> {
        self.document.export(path, mode, self.config.indent)
    }

    /// # Errors
    ///
    /// [`crate::EditError::NodeNotFound`] if the selection went stale.
    pub fn export_selection(&self, mode: Mode) -> EditResult<String> {
        self.export(&self.selection, mode)
    }

    /// The on-disk form: pretty text with a trailing newline.
    pub fn save_text(&self) -> String {
        let mut text =
            crate::codec::serialize_with_indent(&self.document.root, Mode::Pretty, self.config.indent);
        text.push('\n');
        text
    }

    // ── Navigation ────────────────────────────────────────────────────────

    /// Moves the selection. Moving to another node discards an open
    /// sandbox.
    ///
    /// # Errors
    ///
    /// [`crate::EditError::NodeNotFound`] if `path` does not resolve.
    pub fn focus(&mut self, path: &Path) -> EditResult<()> {
        let path = selection::focus(&self.document.root, path)?;
        self.move_selection(path, SelectionCause::Focus);
        Ok(())
    }

    /// Focuses the node at an RFC 6901 pointer.
    ///
    /// # Errors
    ///
    /// [`crate::EditError::InvalidPath`] or [`crate::EditError::NodeNotFound`].
    pub fn focus_pointer(&mut self, pointer: &str) -> EditResult<Path> {
        let path = self.document.root.resolve_pointer(pointer)?;
        self.focus(&path)?;
        Ok(path)
    }

    /// Matches for `query` below `from`, using the configured policy.
    ///
    /// # Errors
    ///
    /// [`crate::EditError::NodeNotFound`] if `from` does not resolve.
    pub fn search_keys(&self, query: &str, from: &Path) -> EditResult<SearchMatches<'_>> {
        search_keys(&self.document.root, query, from, &self.config.search)
    }

    /// Starts a search and focuses the first match. An empty query, or the
    /// query already active, advances like [`Session::repeat_search`]. A
    /// query with no matches clears the active search.
    pub fn search(&mut self, query: &str) -> SearchOutcome {
        if query.is_empty() || self.search.as_deref() == Some(query) {
            return self.repeat_search();
        }
        let first = match search_keys(&self.document.root, query, &Path::root(), &self.config.search) {
            Ok(matches) => {
                let mut total = 0;
                let mut first = None;
                for path in matches {
                    total += 1;
                    first.get_or_insert(path);
                }
                first.map(|path| (path, total))
            }
            Err(_) => None,
        };
        let Some((path, total)) = first else {
            self.search = None;
            return SearchOutcome::NoMatches {
                query: query.to_owned(),
            };
        };
        self.search = Some(query.to_owned());
        tracing::trace!(query, %path, total, "search started");
        self.move_selection(path.clone(), SelectionCause::Search);
        SearchOutcome::Found {
            path,
            ordinal: 1,
            total,
            wrapped: false,
        }
    }

    /// Focuses the next match after the selection, wrapping at the end.
    pub fn repeat_search(&mut self) -> SearchOutcome {
        let Some(query) = self.search.clone() else {
            return SearchOutcome::NoActiveSearch;
        };
        let Some(hit) = next_match_after(&self.document.root, &query, &self.selection, &self.config.search)
        else {
            return SearchOutcome::NoMatches { query };
        };
        self.move_selection(hit.path.clone(), SelectionCause::Search);
        SearchOutcome::Found {
            path: hit.path,
            ordinal: hit.index + 1,
            total: hit.total,
            wrapped: hit.wrapped,
        }
    }

    pub fn active_search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn clear_search(&mut self) {
        self.search = None;
    }

    // ── Sandbox ───────────────────────────────────────────────────────────

    /// Opens the sandbox on the selection, replacing any open buffer.
    ///
    /// # Errors
    ///
    /// [`crate::EditError::NodeNotFound`] if the selection went stale.
    pub fn open_sandbox(&mut self) -> EditResult<&str> {
        self.sandbox.discard();
        let options = OpenOptions {
            indent: self.config.indent,
            raw_strings: self.config.raw_string_editing,
        };
        self.sandbox.open(&self.document.root, &self.selection, options)
    }

    /// # Errors
    ///
    /// [`crate::EditError::Sandbox`] unless the sandbox is open.
    pub fn edit(&mut self, text: impl Into<String>) -> EditResult<()> {
        self.sandbox.edit(text)
    }

    /// Parses the buffer and swaps it into the document.
    ///
    /// # Errors
    ///
    /// [`crate::EditError::Parse`] leaves the sandbox open with the buffer intact;
    /// [`crate::EditError::Sandbox`] unless the sandbox is open. The document is
    /// unchanged on error.
    pub fn commit(&mut self) -> EditResult<()> {
        let (path, node) = self.sandbox.begin_commit(&self.document.root)?;
        let before = match self.document.root.set(&path, node.clone()) {
            Ok(before) => before,
            Err(err) => {
                self.sandbox.resume();
                return Err(err);
            }
        };
        self.sandbox.finish();
        let change = Change {
            kind: ChangeKind::Commit,
            scope: path.clone(),
            before,
            after: node,
            selection_before: self.selection.clone(),
            selection_after: path,
        };
        self.finish_change(change, SelectionCause::Commit);
        Ok(())
    }

    /// # Errors
    ///
    /// [`crate::EditError::Sandbox`] unless the sandbox is open.
    pub fn cancel(&mut self) -> EditResult<()> {
        self.sandbox.cancel()
    }

    // ── Mutations ─────────────────────────────────────────────────────────

    /// Whether `mutation` would succeed on the current selection.
    pub fn can_apply(&self, mutation: &Mutation) -> bool {
        ops::plan(&self.document.root, &self.selection, mutation).is_ok()
    }

    /// Applies `mutation` to the selection. A successful change discards an
    /// open sandbox.
    ///
    /// # Errors
    ///
    /// The precondition error of the mutation; nothing changes.
    pub fn apply(&mut self, mutation: &Mutation) -> EditResult<()> {
        let change = ops::apply(&mut self.document.root, &self.selection, mutation)?;
        let cause = match mutation {
            Mutation::Delete => SelectionCause::Reselected,
            _ => SelectionCause::Mutation,
        };
        self.finish_change(change, cause);
        Ok(())
    }

    /// # Errors
    ///
    /// See [`Mutation::InsertSibling`].
    pub fn insert_sibling(&mut self, value: Option<Node>) -> EditResult<()> {
        self.apply(&Mutation::InsertSibling { value, key: None })
    }

    /// # Errors
    ///
    /// See [`Mutation::Duplicate`].
    pub fn duplicate(&mut self) -> EditResult<()> {
        self.apply(&Mutation::Duplicate { key: None })
    }

    /// # Errors
    ///
    /// See [`Mutation::Raise`].
    pub fn raise(&mut self) -> EditResult<()> {
        self.apply(&Mutation::Raise)
    }

    /// # Errors
    ///
    /// See [`Mutation::Lower`].
    pub fn lower(&mut self) -> EditResult<()> {
        self.apply(&Mutation::Lower)
    }

    /// # Errors
    ///
    /// See [`Mutation::Rename`].
    pub fn rename(&mut self, to: &str) -> EditResult<()> {
        self.apply(&Mutation::rename(to))
    }

    /// # Errors
    ///
    /// See [`Mutation::Delete`].
    pub fn delete(&mut self) -> EditResult<()> {
        self.apply(&Mutation::Delete)
    }

    /// # Errors
    ///
    /// See [`Mutation::Reorder`].
    pub fn reorder(&mut self, direction: Direction) -> EditResult<()> {
        self.apply(&Mutation::Reorder(direction))
    }

    // ── History ───────────────────────────────────────────────────────────

    /// Reverts the last change, restoring the document and the selection.
    ///
    /// # Errors
    ///
    /// [`crate::EditError::EmptyHistory`] when there is nothing to undo.
    pub fn undo(&mut self) -> EditResult<()> {
        let change = self.history.undo(&mut self.document.root)?;
        let (kind, scope, path) = (change.kind, change.scope.clone(), change.selection_before.clone());
        tracing::debug!(%kind, %scope, "undo");
        self.after_history_step(kind, scope, path, DocumentOrigin::Undo, SelectionCause::Undo);
        Ok(())
    }

    /// # Errors
    ///
    /// [`crate::EditError::EmptyHistory`] when there is nothing to redo.
    pub fn redo(&mut self) -> EditResult<()> {
        let change = self.history.redo(&mut self.document.root)?;
        let (kind, scope, path) = (change.kind, change.scope.clone(), change.selection_after.clone());
        tracing::debug!(%kind, %scope, "redo");
        self.after_history_step(kind, scope, path, DocumentOrigin::Redo, SelectionCause::Redo);
        Ok(())
    }

    // ── Listeners ─────────────────────────────────────────────────────────

    pub fn on_selection<F>(&mut self, listener: F) -> u64
    where
        F: FnMut(SelectionEvent) + Send + Sync + 'static,
    {
        self.selection_listeners.add(listener)
    }

    pub fn off_selection(&mut self, listener_id: u64) -> bool {
        self.selection_listeners.remove(listener_id)
    }

    pub fn on_document<F>(&mut self, listener: F) -> u64
    where
        F: FnMut(DocumentEvent) + Send + Sync + 'static,
    {
        self.document_listeners.add(listener)
    }

    pub fn off_document(&mut self, listener_id: u64) -> bool {
        self.document_listeners.remove(listener_id)
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn move_selection(&mut self, path: Path, cause: SelectionCause) {
        if self.sandbox.bound_path() != Some(&path) {
            self.sandbox.discard();
        }
        tracing::trace!(%path, ?cause, "selection moved");
        self.selection = path;
        self.emit_selection(cause);
    }

    fn finish_change(&mut self, change: Change, cause: SelectionCause) {
        if change.is_noop() {
            return;
        }
        tracing::debug!(kind = %change.kind, scope = %change.scope, selection = %change.selection_after, "change applied");
        let kind = change.kind;
        let scope = change.scope.clone();
        self.selection = change.selection_after.clone();
        self.history.record(change);
        self.sandbox.discard();
        self.dirty = true;
        self.refresh_config();
        self.document_listeners.emit(DocumentEvent {
            kind: Some(kind),
            scope,
            origin: DocumentOrigin::Apply,
        });
        self.emit_selection(cause);
    }

    fn after_history_step(
        &mut self,
        kind: ChangeKind,
        scope: Path,
        selection: Path,
        origin: DocumentOrigin,
        cause: SelectionCause,
    ) {
        self.sandbox.discard();
        self.selection = selection;
        self.dirty = true;
        self.refresh_config();
        self.document_listeners.emit(DocumentEvent {
            kind: Some(kind),
            scope,
            origin,
        });
        self.emit_selection(cause);
    }

    fn refresh_config(&mut self) {
        self.config = EditorConfig::from_document(&self.document.root);
        self.history.set_limit(self.config.history_limit);
    }

    fn emit_selection(&mut self, cause: SelectionCause) {
        self.selection_listeners.emit(SelectionEvent {
            path: self.selection.clone(),
            cause,
        });
    }
}

impl From<Document> for Session {
    fn from(document: Document) -> Self {
        Session::new(document)
    }
}
