use std::collections::BTreeMap;

use jsonedit_path::Path;

use crate::history::ChangeKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionCause {
    Load,
    Focus,
    Search,
    Mutation,
    /// The selected node was deleted and the selection was repaired.
    Reselected,
    Commit,
    Undo,
    Redo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEvent {
    pub path: Path,
    pub cause: SelectionCause,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentOrigin {
    Apply,
    Undo,
    Redo,
    Load,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEvent {
    /// `None` for a load.
    pub kind: Option<ChangeKind>,
    /// Root of the subtree that changed.
    pub scope: Path,
    pub origin: DocumentOrigin,
}

type Listener<E> = Box<dyn FnMut(E) + Send + Sync>;

pub(crate) struct Listeners<E> {
    next_id: u64,
    map: BTreeMap<u64, Listener<E>>,
}

impl<E: Clone> Listeners<E> {
    pub(crate) fn new() -> Self {
        Listeners {
            next_id: 1,
            map: BTreeMap::new(),
        }
    }

    pub(crate) fn add<F>(&mut self, listener: F) -> u64
    where
        F: FnMut(E) + Send + Sync + 'static,
    {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        self.map.insert(id, Box::new(listener));
        id
    }

    pub(crate) fn remove(&mut self, id: u64) -> bool {
        self.map.remove(&id).is_some()
    }

    pub(crate) fn emit(&mut self, event: E) {
        for listener in self.map.values_mut() {
            listener(event.clone());
        }
    }
}

impl<E> std::fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.map.len())
            .finish()
    }
}
