#![allow(dead_code)]

use jsonedit::{serialize, EditError, Mode, Node, Session};

/// Kebab-case name of an error variant, as written in fixtures.
pub fn error_name(err: &EditError) -> &'static str {
    match err {
        EditError::Parse(_) => "parse",
        EditError::InvalidPath(_) => "invalid-path",
        EditError::NodeNotFound { .. } => "node-not-found",
        EditError::DuplicateKey { .. } => "duplicate-key",
        EditError::NoParent { .. } => "no-parent",
        EditError::NoSibling { .. } => "no-sibling",
        EditError::NotApplicable { .. } => "not-applicable",
        EditError::EmptyHistory(_) => "empty-history",
        EditError::Sandbox { .. } => "sandbox",
        EditError::TooDeep { .. } => "too-deep",
    }
}

pub fn node(text: &str) -> Node {
    jsonedit::parse(text).unwrap_or_else(|e| panic!("bad test document {text:?}: {e}"))
}

pub fn compact(session: &Session) -> String {
    serialize(session.root(), Mode::Compact)
}

pub fn session(text: &str) -> Session {
    Session::load(text).unwrap_or_else(|e| panic!("failed to load {text:?}: {e}"))
}
