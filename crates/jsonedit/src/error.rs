//! Error taxonomy for the document engine.
//!
//! Every error leaves the document untouched: operations validate before
//! they apply. Variants carry the path and the offending key or index so a
//! front end can render feedback without the engine knowing about it.

use std::fmt;

use jsonedit_path::{Path, PathError, PathStep};
use thiserror::Error;

use crate::node::NodeKind;
use crate::sandbox::SandboxState;

/// Malformed document text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message} at line {line}, column {column}")]
pub struct ParseError {
    /// Byte offset into the parsed text.
    pub offset: usize,
    /// 1-based line.
    pub line: usize,
    /// 1-based column.
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub(crate) fn at_start(message: impl Into<String>) -> Self {
        ParseError {
            offset: 0,
            line: 1,
            column: 1,
            message: message.into(),
        }
    }
}

/// Why a path step failed to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFoundReason {
    MissingKey(String),
    IndexOutOfBounds { index: usize, len: usize },
    /// A key applied to an array, an index applied to an object, or any
    /// step applied to a scalar.
    KindMismatch { step: PathStep, found: NodeKind },
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFoundReason::MissingKey(key) => write!(f, "no member {key:?}"),
            NotFoundReason::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for length {len}")
            }
            NotFoundReason::KindMismatch { step, found } => {
                write!(f, "step '{step}' cannot be applied to {found}")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryDirection {
    Undo,
    Redo,
}

impl fmt::Display for HistoryDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryDirection::Undo => f.write_str("undo"),
            HistoryDirection::Redo => f.write_str("redo"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EditError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),
    #[error("node not found at '{path}' (step {depth}): {reason}")]
    NodeNotFound {
        path: Path,
        /// Index of the first step that failed to resolve.
        depth: usize,
        reason: NotFoundReason,
    },
    #[error("key {key:?} already exists in '{parent}'")]
    DuplicateKey { parent: Path, key: String },
    #[error("'{path}' has no parent")]
    NoParent { path: Path },
    #[error("'{path}' has no sibling that can take it")]
    NoSibling { path: Path },
    #[error("not applicable to '{path}': {reason}")]
    NotApplicable { path: Path, reason: &'static str },
    #[error("nothing to {0}")]
    EmptyHistory(HistoryDirection),
    #[error("sandbox is {actual:?}, expected {expected:?}")]
    Sandbox {
        expected: SandboxState,
        actual: SandboxState,
    },
    /// The result would nest deeper than a saved document can be reopened.
    #[error("'{path}' would nest {depth} containers deep (limit {limit})")]
    TooDeep {
        path: Path,
        depth: usize,
        limit: usize,
    },
}

pub type EditResult<T> = Result<T, EditError>;
