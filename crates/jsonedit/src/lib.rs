//! jsonedit: structural engine for a JSON tree editor.
//!
//! The document is an ordered tree of [`Node`]s addressed by [`Path`]s. A
//! front end drives a [`Session`]: it moves the selection, reads subtrees
//! through the codec, edits text in the sandbox and commits it back, and
//! applies structural [`Mutation`]s, all undoable.
//!
//! ```
//! use jsonedit::{path, Mode, Session};
//!
//! let mut session = Session::load(r#"{"a": [1, 2, 3]}"#).unwrap();
//! session.focus(&path!["a", 1]).unwrap();
//! session.delete().unwrap();
//! assert_eq!(session.selection(), &path!["a", 1]);
//! assert_eq!(session.export(&path![], Mode::Compact).unwrap(), r#"{"a":[1,3]}"#);
//! session.undo().unwrap();
//! assert_eq!(session.export(&path![], Mode::Compact).unwrap(), r#"{"a":[1,2,3]}"#);
//! ```

pub mod codec;
pub mod config;
pub mod document;
pub mod error;
pub mod events;
pub mod history;
pub mod node;
pub mod ops;
pub mod sandbox;
pub mod search;
pub mod selection;
pub mod session;

pub use jsonedit_path::{path, Path, PathError, PathStep};

pub use codec::{parse, serialize, serialize_with_indent, Mode, MAX_DEPTH};
pub use config::EditorConfig;
pub use document::{export_text, load_document, Document};
pub use error::{EditError, EditResult, HistoryDirection, NotFoundReason, ParseError};
pub use events::{DocumentEvent, DocumentOrigin, SelectionCause, SelectionEvent};
pub use history::{Change, ChangeKind, History};
pub use node::{Node, NodeKind, Object};
pub use ops::{Direction, Mutation};
pub use sandbox::{Sandbox, SandboxState, TextMode};
pub use search::{search_keys, MatchPolicy, SearchMatches, SearchOptions};
pub use selection::{compute_reselection, first_bifurcation_path, Role};
pub use session::{SearchOutcome, Session};
