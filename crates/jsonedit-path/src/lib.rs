//! Structural paths for jsonedit documents.
//!
//! A [`Path`] is an immutable sequence of [`PathStep`]s, each either an
//! object key or an array index, addressing one node from the document
//! root. Paths are plain values: they are recomputed after structural
//! edits, never patched in place.
//!
//! The textual form is an [RFC 6901](https://tools.ietf.org/html/rfc6901)
//! JSON Pointer.
//!
//! # Example
//!
//! ```
//! use jsonedit_path::{path, Path, PathStep};
//!
//! let p = path!["users", 0, "name"];
//! assert_eq!(p.to_pointer(), "/users/0/name");
//! assert_eq!(p.parent().unwrap(), path!["users", 0]);
//! assert_eq!(p.last(), Some(&PathStep::Key("name".to_string())));
//! assert!(Path::root().is_ancestor_of(&p));
//! ```

use thiserror::Error;

pub mod types;
pub use types::{Path, PathStep};

pub mod validate;
pub use validate::{validate_json_pointer, MAX_POINTER_LENGTH};

/// Builds a [`Path`] from a list of keys (`&str`/`String`) and indices (`usize`).
///
/// ```
/// use jsonedit_path::{path, Path};
///
/// assert_eq!(path![], Path::root());
/// assert_eq!(path!["a", 1].to_pointer(), "/a/1");
/// ```
#[macro_export]
macro_rules! path {
    () => {
        $crate::Path::root()
    };
    ($($step:expr),+ $(,)?) => {
        $crate::Path::from_steps(vec![$($crate::PathStep::from($step)),+])
    };
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("the root path has no parent")]
    NoParent,
    #[error("invalid JSON pointer: {0:?}")]
    InvalidPointer(String),
    #[error("pointer too long: {0} bytes")]
    PointerTooLong(usize),
}

/// Unescapes a JSON Pointer path component.
///
/// Per RFC 6901, `~1` is replaced with `/` and `~0` is replaced with `~`.
///
/// ```
/// use jsonedit_path::unescape_component;
///
/// assert_eq!(unescape_component("a~0b"), "a~b");
/// assert_eq!(unescape_component("c~1d"), "c/d");
/// ```
pub fn unescape_component(component: &str) -> String {
    if !component.contains('~') {
        return component.to_string();
    }
    // ~1 first, so that "~01" decodes to "~1" and not "/"
    component.replace("~1", "/").replace("~0", "~")
}

/// Escapes a JSON Pointer path component.
///
/// ```
/// use jsonedit_path::escape_component;
///
/// assert_eq!(escape_component("a~b"), "a~0b");
/// assert_eq!(escape_component("c/d"), "c~1d");
/// ```
pub fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    component.replace('~', "~0").replace('/', "~1")
}

/// Splits a JSON Pointer into its unescaped components.
///
/// The empty pointer is the root and has no components.
///
/// # Errors
///
/// Returns [`PathError::InvalidPointer`] when a non-empty pointer does not
/// start with `/`, and the length errors of [`validate_json_pointer`].
///
/// ```
/// use jsonedit_path::parse_json_pointer;
///
/// assert_eq!(parse_json_pointer("").unwrap(), Vec::<String>::new());
/// assert_eq!(parse_json_pointer("/").unwrap(), vec![""]);
/// assert_eq!(parse_json_pointer("/a~0b/c~1d").unwrap(), vec!["a~b", "c/d"]);
/// ```
pub fn parse_json_pointer(pointer: &str) -> Result<Vec<String>, PathError> {
    validate_json_pointer(pointer)?;
    if pointer.is_empty() {
        return Ok(Vec::new());
    }
    Ok(pointer[1..].split('/').map(unescape_component).collect())
}

/// Check if a string is a canonical non-negative array index
/// (digits only, no leading zero except `"0"` itself).
///
/// ```
/// use jsonedit_path::is_valid_index;
///
/// assert!(is_valid_index("0"));
/// assert!(is_valid_index("123"));
/// assert!(!is_valid_index("01"));
/// assert!(!is_valid_index("-1"));
/// ```
pub fn is_valid_index(index: &str) -> bool {
    if index.is_empty() {
        return false;
    }
    let bytes = index.as_bytes();
    if bytes.len() > 1 && bytes[0] == b'0' {
        return false;
    }
    bytes.iter().all(|b| b.is_ascii_digit())
}
