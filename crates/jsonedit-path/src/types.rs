//! Type definitions for structural paths.

use std::fmt;

use crate::{escape_component, PathError};

/// A single step from a container to one of its children.
///
/// Object members are addressed by key, array elements by index. The two
/// kinds never alias: `Key("0")` does not resolve inside an array.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathStep {
    Key(String),
    Index(usize),
}

impl PathStep {
    /// The key, if this step addresses an object member.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            PathStep::Key(key) => Some(key),
            PathStep::Index(_) => None,
        }
    }

    /// The index, if this step addresses an array element.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathStep::Key(_) => None,
            PathStep::Index(idx) => Some(*idx),
        }
    }

    pub fn is_key(&self) -> bool {
        matches!(self, PathStep::Key(_))
    }

    pub fn is_index(&self) -> bool {
        matches!(self, PathStep::Index(_))
    }
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Key(key) => f.write_str(&escape_component(key)),
            PathStep::Index(idx) => write!(f, "{idx}"),
        }
    }
}

impl From<&str> for PathStep {
    fn from(key: &str) -> Self {
        PathStep::Key(key.to_owned())
    }
}

impl From<String> for PathStep {
    fn from(key: String) -> Self {
        PathStep::Key(key)
    }
}

impl From<usize> for PathStep {
    fn from(idx: usize) -> Self {
        PathStep::Index(idx)
    }
}

/// An immutable address of a node, relative to the document root.
///
/// Equality, ordering and hashing are structural over the step sequence.
/// The empty path addresses the root. Every "modifying" method returns a
/// new path and leaves `self` untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    steps: Vec<PathStep>,
}

impl Path {
    /// The root path.
    pub fn root() -> Self {
        Path { steps: Vec::new() }
    }

    pub fn from_steps(steps: Vec<PathStep>) -> Self {
        Path { steps }
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Whether this path addresses the document root.
    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    /// The last step, or `None` at the root.
    pub fn last(&self) -> Option<&PathStep> {
        self.steps.last()
    }

    /// Returns a new path with `step` appended.
    pub fn append(&self, step: impl Into<PathStep>) -> Path {
        let mut steps = Vec::with_capacity(self.steps.len() + 1);
        steps.extend(self.steps.iter().cloned());
        steps.push(step.into());
        Path { steps }
    }

    /// The path of the parent container.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::NoParent`] for the root path.
    pub fn parent(&self) -> Result<Path, PathError> {
        self.split_last().map(|(parent, _)| parent)
    }

    /// Splits off the last step, returning the parent path and the step.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::NoParent`] for the root path.
    pub fn split_last(&self) -> Result<(Path, &PathStep), PathError> {
        match self.steps.split_last() {
            Some((last, parent)) => Ok((Path::from_steps(parent.to_vec()), last)),
            None => Err(PathError::NoParent),
        }
    }

    /// Whether `self` is a strict ancestor of `other`.
    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        self.steps.len() < other.steps.len() && self.is_prefix_of(other)
    }

    /// Whether every step of `self` is a leading step of `other`.
    ///
    /// A path is a prefix of itself.
    pub fn is_prefix_of(&self, other: &Path) -> bool {
        other.steps.starts_with(&self.steps)
    }

    /// Formats the path as an RFC 6901 JSON Pointer.
    pub fn to_pointer(&self) -> String {
        let mut out = String::new();
        for step in &self.steps {
            out.push('/');
            out.push_str(&step.to_string());
        }
        out
    }
}

impl fmt::Display for Path {
    /// Pointer form; the root renders as `/` rather than the empty string so
    /// it stays visible in messages.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return f.write_str("/");
        }
        f.write_str(&self.to_pointer())
    }
}

impl From<Vec<PathStep>> for Path {
    fn from(steps: Vec<PathStep>) -> Self {
        Path { steps }
    }
}

impl FromIterator<PathStep> for Path {
    fn from_iter<I: IntoIterator<Item = PathStep>>(iter: I) -> Self {
        Path {
            steps: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a PathStep;
    type IntoIter = std::slice::Iter<'a, PathStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}
