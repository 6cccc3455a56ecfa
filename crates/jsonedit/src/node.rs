//! The document tree.
//!
//! [`Node`] is a closed sum over the six JSON kinds. Containers own their
//! children outright: there are no back-references and no shared subtrees,
//! so `Clone` is a deep copy and every node has exactly one path.

use std::fmt;

use indexmap::IndexMap;
use jsonedit_path::{is_valid_index, parse_json_pointer, Path, PathStep};
use serde_json::{Number, Value};

use crate::error::{EditError, EditResult, NotFoundReason};

/// Object members in insertion order.
pub type Object = IndexMap<String, Node>;

#[derive(Debug, Clone)]
pub enum Node {
    Object(Object),
    Array(Vec<Node>),
    String(String),
    Number(Number),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Object,
    Array,
    String,
    Number,
    Boolean,
    Null,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Object => "object",
            NodeKind::Array => "array",
            NodeKind::String => "string",
            NodeKind::Number => "number",
            NodeKind::Boolean => "boolean",
            NodeKind::Null => "null",
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, NodeKind::Object | NodeKind::Array)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for Node {
    fn default() -> Self {
        Node::Null
    }
}

/// Structural equality. Unlike `IndexMap`'s own `PartialEq`, member order
/// is significant.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Node::Object(a), Node::Object(b)) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .zip(b.iter())
                        .all(|((ka, va), (kb, vb))| ka == kb && va == vb)
            }
            (Node::Array(a), Node::Array(b)) => a == b,
            (Node::String(a), Node::String(b)) => a == b,
            (Node::Number(a), Node::Number(b)) => a == b,
            (Node::Bool(a), Node::Bool(b)) => a == b,
            (Node::Null, Node::Null) => true,
            _ => false,
        }
    }
}

// ── Queries ───────────────────────────────────────────────────────────────

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Object(_) => NodeKind::Object,
            Node::Array(_) => NodeKind::Array,
            Node::String(_) => NodeKind::String,
            Node::Number(_) => NodeKind::Number,
            Node::Bool(_) => NodeKind::Boolean,
            Node::Null => NodeKind::Null,
        }
    }

    pub fn is_container(&self) -> bool {
        self.kind().is_container()
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Node::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut Object> {
        match self {
            Node::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Node>> {
        match self {
            Node::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    /// Number of direct children; zero for scalars.
    pub fn child_count(&self) -> usize {
        match self {
            Node::Object(map) => map.len(),
            Node::Array(arr) => arr.len(),
            _ => 0,
        }
    }

    /// Containers on the deepest branch, counting this node: `0` for a
    /// scalar, `1` for a flat or empty container.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 0usize)];
        while let Some((node, above)) = stack.pop() {
            if !node.is_container() {
                continue;
            }
            let level = above + 1;
            deepest = deepest.max(level);
            stack.extend(node.children().map(|(_, child)| (child, level)));
        }
        deepest
    }

    /// The direct child addressed by `step`, if any.
    pub fn get(&self, step: &PathStep) -> Option<&Node> {
        step_into(self, step).ok()
    }

    /// Resolves `path` from this node.
    ///
    /// # Errors
    ///
    /// [`EditError::NodeNotFound`] naming the first step that does not
    /// resolve: a missing key, an index out of bounds, or a step of the
    /// wrong kind for its container.
    pub fn child_at(&self, path: &Path) -> EditResult<&Node> {
        let mut cur = self;
        for (depth, step) in path.steps().iter().enumerate() {
            cur = step_into(cur, step).map_err(|reason| not_found(path, depth, reason))?;
        }
        Ok(cur)
    }

    /// Mutable counterpart of [`Node::child_at`].
    ///
    /// # Errors
    ///
    /// Same as [`Node::child_at`].
    pub fn child_at_mut(&mut self, path: &Path) -> EditResult<&mut Node> {
        let mut cur = self;
        for (depth, step) in path.steps().iter().enumerate() {
            cur = step_into_mut(cur, step).map_err(|reason| not_found(path, depth, reason))?;
        }
        Ok(cur)
    }

    pub fn contains_path(&self, path: &Path) -> bool {
        self.child_at(path).is_ok()
    }

    /// Ordered `(step, child)` pairs: members in insertion order, elements by
    /// index. Scalars have none.
    pub fn children(&self) -> Children<'_> {
        match self {
            Node::Object(map) => Children::Object(map.iter()),
            Node::Array(arr) => Children::Array(arr.iter().enumerate()),
            _ => Children::Leaf,
        }
    }

    /// Position of the child addressed by `step` among this node's children.
    pub fn position_of(&self, step: &PathStep) -> Option<usize> {
        match (self, step) {
            (Node::Object(map), PathStep::Key(key)) => map.get_index_of(key),
            (Node::Array(arr), PathStep::Index(idx)) if *idx < arr.len() => Some(*idx),
            _ => None,
        }
    }

    /// The step addressing the child at `position`.
    pub fn step_at(&self, position: usize) -> Option<PathStep> {
        match self {
            Node::Object(map) => map
                .get_index(position)
                .map(|(key, _)| PathStep::Key(key.clone())),
            Node::Array(arr) if position < arr.len() => Some(PathStep::Index(position)),
            _ => None,
        }
    }

    /// Scalar value as text: strings raw, numbers canonical, `true`/`false`,
    /// `null`. `None` for containers.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            Node::String(s) => Some(s.clone()),
            Node::Number(n) => Some(n.to_string()),
            Node::Bool(b) => Some(b.to_string()),
            Node::Null => Some("null".to_owned()),
            Node::Object(_) | Node::Array(_) => None,
        }
    }

    /// Resolves an RFC 6901 pointer against this tree, reading each
    /// component as a key or an index according to the container it meets.
    ///
    /// # Errors
    ///
    /// [`EditError::InvalidPath`] for malformed pointer text,
    /// [`EditError::NodeNotFound`] when a component does not resolve.
    pub fn resolve_pointer(&self, pointer: &str) -> EditResult<Path> {
        let components = parse_json_pointer(pointer)?;
        let mut steps = Vec::with_capacity(components.len());
        let mut cur = self;
        for (depth, component) in components.into_iter().enumerate() {
            let step = match cur {
                Node::Array(_) if is_valid_index(&component) => match component.parse() {
                    Ok(idx) => PathStep::Index(idx),
                    Err(_) => PathStep::Key(component),
                },
                _ => PathStep::Key(component),
            };
            cur = step_into(cur, &step).map_err(|reason| {
                let mut partial = steps.clone();
                partial.push(step.clone());
                not_found(&Path::from_steps(partial), depth, reason)
            })?;
            steps.push(step);
        }
        Ok(Path::from_steps(steps))
    }
}

// ── Edits ─────────────────────────────────────────────────────────────────

impl Node {
    /// Substitutes the node at `path` in place and returns the previous one.
    ///
    /// # Errors
    ///
    /// [`EditError::NodeNotFound`] if `path` does not resolve; `self` is
    /// left untouched.
    pub fn set(&mut self, path: &Path, node: Node) -> EditResult<Node> {
        let slot = self.child_at_mut(path)?;
        Ok(std::mem::replace(slot, node))
    }

    /// Returns a new tree with the node at `path` substituted.
    ///
    /// # Errors
    ///
    /// Same as [`Node::set`].
    pub fn replace(&self, path: &Path, node: Node) -> EditResult<Node> {
        self.child_at(path)?;
        let mut next = self.clone();
        next.set(path, node)?;
        Ok(next)
    }
}

/// Returns `base` if `obj` has no such member, else `base_1`, `base_2`, ...
pub fn unique_key(obj: &Object, base: &str) -> String {
    if !obj.contains_key(base) {
        return base.to_owned();
    }
    (1..)
        .map(|n| format!("{base}_{n}"))
        .find(|candidate| !obj.contains_key(candidate))
        .unwrap_or_else(|| base.to_owned())
}

/// Renames member `from` to `to` without moving it.
///
/// Returns `false` if `from` is missing or `to` is already taken; the object
/// is unchanged in that case.
pub fn rename_member(obj: &mut Object, from: &str, to: &str) -> bool {
    if from == to {
        return obj.contains_key(from);
    }
    if obj.contains_key(to) {
        return false;
    }
    let Some((idx, _, value)) = obj.shift_remove_full(from) else {
        return false;
    };
    obj.shift_insert(idx, to.to_owned(), value);
    true
}

// ── Traversal helpers ─────────────────────────────────────────────────────

fn step_into<'a>(node: &'a Node, step: &PathStep) -> Result<&'a Node, NotFoundReason> {
    match (step, node) {
        (PathStep::Key(key), Node::Object(map)) => map
            .get(key)
            .ok_or_else(|| NotFoundReason::MissingKey(key.clone())),
        (PathStep::Index(idx), Node::Array(arr)) => {
            arr.get(*idx).ok_or(NotFoundReason::IndexOutOfBounds {
                index: *idx,
                len: arr.len(),
            })
        }
        (step, other) => Err(NotFoundReason::KindMismatch {
            step: step.clone(),
            found: other.kind(),
        }),
    }
}

fn step_into_mut<'a>(node: &'a mut Node, step: &PathStep) -> Result<&'a mut Node, NotFoundReason> {
    match (step, node) {
        (PathStep::Key(key), Node::Object(map)) => map
            .get_mut(key)
            .ok_or_else(|| NotFoundReason::MissingKey(key.clone())),
        (PathStep::Index(idx), Node::Array(arr)) => {
            let len = arr.len();
            arr.get_mut(*idx)
                .ok_or(NotFoundReason::IndexOutOfBounds { index: *idx, len })
        }
        (step, other) => Err(NotFoundReason::KindMismatch {
            step: step.clone(),
            found: other.kind(),
        }),
    }
}

fn not_found(path: &Path, depth: usize, reason: NotFoundReason) -> EditError {
    EditError::NodeNotFound {
        path: path.clone(),
        depth,
        reason,
    }
}

/// Iterator returned by [`Node::children`].
#[derive(Debug, Clone)]
pub enum Children<'a> {
    Object(indexmap::map::Iter<'a, String, Node>),
    Array(std::iter::Enumerate<std::slice::Iter<'a, Node>>),
    Leaf,
}

impl<'a> Iterator for Children<'a> {
    type Item = (PathStep, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Children::Object(iter) => iter
                .next()
                .map(|(key, child)| (PathStep::Key(key.clone()), child)),
            Children::Array(iter) => iter.next().map(|(idx, child)| (PathStep::Index(idx), child)),
            Children::Leaf => None,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Children::Object(iter) => iter.size_hint(),
            Children::Array(iter) => iter.size_hint(),
            Children::Leaf => (0, Some(0)),
        }
    }
}

// ── Conversions ───────────────────────────────────────────────────────────

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(b),
            Value::Number(n) => Node::Number(n),
            Value::String(s) => Node::String(s),
            Value::Array(arr) => Node::Array(arr.into_iter().map(Node::from).collect()),
            Value::Object(map) => {
                Node::Object(map.into_iter().map(|(k, v)| (k, Node::from(v))).collect())
            }
        }
    }
}

impl From<&Node> for Value {
    fn from(node: &Node) -> Self {
        match node {
            Node::Null => Value::Null,
            Node::Bool(b) => Value::Bool(*b),
            Node::Number(n) => Value::Number(n.clone()),
            Node::String(s) => Value::String(s.clone()),
            Node::Array(arr) => Value::Array(arr.iter().map(Value::from).collect()),
            Node::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        Value::from(&node)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::String(s.to_owned())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::String(s)
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Bool(b)
    }
}

impl From<i64> for Node {
    fn from(n: i64) -> Self {
        Node::Number(n.into())
    }
}
