//! Structural mutations.
//!
//! Every mutation is planned against a private copy of its scope (the
//! selection's parent, or grandparent for [`Mutation::Raise`]). The live
//! tree is written exactly once, by swapping the finished copy in, so a
//! failed precondition never leaves a partial edit behind.

use jsonedit_path::{Path, PathStep};

use crate::codec::check_depth;
use crate::error::{EditError, EditResult};
use crate::history::{Change, ChangeKind};
use crate::node::{rename_member, unique_key, Node};
use crate::selection::compute_reselection;

const INSERT_KEY: &str = "new";
const ELEMENT_KEY: &str = "item";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Insert after the selection. `value` defaults to `null`; `key` is used
    /// for object parents and ignored for arrays.
    InsertSibling {
        value: Option<Node>,
        key: Option<String>,
    },
    /// Deep-copy the selection as its next sibling.
    Duplicate { key: Option<String> },
    /// Move the selection out of its parent, right after that parent.
    Raise,
    /// Move the selection to the end of an adjacent container sibling.
    Lower,
    Rename { to: String },
    Delete,
    /// Swap with the previous or next sibling, wrapping at the ends.
    Reorder(Direction),
}

impl Mutation {
    pub fn insert(value: Node) -> Self {
        Mutation::InsertSibling {
            value: Some(value),
            key: None,
        }
    }

    pub fn rename(to: impl Into<String>) -> Self {
        Mutation::Rename { to: to.into() }
    }

    pub fn kind(&self) -> ChangeKind {
        match self {
            Mutation::InsertSibling { .. } => ChangeKind::InsertSibling,
            Mutation::Duplicate { .. } => ChangeKind::Duplicate,
            Mutation::Raise => ChangeKind::Raise,
            Mutation::Lower => ChangeKind::Lower,
            Mutation::Rename { .. } => ChangeKind::Rename,
            Mutation::Delete => ChangeKind::Delete,
            Mutation::Reorder(_) => ChangeKind::Reorder,
        }
    }
}

/// A validated mutation, not yet applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub scope: Path,
    /// Replacement for the node at `scope`.
    pub after: Node,
    pub selection: Path,
}

/// Validates `mutation` at `selection` and computes its result without
/// touching `root`.
///
/// # Errors
///
/// [`EditError::NodeNotFound`] for a stale selection;
/// [`EditError::TooDeep`] if the result would nest past
/// [`MAX_DEPTH`](crate::codec::MAX_DEPTH); otherwise the precondition error
/// of the specific mutation.
pub fn plan(root: &Node, selection: &Path, mutation: &Mutation) -> EditResult<Plan> {
    root.child_at(selection)?;
    let plan = match mutation {
        Mutation::InsertSibling { value, key } => insert_sibling(
            root,
            selection,
            value.clone().unwrap_or_default(),
            key.as_deref(),
        ),
        Mutation::Duplicate { key } => duplicate(root, selection, key.as_deref()),
        Mutation::Raise => raise(root, selection),
        Mutation::Lower => lower(root, selection),
        Mutation::Rename { to } => rename(root, selection, to),
        Mutation::Delete => delete(root, selection),
        Mutation::Reorder(direction) => reorder(root, selection, *direction),
    }?;
    check_depth(&plan.scope, &plan.after)?;
    Ok(plan)
}

/// Applies `mutation` to `root` and returns the change record.
///
/// # Errors
///
/// Same as [`plan`]; `root` is unchanged on error.
pub fn apply(root: &mut Node, selection: &Path, mutation: &Mutation) -> EditResult<Change> {
    let Plan {
        scope,
        after,
        selection: selection_after,
    } = plan(root, selection, mutation)?;
    let before = root.set(&scope, after.clone())?;
    Ok(Change {
        kind: mutation.kind(),
        scope,
        before,
        after,
        selection_before: selection.clone(),
        selection_after,
    })
}

// ── Mutations ─────────────────────────────────────────────────────────────

fn insert_sibling(root: &Node, selection: &Path, value: Node, key: Option<&str>) -> EditResult<Plan> {
    let (parent_path, step) = split(selection)?;
    let mut parent = root.child_at(&parent_path)?.clone();
    let position = position(&parent, step, selection)?;
    let base = claim_key(&parent, &parent_path, key)?.unwrap_or(INSERT_KEY);
    let new_step = insert_child(&mut parent, position + 1, base, value, selection)?;
    Ok(Plan {
        selection: parent_path.append(new_step),
        scope: parent_path,
        after: parent,
    })
}

fn duplicate(root: &Node, selection: &Path, key: Option<&str>) -> EditResult<Plan> {
    let (parent_path, step) = split(selection)?;
    let copy = root.child_at(selection)?.clone();
    let mut parent = root.child_at(&parent_path)?.clone();
    let position = position(&parent, step, selection)?;
    let base = claim_key(&parent, &parent_path, key)?
        .or(step.as_key())
        .unwrap_or(ELEMENT_KEY);
    let new_step = insert_child(&mut parent, position + 1, base, copy, selection)?;
    Ok(Plan {
        selection: parent_path.append(new_step),
        scope: parent_path,
        after: parent,
    })
}

fn raise(root: &Node, selection: &Path) -> EditResult<Plan> {
    let (parent_path, step) = split(selection)?;
    // A direct child of the root has nowhere to go.
    let (grand_path, parent_step) = split(&parent_path).map_err(|_| EditError::NoParent {
        path: selection.clone(),
    })?;
    let mut grand = root.child_at(&grand_path)?.clone();
    let parent_position = position(&grand, parent_step, selection)?;
    let parent = child_mut(&mut grand, parent_step, selection)?;
    let node = take_child(parent, step, selection)?;
    let base = step.as_key().unwrap_or(ELEMENT_KEY);
    let new_step = insert_child(&mut grand, parent_position + 1, base, node, selection)?;
    Ok(Plan {
        selection: grand_path.append(new_step),
        scope: grand_path,
        after: grand,
    })
}

fn lower(root: &Node, selection: &Path) -> EditResult<Plan> {
    let (parent_path, step) = split(selection)?;
    let mut parent = root.child_at(&parent_path)?.clone();
    let position = position(&parent, step, selection)?;
    let accepts = |pos: usize| {
        parent
            .step_at(pos)
            .filter(|s| parent.get(s).is_some_and(Node::is_container))
    };
    let target = accepts(position + 1)
        .or_else(|| position.checked_sub(1).and_then(accepts))
        .ok_or_else(|| EditError::NoSibling {
            path: selection.clone(),
        })?;

    let node = take_child(&mut parent, step, selection)?;
    // Removing an element shifts every later index down by one.
    let target = match target {
        PathStep::Index(idx) if idx > position => PathStep::Index(idx - 1),
        other => other,
    };
    let container = child_mut(&mut parent, &target, selection)?;
    let end = container.child_count();
    let base = step.as_key().unwrap_or(ELEMENT_KEY);
    let new_step = insert_child(container, end, base, node, selection)?;
    Ok(Plan {
        selection: parent_path.append(target).append(new_step),
        scope: parent_path,
        after: parent,
    })
}

fn rename(root: &Node, selection: &Path, to: &str) -> EditResult<Plan> {
    let (parent_path, step) = selection.split_last().map_err(|_| EditError::NotApplicable {
        path: selection.clone(),
        reason: "the root has no key",
    })?;
    let mut parent = root.child_at(&parent_path)?.clone();
    let (Some(from), Some(obj)) = (step.as_key(), parent.as_object_mut()) else {
        return Err(EditError::NotApplicable {
            path: selection.clone(),
            reason: "array elements have no key",
        });
    };
    if from != to && obj.contains_key(to) {
        return Err(EditError::DuplicateKey {
            parent: parent_path,
            key: to.to_owned(),
        });
    }
    rename_member(obj, from, to);
    Ok(Plan {
        selection: parent_path.append(to),
        scope: parent_path,
        after: parent,
    })
}

fn delete(root: &Node, selection: &Path) -> EditResult<Plan> {
    let (parent_path, step) = split(selection)?;
    let reselect = compute_reselection(root, selection)?;
    let mut parent = root.child_at(&parent_path)?.clone();
    take_child(&mut parent, step, selection)?;
    Ok(Plan {
        scope: parent_path,
        after: parent,
        selection: reselect,
    })
}

fn reorder(root: &Node, selection: &Path, direction: Direction) -> EditResult<Plan> {
    let (parent_path, step) = split(selection)?;
    let mut parent = root.child_at(&parent_path)?.clone();
    let count = parent.child_count();
    if count < 2 {
        return Err(EditError::NoSibling {
            path: selection.clone(),
        });
    }
    let position = position(&parent, step, selection)?;
    let other = match direction {
        Direction::Up => (position + count - 1) % count,
        Direction::Down => (position + 1) % count,
    };
    let moved = match &mut parent {
        Node::Object(map) => {
            map.swap_indices(position, other);
            step.clone()
        }
        Node::Array(arr) => {
            arr.swap(position, other);
            PathStep::Index(other)
        }
        _ => return Err(not_container(selection)),
    };
    Ok(Plan {
        selection: parent_path.append(moved),
        scope: parent_path,
        after: parent,
    })
}

// ── Helpers ───────────────────────────────────────────────────────────────

fn split(path: &Path) -> EditResult<(Path, &PathStep)> {
    path.split_last()
        .map_err(|_| EditError::NoParent { path: path.clone() })
}

fn position(parent: &Node, step: &PathStep, selection: &Path) -> EditResult<usize> {
    parent
        .position_of(step)
        .ok_or_else(|| not_container(selection))
}

/// Checks a caller-supplied key against an object parent.
fn claim_key<'k>(parent: &Node, parent_path: &Path, key: Option<&'k str>) -> EditResult<Option<&'k str>> {
    match (parent, key) {
        (Node::Object(map), Some(key)) if map.contains_key(key) => Err(EditError::DuplicateKey {
            parent: parent_path.clone(),
            key: key.to_owned(),
        }),
        _ => Ok(key),
    }
}

fn child_mut<'a>(container: &'a mut Node, step: &PathStep, selection: &Path) -> EditResult<&'a mut Node> {
    container
        .child_at_mut(&Path::root().append(step.clone()))
        .map_err(|_| not_container(selection))
}

fn take_child(container: &mut Node, step: &PathStep, selection: &Path) -> EditResult<Node> {
    let taken = match (container, step) {
        (Node::Object(map), PathStep::Key(key)) => map.shift_remove(key),
        (Node::Array(arr), PathStep::Index(idx)) if *idx < arr.len() => Some(arr.remove(*idx)),
        _ => None,
    };
    taken.ok_or_else(|| not_container(selection))
}

/// Inserts `node` at `position` (clamped). Object members get `base` made
/// unique with a numeric suffix.
fn insert_child(
    container: &mut Node,
    position: usize,
    base: &str,
    node: Node,
    selection: &Path,
) -> EditResult<PathStep> {
    match container {
        Node::Object(map) => {
            let key = unique_key(map, base);
            map.shift_insert(position.min(map.len()), key.clone(), node);
            Ok(PathStep::Key(key))
        }
        Node::Array(arr) => {
            let position = position.min(arr.len());
            arr.insert(position, node);
            Ok(PathStep::Index(position))
        }
        _ => Err(not_container(selection)),
    }
}

fn not_container(selection: &Path) -> EditError {
    EditError::NotApplicable {
        path: selection.clone(),
        reason: "target is not a container",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonedit_path::path;
    use serde_json::json;

    fn run(doc: serde_json::Value, sel: Path, m: Mutation) -> EditResult<(Node, Path)> {
        let mut root = Node::from(doc);
        let change = apply(&mut root, &sel, &m)?;
        Ok((root, change.selection_after))
    }

    fn n(value: serde_json::Value) -> Node {
        Node::from(value)
    }

    #[test]
    fn insert_sibling_after_selection() {
        let (root, sel) = run(json!({"a": [1, 2]}), path!["a", 0], Mutation::insert(n(json!(9)))).unwrap();
        assert_eq!(root, n(json!({"a": [1, 9, 2]})));
        assert_eq!(sel, path!["a", 1]);

        let insert = Mutation::InsertSibling { value: None, key: None };
        let (root, sel) = run(json!({"x": 1, "new": 2, "y": 3}), path!["x"], insert).unwrap();
        assert_eq!(root, n(json!({"x": 1, "new_1": null, "new": 2, "y": 3})));
        assert_eq!(sel, path!["new_1"]);
        let keys: Vec<&str> = root.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["x", "new_1", "new", "y"]);
    }

    #[test]
    fn insert_rejects_root_and_taken_key() {
        let insert = Mutation::InsertSibling { value: None, key: None };
        assert!(matches!(run(json!({}), path![], insert), Err(EditError::NoParent { .. })));

        let keyed = Mutation::InsertSibling {
            value: None,
            key: Some("y".into()),
        };
        assert_eq!(
            run(json!({"x": 1, "y": 2}), path!["x"], keyed).unwrap_err(),
            EditError::DuplicateKey {
                parent: path![],
                key: "y".into()
            }
        );
    }

    #[test]
    fn duplicate_deep_copies_next_to_source() {
        let (root, sel) = run(json!({"a": [1, 2, 3]}), path!["a", 0], Mutation::Duplicate { key: None }).unwrap();
        assert_eq!(root, n(json!({"a": [1, 1, 2, 3]})));
        assert_eq!(sel, path!["a", 1]);

        let (root, sel) = run(
            json!({"k": {"deep": [1]}, "k_1": 0, "z": 1}),
            path!["k"],
            Mutation::Duplicate { key: None },
        )
        .unwrap();
        assert_eq!(sel, path!["k_2"]);
        let keys: Vec<&str> = root.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["k", "k_2", "k_1", "z"]);
        assert_eq!(root.child_at(&path!["k_2", "deep", 0]).unwrap(), &Node::from(1));
    }

    #[test]
    fn raise_moves_after_former_parent() {
        let (root, sel) = run(json!({"a": {"b": [1, 2]}}), path!["a", "b", 0], Mutation::Raise).unwrap();
        assert_eq!(root, n(json!({"a": {"b": [2], "item": 1}})));
        assert_eq!(sel, path!["a", "item"]);

        let (root, sel) = run(json!([[1, 2], 3]), path![0, 1], Mutation::Raise).unwrap();
        assert_eq!(root, n(json!([[1], 2, 3])));
        assert_eq!(sel, path![1]);

        let (root, sel) = run(json!({"p": {"x": {"x": 1}}}), path!["p", "x", "x"], Mutation::Raise).unwrap();
        assert_eq!(root, n(json!({"p": {"x": {}, "x_1": 1}})));
        assert_eq!(sel, path!["p", "x_1"]);
    }

    #[test]
    fn raise_fails_near_root() {
        assert!(matches!(run(json!({"a": 1}), path!["a"], Mutation::Raise), Err(EditError::NoParent { .. })));
        assert!(matches!(run(json!({"a": 1}), path![], Mutation::Raise), Err(EditError::NoParent { .. })));
    }

    #[test]
    fn lower_prefers_following_container() {
        let (root, sel) = run(json!([1, [2], {"k": 3}]), path![0], Mutation::Lower).unwrap();
        assert_eq!(root, n(json!([[2, 1], {"k": 3}])));
        assert_eq!(sel, path![0, 1]);

        let (root, sel) = run(json!({"c": {"k": 3}, "v": 1, "w": 2}), path!["v"], Mutation::Lower).unwrap();
        assert_eq!(root, n(json!({"c": {"k": 3, "v": 1}, "w": 2})));
        assert_eq!(sel, path!["c", "v"]);

        let (root, sel) = run(json!([{"item": 0}, 5, 6]), path![1], Mutation::Lower).unwrap();
        assert_eq!(root, n(json!([{"item": 0, "item_1": 5}, 6])));
        assert_eq!(sel, path![0, "item_1"]);
    }

    #[test]
    fn lower_without_container_sibling_fails() {
        assert!(matches!(
            run(json!([1, 2, 3]), path![1], Mutation::Lower),
            Err(EditError::NoSibling { .. })
        ));
        assert!(matches!(run(json!([[1]]), path![0], Mutation::Lower), Err(EditError::NoSibling { .. })));
    }

    #[test]
    fn plans_past_the_depth_limit_are_rejected() {
        use crate::codec::MAX_DEPTH;

        let nested = |levels: usize| (0..levels).fold(Node::Null, |inner, _| Node::Array(vec![inner]));
        let mut root = Node::Array(vec![nested(MAX_DEPTH - 1), Node::Array(Vec::new())]);
        let before = root.clone();
        let err = apply(&mut root, &path![0], &Mutation::Lower).unwrap_err();
        assert!(matches!(err, EditError::TooDeep { depth, limit: MAX_DEPTH, .. } if depth == MAX_DEPTH + 1));
        assert_eq!(root, before);

        let mut root = Node::Array(vec![Node::Null]);
        let insert = Mutation::insert(nested(MAX_DEPTH));
        assert!(matches!(apply(&mut root, &path![0], &insert), Err(EditError::TooDeep { .. })));
        let insert = Mutation::insert(nested(MAX_DEPTH - 1));
        assert!(apply(&mut root, &path![0], &insert).is_ok());
    }

    #[test]
    fn rename_keeps_position() {
        let (root, sel) = run(json!({"a": 1, "b": 2, "c": 3}), path!["b"], Mutation::rename("z")).unwrap();
        let keys: Vec<&str> = root.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "z", "c"]);
        assert_eq!(sel, path!["z"]);
    }

    #[test]
    fn rename_errors() {
        assert_eq!(
            run(json!({"a": 1, "b": 2}), path!["b"], Mutation::rename("a")).unwrap_err(),
            EditError::DuplicateKey {
                parent: path![],
                key: "a".into()
            }
        );
        assert!(matches!(
            run(json!([1]), path![0], Mutation::rename("x")),
            Err(EditError::NotApplicable { .. })
        ));
        assert!(matches!(
            run(json!({}), path![], Mutation::rename("x")),
            Err(EditError::NotApplicable { .. })
        ));
    }

    #[test]
    fn rename_to_self_is_noop() {
        let mut root = n(json!({"a": 1}));
        let change = apply(&mut root, &path!["a"], &Mutation::rename("a")).unwrap();
        assert!(change.is_noop());
    }

    #[test]
    fn delete_reselects() {
        let (root, sel) = run(json!({"a": [1, 2, 3]}), path!["a", 1], Mutation::Delete).unwrap();
        assert_eq!(root, n(json!({"a": [1, 3]})));
        assert_eq!(sel, path!["a", 1]);
        assert!(root.contains_path(&sel));

        let (root, sel) = run(json!({"a": [1]}), path!["a", 0], Mutation::Delete).unwrap();
        assert_eq!(root, n(json!({"a": []})));
        assert_eq!(sel, path!["a"]);

        assert!(matches!(run(json!([]), path![], Mutation::Delete), Err(EditError::NoParent { .. })));
    }

    #[test]
    fn reorder_swaps_and_wraps() {
        let (root, sel) = run(json!([1, 2, 3]), path![1], Mutation::Reorder(Direction::Up)).unwrap();
        assert_eq!(root, n(json!([2, 1, 3])));
        assert_eq!(sel, path![0]);

        let (root, sel) = run(json!([1, 2, 3]), path![2], Mutation::Reorder(Direction::Down)).unwrap();
        assert_eq!(root, n(json!([3, 2, 1])));
        assert_eq!(sel, path![0]);

        let (root, sel) = run(json!({"a": 1, "b": 2}), path!["a"], Mutation::Reorder(Direction::Down)).unwrap();
        let keys: Vec<&str> = root.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(sel, path!["a"]);

        assert!(matches!(
            run(json!({"a": [1]}), path!["a", 0], Mutation::Reorder(Direction::Up)),
            Err(EditError::NoSibling { .. })
        ));
    }

    #[test]
    fn failed_mutation_leaves_tree_untouched() {
        let mut root = n(json!({"a": 1, "b": 2}));
        let before = root.clone();
        assert!(apply(&mut root, &path!["b"], &Mutation::rename("a")).is_err());
        assert!(apply(&mut root, &path!["zz"], &Mutation::Delete).is_err());
        assert_eq!(root, before);
    }

    #[test]
    fn change_records_scope_snapshots() {
        let mut root = n(json!({"a": {"b": [1, 2]}, "c": 0}));
        let change = apply(&mut root, &path!["a", "b", 1], &Mutation::Raise).unwrap();
        assert_eq!(change.scope, path!["a"]);
        assert_eq!(change.before, n(json!({"b": [1, 2]})));
        assert_eq!(change.after, n(json!({"b": [1], "item": 2})));
        assert_eq!(change.kind, ChangeKind::Raise);
    }
}
