//! Selection and navigation.
//!
//! The selection is a path that must resolve whenever the front end looks
//! at it. Nodes have no parent pointers; parents and siblings are found by
//! re-resolving paths against the tree.

use jsonedit_path::{Path, PathStep};

use crate::error::{EditError, EditResult};
use crate::node::Node;

/// Structural role of a node, derived from its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Root,
    ObjectMember,
    ArrayElement,
}

/// Role of the node at `path`.
///
/// # Errors
///
/// [`EditError::NodeNotFound`] if `path` does not resolve.
pub fn role_of(root: &Node, path: &Path) -> EditResult<Role> {
    root.child_at(path)?;
    let Ok(parent) = path.parent() else {
        return Ok(Role::Root);
    };
    match root.child_at(&parent)? {
        Node::Object(_) => Ok(Role::ObjectMember),
        _ => Ok(Role::ArrayElement),
    }
}

/// Validates `path` as a new selection.
///
/// # Errors
///
/// [`EditError::NodeNotFound`] if `path` does not resolve.
pub fn focus(root: &Node, path: &Path) -> EditResult<Path> {
    root.child_at(path)?;
    Ok(path.clone())
}

/// Where the selection goes once the node at `deleted` is removed.
///
/// Evaluated against the tree *before* the removal; the returned path is
/// valid in the tree *after* it. Preference: the next sibling (which slides
/// into the removed position), else the previous sibling, else the parent.
/// The root itself cannot be deleted.
///
/// # Errors
///
/// [`EditError::NoParent`] for the root, [`EditError::NodeNotFound`] if
/// `deleted` does not resolve.
pub fn compute_reselection(root: &Node, deleted: &Path) -> EditResult<Path> {
    root.child_at(deleted)?;
    let (parent_path, step) = deleted.split_last().map_err(|_| EditError::NoParent {
        path: deleted.clone(),
    })?;
    let parent = root.child_at(&parent_path)?;
    let position = parent
        .position_of(step)
        .ok_or_else(|| EditError::NoParent {
            path: deleted.clone(),
        })?;
    let count = parent.child_count();

    let target = if position + 1 < count {
        match step {
            // Elements shift left: the next sibling takes the removed index.
            PathStep::Index(idx) => Some(PathStep::Index(*idx)),
            PathStep::Key(_) => parent.step_at(position + 1),
        }
    } else if position > 0 {
        parent.step_at(position - 1)
    } else {
        None
    };

    Ok(match target {
        Some(step) => parent_path.append(step),
        None => parent_path,
    })
}

/// Descends from the root while the current container has exactly one
/// child. Front ends expand the tree down to this path after loading.
pub fn first_bifurcation_path(root: &Node) -> Path {
    let mut steps = Vec::new();
    let mut cur = root;
    while cur.child_count() == 1 {
        let Some((step, child)) = cur.children().next() else {
            break;
        };
        steps.push(step);
        cur = child;
    }
    Path::from_steps(steps)
}
