//! Key/value search in document pre-order.
//!
//! A node matches when its key (object members only) matches under
//! [`SearchOptions::keys`], or when it is a scalar whose
//! [`Node::scalar_text`] matches under [`SearchOptions::values`].

use jsonedit_path::Path;
use serde::Deserialize;

use crate::node::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    Exact,
    Substring,
}

impl MatchPolicy {
    pub fn matches(&self, haystack: &str, needle: &str, case_sensitive: bool) -> bool {
        if case_sensitive {
            return match self {
                MatchPolicy::Exact => haystack == needle,
                MatchPolicy::Substring => haystack.contains(needle),
            };
        }
        let haystack = haystack.to_lowercase();
        let needle = needle.to_lowercase();
        match self {
            MatchPolicy::Exact => haystack == needle,
            MatchPolicy::Substring => haystack.contains(&needle),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SearchOptions {
    pub keys: MatchPolicy,
    /// Policy for scalar values; `None` searches keys only.
    pub values: Option<MatchPolicy>,
    pub case_sensitive: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            keys: MatchPolicy::Exact,
            values: Some(MatchPolicy::Substring),
            case_sensitive: true,
        }
    }
}

impl SearchOptions {
    fn is_match(&self, query: &str, key: Option<&str>, node: &Node) -> bool {
        if let Some(key) = key {
            if self.keys.matches(key, query, self.case_sensitive) {
                return true;
            }
        }
        match (self.values, node.scalar_text()) {
            (Some(policy), Some(text)) => policy.matches(&text, query, self.case_sensitive),
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
struct Frame<'a> {
    path: Path,
    key: Option<&'a str>,
    node: &'a Node,
}

/// Lazy pre-order sequence of matching paths below one scope node.
///
/// The sequence is finite and `Clone`; [`SearchMatches::restart`] rewinds it.
/// An empty query matches nothing.
#[derive(Debug, Clone)]
pub struct SearchMatches<'a> {
    scope: Frame<'a>,
    query: String,
    options: SearchOptions,
    stack: Vec<Frame<'a>>,
}

impl<'a> SearchMatches<'a> {
    pub fn restart(&mut self) {
        self.stack.clear();
        if !self.query.is_empty() {
            self.stack.push(self.scope.clone());
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

impl<'a> Iterator for SearchMatches<'a> {
    type Item = Path;

    fn next(&mut self) -> Option<Path> {
        while let Some(frame) = self.stack.pop() {
            match frame.node {
                Node::Object(map) => {
                    for (key, child) in map.iter().rev() {
                        self.stack.push(Frame {
                            path: frame.path.append(key.as_str()),
                            key: Some(key.as_str()),
                            node: child,
                        });
                    }
                }
                Node::Array(arr) => {
                    for (idx, child) in arr.iter().enumerate().rev() {
                        self.stack.push(Frame {
                            path: frame.path.append(idx),
                            key: None,
                            node: child,
                        });
                    }
                }
                _ => {}
            }
            if self.options.is_match(&self.query, frame.key, frame.node) {
                return Some(frame.path);
            }
        }
        None
    }
}

/// Searches the subtree of `root` at `from` (use the root path for the whole
/// document). The scope node's own key is not considered.
///
/// # Errors
///
/// [`crate::EditError::NodeNotFound`] if `from` does not resolve.
pub fn search_keys<'a>(
    root: &'a Node,
    query: &str,
    from: &Path,
    options: &SearchOptions,
) -> crate::EditResult<SearchMatches<'a>> {
    let scope = Frame {
        path: from.clone(),
        key: None,
        node: root.child_at(from)?,
    };
    let mut matches = SearchMatches {
        scope,
        query: query.to_owned(),
        options: options.clone(),
        stack: Vec::new(),
    };
    matches.restart();
    Ok(matches)
}

/// Position of `path` in pre-order, as the child position at every level.
/// Lexicographic order of these keys is pre-order.
pub fn preorder_key(root: &Node, path: &Path) -> Option<Vec<usize>> {
    let mut key = Vec::with_capacity(path.len());
    let mut cur = root;
    for step in path {
        key.push(cur.position_of(step)?);
        cur = cur.get(step)?;
    }
    Some(key)
}

/// A match found by [`next_match_after`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPosition {
    pub path: Path,
    /// 0-based position among all matches.
    pub index: usize,
    pub total: usize,
    /// The search ran off the end and restarted from the first match.
    pub wrapped: bool,
}

/// The first match strictly after `current` in pre-order over the whole
/// document, wrapping to the first match. `None` when nothing matches.
pub fn next_match_after(
    root: &Node,
    query: &str,
    current: &Path,
    options: &SearchOptions,
) -> Option<MatchPosition> {
    let matches: Vec<Path> = search_keys(root, query, &Path::root(), options).ok()?.collect();
    let total = matches.len();
    let current_key = preorder_key(root, current);
    let after = matches.iter().position(|candidate| {
        match (&current_key, preorder_key(root, candidate)) {
            (Some(cur), Some(cand)) => cand > *cur,
            _ => false,
        }
    });
    let (index, wrapped) = match after {
        Some(index) => (index, false),
        None if total > 0 => (0, true),
        None => return None,
    };
    tracing::trace!(query, %current, index, total, wrapped, "search advanced");
    Some(MatchPosition {
        path: matches[index].clone(),
        index,
        total,
        wrapped,
    })
}
