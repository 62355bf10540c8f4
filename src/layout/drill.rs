use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::{NodeId, NodeTree};
use crate::error::{LayoutError, LayoutResult};

/// Outcome of resolving a `/`-delimited drill path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathResolution {
    /// Deepest node reached; the last matched ancestor when the path broke off.
    pub node: NodeId,
    /// Number of path segments that matched.
    pub matched: usize,
    /// `true` when every segment matched.
    pub complete: bool,
}

/// View-root state for drill-down navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrillNavigator {
    absolute_root: NodeId,
    active_root: NodeId,
}

impl DrillNavigator {
    #[must_use]
    pub fn new(absolute_root: NodeId) -> Self {
        Self {
            absolute_root,
            active_root: absolute_root,
        }
    }

    #[must_use]
    pub fn absolute_root(&self) -> NodeId {
        self.absolute_root
    }

    #[must_use]
    pub fn active_root(&self) -> NodeId {
        self.active_root
    }

    #[must_use]
    pub fn is_at_top(&self) -> bool {
        self.active_root == self.absolute_root
    }

    /// Drills into the nearest hierarchical node enclosing `node`.
    ///
    /// Returns `true` when the active root changed.
    pub fn push(&mut self, tree: &NodeTree, node: NodeId) -> LayoutResult<bool> {
        let selected = tree.node(node)?;
        let target = if selected.is_hier() {
            node
        } else {
            selected
                .parent()
                .ok_or(LayoutError::NotHierarchical(node.raw()))?
        };
        let changed = target != self.active_root;
        self.active_root = target;
        debug!(active_root = target.raw(), changed, "drill push");
        Ok(changed)
    }

    /// Moves one level up. No-op at the absolute root.
    pub fn pop(&mut self, tree: &NodeTree) -> bool {
        if self.is_at_top() {
            return false;
        }
        match tree.get(self.active_root).and_then(|node| node.parent()) {
            Some(parent) => {
                self.active_root = parent;
                debug!(active_root = parent.raw(), "drill pop");
                true
            }
            None => false,
        }
    }

    /// Returns to the absolute root. Returns `true` when the active root changed.
    pub fn pop_top(&mut self) -> bool {
        let changed = !self.is_at_top();
        self.active_root = self.absolute_root;
        changed
    }

    /// Walks `path` child-by-name from the absolute root.
    ///
    /// An unmatched segment stops the walk at the last matched ancestor; the
    /// returned resolution reports how far the path got.
    #[must_use]
    pub fn resolve_path(&self, tree: &NodeTree, path: &str) -> PathResolution {
        let segments: Vec<&str> = path.split('/').filter(|segment| !segment.is_empty()).collect();
        let mut node = self.absolute_root;
        let mut matched = 0;
        for segment in &segments {
            match tree.find_child(node, segment) {
                Some(child) if tree.get(child).is_some_and(|n| n.is_hier()) => {
                    node = child;
                    matched += 1;
                }
                _ => break,
            }
        }
        let complete = matched == segments.len();
        if !complete {
            warn!(path, matched, "drill path partially resolved");
        }
        PathResolution {
            node,
            matched,
            complete,
        }
    }

    /// Resolves `path` and makes the result the active root.
    pub fn restore_path(&mut self, tree: &NodeTree, path: &str) -> PathResolution {
        let resolution = self.resolve_path(tree, path);
        self.active_root = resolution.node;
        resolution
    }

    /// `/`-delimited path of the active root, suitable for [`Self::restore_path`].
    #[must_use]
    pub fn active_path(&self, tree: &NodeTree) -> String {
        tree.path_of(self.active_root)
    }
}
