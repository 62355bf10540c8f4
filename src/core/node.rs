use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::color::{Color, ColorPalette};
use crate::core::geometry::Geometry;
use crate::error::{LayoutError, LayoutResult};

/// Stable node handle, unique within one `NodeTree`.
///
/// Ids are handed out by the owning tree in strictly increasing order and are
/// never reused, even after a subtree is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Leaf,
    Hier,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
    name: String,
    size: f64,
    pub color: Option<Color>,
    pub color_bucket: Option<u32>,
    depth: u32,
    filler: bool,
    expanded: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    leaves: Vec<NodeId>,
    geometry: Option<Geometry>,
}

impl Node {
    fn new(id: NodeId, kind: NodeKind, name: String, size: f64, parent: Option<NodeId>) -> Self {
        Self {
            id,
            kind,
            name,
            size,
            color: None,
            color_bucket: None,
            depth: 0,
            filler: false,
            expanded: true,
            parent,
            children: Vec::new(),
            leaves: Vec::new(),
            geometry: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    #[must_use]
    pub fn is_hier(&self) -> bool {
        self.kind == NodeKind::Hier
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directly-assigned size, excluding descendants.
    #[must_use]
    pub fn size(&self) -> f64 {
        self.size
    }

    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[must_use]
    pub fn is_filler(&self) -> bool {
        self.filler
    }

    #[must_use]
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn set_expanded(&mut self, expanded: bool) {
        self.expanded = expanded;
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[must_use]
    pub fn leaves(&self) -> &[NodeId] {
        &self.leaves
    }

    /// `true` when the node owns at least one child or leaf.
    #[must_use]
    pub fn has_members(&self) -> bool {
        !self.children.is_empty() || !self.leaves.is_empty()
    }

    #[must_use]
    pub fn geometry(&self) -> Option<Geometry> {
        self.geometry
    }

    #[must_use]
    pub fn is_placed(&self) -> bool {
        self.geometry.is_some()
    }
}

/// Arena-backed owning tree of hierarchical and leaf nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeTree {
    nodes: Vec<Option<Node>>,
    root: NodeId,
}

impl NodeTree {
    #[must_use]
    pub fn new(root_name: impl Into<String>) -> Self {
        let root = NodeId(0);
        Self {
            nodes: vec![Some(Node::new(
                root,
                NodeKind::Hier,
                root_name.into(),
                0.0,
                None,
            ))],
            root,
        }
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, root included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    /// Live node handle for a raw id, e.g. one read back from a frame.
    #[must_use]
    pub fn id_from_raw(&self, raw: u32) -> Option<NodeId> {
        let id = NodeId(raw);
        self.get(id).map(|_| id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn node(&self, id: NodeId) -> LayoutResult<&Node> {
        self.get(id).ok_or(LayoutError::UnknownNode(id.raw()))
    }

    fn node_mut(&mut self, id: NodeId) -> LayoutResult<&mut Node> {
        self.get_mut(id).ok_or(LayoutError::UnknownNode(id.raw()))
    }

    fn hier_mut(&mut self, id: NodeId) -> LayoutResult<&mut Node> {
        let node = self.node_mut(id)?;
        if !node.is_hier() {
            return Err(LayoutError::NotHierarchical(id.raw()));
        }
        Ok(node)
    }

    fn allocate(&mut self, kind: NodeKind, name: String, size: f64, parent: NodeId) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes
            .push(Some(Node::new(id, kind, name, size, Some(parent))));
        id
    }

    pub fn add_hier_node(&mut self, parent: NodeId, name: impl Into<String>) -> LayoutResult<NodeId> {
        self.hier_mut(parent)?;
        let id = self.allocate(NodeKind::Hier, name.into(), 0.0, parent);
        self.hier_mut(parent)?.children.push(id);
        trace!(parent = parent.raw(), id = id.raw(), "add hier node");
        Ok(id)
    }

    pub fn add_node(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        size: f64,
    ) -> LayoutResult<NodeId> {
        validate_size(size)?;
        self.hier_mut(parent)?;
        let id = self.allocate(NodeKind::Leaf, name.into(), size, parent);
        self.hier_mut(parent)?.leaves.push(id);
        trace!(parent = parent.raw(), id = id.raw(), size, "add leaf node");
        Ok(id)
    }

    /// Detaches `node` from `parent` and drops its whole subtree.
    ///
    /// Returns `Ok(false)` when `node` is not a direct member of `parent`.
    pub fn remove_node(&mut self, parent: NodeId, node: NodeId) -> LayoutResult<bool> {
        let owner = self.hier_mut(parent)?;
        let before = owner.children.len() + owner.leaves.len();
        owner.children.retain(|child| *child != node);
        owner.leaves.retain(|leaf| *leaf != node);
        if owner.children.len() + owner.leaves.len() == before {
            return Ok(false);
        }

        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some(removed) = self.nodes.get_mut(id.index()).and_then(Option::take) {
                stack.extend(removed.children);
                stack.extend(removed.leaves);
            }
        }
        Ok(true)
    }

    pub fn set_own_size(&mut self, id: NodeId, size: f64) -> LayoutResult<()> {
        validate_size(size)?;
        self.node_mut(id)?.size = size;
        Ok(())
    }

    pub fn set_color(&mut self, id: NodeId, color: Option<Color>) -> LayoutResult<()> {
        self.node_mut(id)?.color = color;
        Ok(())
    }

    pub fn set_color_bucket(&mut self, id: NodeId, bucket: Option<u32>) -> LayoutResult<()> {
        self.node_mut(id)?.color_bucket = bucket;
        Ok(())
    }

    /// Turns a leaf into a hierarchical node so it can own members.
    ///
    /// The leaf keeps its id, name and size; its size becomes the node's own size.
    pub fn promote_to_hier(&mut self, id: NodeId) -> LayoutResult<()> {
        let node = self.node_mut(id)?;
        if node.is_hier() {
            return Ok(());
        }
        node.kind = NodeKind::Hier;
        if let Some(parent) = node.parent {
            let owner = self.node_mut(parent)?;
            owner.leaves.retain(|leaf| *leaf != id);
            owner.children.push(id);
        }
        Ok(())
    }

    /// First direct member (child or leaf) of `parent` named `name`.
    #[must_use]
    pub fn find_child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        let owner = self.get(parent)?;
        owner
            .children
            .iter()
            .chain(owner.leaves.iter())
            .copied()
            .find(|id| self.get(*id).is_some_and(|node| node.name == name))
    }

    /// Direct children followed by direct leaves, in insertion order.
    #[must_use]
    pub fn members(&self, id: NodeId) -> Vec<NodeId> {
        self.get(id)
            .map(|node| node.children.iter().chain(node.leaves.iter()).copied().collect())
            .unwrap_or_default()
    }

    /// Aggregate size of a node and every descendant.
    #[must_use]
    pub fn hier_size(&self, id: NodeId) -> f64 {
        let Some(node) = self.get(id) else {
            return 0.0;
        };
        node.size
            + node
                .children
                .iter()
                .chain(node.leaves.iter())
                .map(|member| self.hier_size(*member))
                .sum::<f64>()
    }

    /// Number of visible leaves below `id`; a childless node counts as one.
    #[must_use]
    pub fn leaf_count(&self, id: NodeId) -> usize {
        let Some(node) = self.get(id) else {
            return 0;
        };
        if !node.has_members() {
            return 1;
        }
        node.children
            .iter()
            .chain(node.leaves.iter())
            .map(|member| self.leaf_count(*member))
            .sum()
    }

    /// Number of levels in the subtree rooted at `id`, the node itself included.
    #[must_use]
    pub fn height(&self, id: NodeId) -> u32 {
        let Some(node) = self.get(id) else {
            return 0;
        };
        1 + node
            .children
            .iter()
            .chain(node.leaves.iter())
            .map(|member| self.height(*member))
            .max()
            .unwrap_or(0)
    }

    /// Resolves a display color.
    ///
    /// Explicit color wins, then the categorical bucket, then the equal-weight
    /// blend of the member colors; nodes without any colored descendant fall
    /// back to the palette's single fallback color.
    #[must_use]
    pub fn interpolated_color(&self, id: NodeId, palette: &dyn ColorPalette) -> Color {
        self.resolve_color(id, palette)
            .unwrap_or_else(|| palette.fallback())
    }

    fn resolve_color(&self, id: NodeId, palette: &dyn ColorPalette) -> Option<Color> {
        let node = self.get(id)?;
        if let Some(color) = node.color {
            return Some(color);
        }
        if let Some(bucket) = node.color_bucket {
            return Some(palette.categorical(bucket));
        }
        let blended: Vec<Color> = node
            .children
            .iter()
            .chain(node.leaves.iter())
            .filter_map(|member| self.resolve_color(*member, palette))
            .collect();
        Color::average(&blended)
    }

    /// Moves the own size of every hierarchical node that also has members
    /// into a synthetic filler leaf. Returns the number of fillers created.
    pub fn materialize_fillers(&mut self) -> usize {
        let candidates: Vec<NodeId> = self
            .nodes
            .iter()
            .flatten()
            .filter(|node| node.is_hier() && node.has_members() && !node.filler)
            .map(|node| node.id)
            .collect();

        let mut created = 0;
        for id in candidates {
            let Some(node) = self.get_mut(id) else {
                continue;
            };
            let size = node.size;
            node.size = 0.0;
            if !(size.is_finite() && size > 0.0) {
                continue;
            }
            let name = node.name.clone();
            let color = node.color;
            let bucket = node.color_bucket;
            let filler = self.allocate(NodeKind::Leaf, name, size, id);
            if let Some(slot) = self.get_mut(filler) {
                slot.filler = true;
                slot.color = color;
                slot.color_bucket = bucket;
            }
            if let Some(owner) = self.get_mut(id) {
                owner.leaves.push(filler);
            }
            created += 1;
        }
        created
    }

    /// Recomputes depths relative to `active_root` for its subtree.
    pub fn assign_depths(&mut self, active_root: NodeId) {
        let mut stack = vec![(active_root, 0_u32)];
        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.get_mut(id) else {
                continue;
            };
            node.depth = depth;
            let members: Vec<NodeId> = node.children.iter().chain(node.leaves.iter()).copied().collect();
            stack.extend(members.into_iter().map(|member| (member, depth + 1)));
        }
    }

    /// Preorder walk of the subtree rooted at `id`.
    #[must_use]
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.get(current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.leaves.iter().rev().copied());
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Names from below the absolute root down to `id`, joined with `/`.
    #[must_use]
    pub fn path_of(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(cursor) = current {
            let Some(node) = self.get(cursor) else {
                break;
            };
            if node.parent.is_none() {
                break;
            }
            segments.push(node.name.as_str());
            current = node.parent;
        }
        segments.reverse();
        segments.join("/")
    }

    pub fn clear_geometry(&mut self) {
        for node in self.nodes.iter_mut().flatten() {
            node.geometry = None;
        }
    }

    pub(crate) fn set_geometry(&mut self, id: NodeId, geometry: Geometry) {
        if let Some(node) = self.get_mut(id) {
            node.geometry = Some(geometry);
        }
    }
}

fn validate_size(size: f64) -> LayoutResult<()> {
    if !size.is_finite() || size < 0.0 {
        return Err(LayoutError::InvalidData(format!(
            "node size must be finite and >= 0, got {size}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_increase_and_are_not_reused_after_removal() {
        let mut tree = NodeTree::new("");
        let a = tree.add_hier_node(tree.root(), "a").expect("a");
        let b = tree.add_node(a, "b", 1.0).expect("b");
        assert!(tree.remove_node(tree.root(), a).expect("remove"));
        let c = tree.add_node(tree.root(), "c", 1.0).expect("c");
        assert!(a < b && b < c);
        assert!(tree.get(b).is_none());
    }

    #[test]
    fn promote_moves_leaf_into_children() {
        let mut tree = NodeTree::new("");
        let leaf = tree.add_node(tree.root(), "x", 2.0).expect("leaf");
        tree.promote_to_hier(leaf).expect("promote");
        let root = tree.node(tree.root()).expect("root");
        assert_eq!(root.children(), &[leaf]);
        assert!(root.leaves().is_empty());
        assert_eq!(tree.node(leaf).expect("node").size(), 2.0);
    }
}
