use serde::{Deserialize, Serialize};

use crate::core::{Color, Geometry, Point, Viewport};
use crate::error::{LayoutError, LayoutResult};

/// One placed node, ready for a rendering backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedNode {
    pub id: u32,
    pub name: String,
    /// `/`-delimited path from the absolute root.
    pub path: String,
    pub depth: u32,
    /// Aggregate size (tree layouts) or total flow (flow layout).
    pub value: f64,
    pub color: Color,
    pub geometry: Geometry,
    pub is_leaf: bool,
    pub is_filler: bool,
}

/// One placed flow edge; anchors are band centers at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacedEdge {
    pub source: u32,
    pub target: u32,
    pub weight: f64,
    pub start: Point,
    pub end: Point,
    pub thickness: f64,
}

/// Extra sizing for flow frames: bar height is `value * value_scale`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowFrameMetrics {
    pub node_width: f64,
    pub value_scale: f64,
}

/// Backend-agnostic scene for one layout pass.
///
/// Nodes appear in preorder, so later entries draw on top of their ancestors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutFrame {
    pub viewport: Viewport,
    pub nodes: Vec<PlacedNode>,
    pub edges: Vec<PlacedEdge>,
    pub flow: Option<FlowFrameMetrics>,
}

impl LayoutFrame {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            nodes: Vec::new(),
            edges: Vec::new(),
            flow: None,
        }
    }

    #[must_use]
    pub fn with_node(mut self, node: PlacedNode) -> Self {
        self.nodes.push(node);
        self
    }

    #[must_use]
    pub fn with_edge(mut self, edge: PlacedEdge) -> Self {
        self.edges.push(edge);
        self
    }

    pub fn validate(&self) -> LayoutResult<()> {
        if !self.viewport.is_valid() {
            return Err(LayoutError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }

        for node in &self.nodes {
            node.geometry.validate()?;
            node.color.validate()?;
        }
        for edge in &self.edges {
            Geometry::Point(edge.start).validate()?;
            Geometry::Point(edge.end).validate()?;
            if !edge.thickness.is_finite() || edge.thickness < 0.0 {
                return Err(LayoutError::InvalidData(
                    "edge thickness must be finite and >= 0".to_owned(),
                ));
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    #[must_use]
    pub fn node_by_name(&self, name: &str) -> Option<&PlacedNode> {
        self.nodes.iter().find(|node| node.name == name)
    }

    /// Deepest node whose geometry contains `(x, y)`.
    ///
    /// Sunburst wedges are tested relative to the viewport center.
    #[must_use]
    pub fn hit_test(&self, x: f64, y: f64) -> Option<&PlacedNode> {
        let point = Point::new(x, y);
        let (cx, cy, _) = self.viewport.inscribed_circle();
        let node_width = self.flow.map_or(0.0, |flow| flow.node_width);
        let value_scale = self.flow.map_or(0.0, |flow| flow.value_scale);
        self.nodes
            .iter()
            .filter(|node| match node.geometry {
                Geometry::Circle(circle) => circle.contains(point),
                Geometry::Rect(rect) => rect.contains(point),
                Geometry::Wedge(wedge) => wedge.contains_relative(x - cx, y - cy),
                Geometry::Point(anchor) => {
                    x >= anchor.x
                        && x <= anchor.x + node_width
                        && y >= anchor.y
                        && y <= anchor.y + node.value * value_scale
                }
            })
            .max_by_key(|node| node.depth)
    }
}
