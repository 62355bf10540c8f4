//! Size-proportional layout algorithms.
//!
//! Every tree layout writes geometry into the `NodeTree` it is given and
//! leaves nodes it cannot place (zero total weight, empty sets) without
//! geometry. The flow layout works on its own lightweight graph.

mod circle_pack;
mod drill;
mod flow;
mod ordering;
mod sunburst;
mod treemap;

pub use circle_pack::{
    CirclePackConfig, PackedCircles, enclosing_circle, pack_circles, pack_hierarchy,
    pack_siblings,
};
pub use drill::{DrillNavigator, PathResolution};
pub use flow::{
    FlowAlignment, FlowBuild, FlowConfig, FlowEdge, FlowEdgeId, FlowGraph, FlowLayoutReport,
    FlowNode, FlowNodeId, column_for,
};
pub use ordering::SortPolicy;
pub use sunburst::{SortType, SunburstConfig, pack_sunburst};
pub use treemap::{HeaderBandConfig, TreemapConfig, content_rect, pack_treemap};
