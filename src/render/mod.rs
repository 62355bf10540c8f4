mod frame;
mod null_renderer;

pub use frame::{FlowFrameMetrics, LayoutFrame, PlacedEdge, PlacedNode};
pub use null_renderer::NullRenderer;

use crate::error::LayoutResult;

/// Contract implemented by any rendering backend.
///
/// Backends receive a fully materialized `LayoutFrame`. Frames own their
/// data, so a frame never outlives or dangles into the tree it came from.
pub trait Renderer {
    fn render(&mut self, frame: &LayoutFrame) -> LayoutResult<()>;
}
