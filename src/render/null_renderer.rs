use crate::error::LayoutResult;
use crate::render::{LayoutFrame, Renderer};

/// No-op renderer used by tests and headless usage.
///
/// It still validates frame content so tests catch invalid geometry before a
/// real backend sees it.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub last_node_count: usize,
    pub last_edge_count: usize,
    pub frames_rendered: usize,
}

impl Renderer for NullRenderer {
    fn render(&mut self, frame: &LayoutFrame) -> LayoutResult<()> {
        frame.validate()?;
        self.last_node_count = frame.nodes.len();
        self.last_edge_count = frame.edges.len();
        self.frames_rendered += 1;
        Ok(())
    }
}
