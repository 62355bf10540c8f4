pub mod color;
pub mod geometry;
pub mod node;
pub mod types;

pub use color::{Color, ColorPalette, DefaultPalette};
pub use geometry::{Circle, Geometry, Point, Rect, Wedge};
pub use node::{Node, NodeId, NodeKind, NodeTree};
pub use types::Viewport;
