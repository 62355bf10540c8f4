//! hierchart-rs: hierarchical, size-proportional chart layout engine.
//!
//! Turns trees (or small flow graphs) of named, sized entities into
//! geometry: nested circles, nested rectangles, angular wedges, or
//! column-positioned flow nodes. Drawing is left to a `render::Renderer`.

pub mod api;
pub mod core;
pub mod data;
pub mod error;
pub mod layout;
pub mod render;
pub mod telemetry;

pub use api::{FlowChart, FlowChartConfig, HierChart, HierChartConfig, HierLayoutKind};
pub use error::{LayoutError, LayoutResult};
