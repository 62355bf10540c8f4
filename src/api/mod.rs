//! Chart-level entry points wiring input, layout and rendering together.

mod config;
mod flow_chart;
mod hier_chart;

pub use config::{CHART_CONFIG_JSON_SCHEMA_V1, FlowChartConfig, HierChartConfig, HierLayoutKind};
pub use flow_chart::FlowChart;
pub use hier_chart::HierChart;
