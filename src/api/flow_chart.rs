use tracing::{debug, warn};

use crate::core::{ColorPalette, DefaultPalette, Geometry};
use crate::data::{DataErrorLog, FlowRow};
use crate::error::LayoutResult;
use crate::layout::{FlowBuild, FlowGraph, FlowLayoutReport};
use crate::render::{FlowFrameMetrics, LayoutFrame, PlacedEdge, PlacedNode, Renderer};

use super::FlowChartConfig;

/// Flow diagram: named nodes in columns joined by weighted bands.
pub struct FlowChart<R: Renderer> {
    renderer: R,
    config: FlowChartConfig,
    palette: Box<dyn ColorPalette>,
    frame: Option<LayoutFrame>,
    graph: Option<FlowGraph>,
    report: Option<FlowLayoutReport>,
    errors: DataErrorLog,
}

impl<R: Renderer> FlowChart<R> {
    pub fn new(renderer: R, config: FlowChartConfig) -> LayoutResult<Self> {
        config.validate()?;
        Ok(Self {
            renderer,
            config,
            palette: Box::new(DefaultPalette::default()),
            frame: None,
            graph: None,
            report: None,
            errors: DataErrorLog::default(),
        })
    }

    #[must_use]
    pub fn with_palette(mut self, palette: impl ColorPalette + 'static) -> Self {
        self.palette = Box::new(palette);
        self.frame = None;
        self
    }

    #[must_use]
    pub fn config(&self) -> &FlowChartConfig {
        &self.config
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[must_use]
    pub fn graph(&self) -> Option<&FlowGraph> {
        self.graph.as_ref()
    }

    #[must_use]
    pub fn report(&self) -> Option<FlowLayoutReport> {
        self.report
    }

    #[must_use]
    pub fn frame(&self) -> Option<&LayoutFrame> {
        self.frame.as_ref()
    }

    #[must_use]
    pub fn data_errors(&self) -> &DataErrorLog {
        &self.errors
    }

    /// Rebuilds the graph from edge rows and lays it out.
    pub fn set_rows<I>(&mut self, rows: I) -> LayoutResult<()>
    where
        I: IntoIterator<Item = FlowRow>,
    {
        self.frame = None;
        self.report = None;
        self.graph = None;

        let FlowBuild { graph, errors } = FlowGraph::from_rows(rows);
        if !errors.is_empty() {
            warn!(data_errors = errors.len(), "flow rows skipped during rebuild");
        }
        self.errors = errors;
        self.graph = Some(graph);
        self.relayout().map(|_| ())
    }

    /// Node bar under a viewport point.
    #[must_use]
    pub fn hit_test(&self, x: f64, y: f64) -> Option<&PlacedNode> {
        self.frame.as_ref()?.hit_test(x, y)
    }

    pub fn relayout(&mut self) -> LayoutResult<&LayoutFrame> {
        self.frame = None;
        let viewport = self.config.viewport;
        let mut frame = LayoutFrame::new(viewport);

        if let Some(graph) = self.graph.as_mut() {
            let report = graph.layout(
                f64::from(viewport.width),
                f64::from(viewport.height),
                &self.config.flow,
            );
            for id in graph.node_ids() {
                let node = graph.node(id)?;
                frame.nodes.push(PlacedNode {
                    id: id.raw(),
                    name: node.name().to_owned(),
                    path: node.name().to_owned(),
                    depth: node.column(),
                    value: graph.node_value(id),
                    color: self.palette.categorical(node.column()),
                    geometry: Geometry::Point(node.anchor()),
                    is_leaf: node.outgoing().is_empty(),
                    is_filler: false,
                });
            }
            for edge in graph.edges() {
                frame.edges.push(PlacedEdge {
                    source: edge.source().raw(),
                    target: edge.target().raw(),
                    weight: edge.weight(),
                    start: edge.start(),
                    end: edge.end(),
                    thickness: edge.thickness(),
                });
            }
            frame.flow = Some(FlowFrameMetrics {
                node_width: self.config.flow.node_width,
                value_scale: report.value_scale,
            });
            debug!(
                nodes = frame.nodes.len(),
                edges = frame.edges.len(),
                max_depth = report.max_depth,
                "flow relayout"
            );
            self.report = Some(report);
        }

        Ok(self.frame.insert(frame))
    }

    pub fn render(&mut self) -> LayoutResult<()> {
        if self.frame.is_none() {
            self.relayout()?;
        }
        if let Some(frame) = self.frame.as_ref() {
            self.renderer.render(frame)?;
        }
        Ok(())
    }
}
