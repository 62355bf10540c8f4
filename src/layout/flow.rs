use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::core::Point;
use crate::data::{DataErrorKind, DataErrorLog, FlowRow};
use crate::error::{LayoutError, LayoutResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlowNodeId(u32);

impl FlowNodeId {
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlowEdgeId(u32);

impl FlowEdgeId {
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Column assignment policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowAlignment {
    /// Column = distance from the sources.
    Src,
    /// Column = `max_depth` minus distance from the sinks.
    Dest,
    /// Column interpolated between both distances; sinks land on the last column.
    #[default]
    Justify,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowConfig {
    #[serde(default)]
    pub alignment: FlowAlignment,
    #[serde(default = "default_node_width")]
    pub node_width: f64,
    /// Minimum vertical gap between stacked nodes of one column.
    #[serde(default = "default_node_gap")]
    pub node_gap: f64,
    #[serde(default = "default_passes")]
    pub passes: u32,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            alignment: FlowAlignment::Justify,
            node_width: default_node_width(),
            node_gap: default_node_gap(),
            passes: default_passes(),
        }
    }
}

impl FlowConfig {
    pub fn validate(self) -> LayoutResult<()> {
        if !self.node_width.is_finite() || self.node_width < 0.0 {
            return Err(LayoutError::InvalidData(
                "flow node width must be finite and >= 0".to_owned(),
            ));
        }
        if !self.node_gap.is_finite() || self.node_gap < 0.0 {
            return Err(LayoutError::InvalidData(
                "flow node gap must be finite and >= 0".to_owned(),
            ));
        }
        Ok(())
    }
}

fn default_node_width() -> f64 {
    12.0
}

fn default_node_gap() -> f64 {
    8.0
}

fn default_passes() -> u32 {
    25
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowNode {
    name: String,
    src_depth: Option<u32>,
    dest_depth: Option<u32>,
    column: u32,
    incoming: Vec<FlowEdgeId>,
    outgoing: Vec<FlowEdgeId>,
    x: f64,
    y: f64,
    height: f64,
}

impl FlowNode {
    fn new(name: String) -> Self {
        Self {
            name,
            src_depth: None,
            dest_depth: None,
            column: 0,
            incoming: Vec::new(),
            outgoing: Vec::new(),
            x: 0.0,
            y: 0.0,
            height: 0.0,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Longest distance from a source; `None` until depths are computed.
    #[must_use]
    pub fn src_depth(&self) -> Option<u32> {
        self.src_depth
    }

    /// Longest distance to a sink; `None` until depths are computed.
    #[must_use]
    pub fn dest_depth(&self) -> Option<u32> {
        self.dest_depth
    }

    #[must_use]
    pub fn column(&self) -> u32 {
        self.column
    }

    #[must_use]
    pub fn incoming(&self) -> &[FlowEdgeId] {
        &self.incoming
    }

    #[must_use]
    pub fn outgoing(&self) -> &[FlowEdgeId] {
        &self.outgoing
    }

    /// Top-left anchor of the node bar.
    #[must_use]
    pub fn anchor(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    #[must_use]
    pub fn center_y(&self) -> f64 {
        self.y + self.height * 0.5
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowEdge {
    source: FlowNodeId,
    target: FlowNodeId,
    weight: f64,
    thickness: f64,
    start: Point,
    end: Point,
}

impl FlowEdge {
    #[must_use]
    pub fn source(&self) -> FlowNodeId {
        self.source
    }

    #[must_use]
    pub fn target(&self) -> FlowNodeId {
        self.target
    }

    #[must_use]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    #[must_use]
    pub fn thickness(&self) -> f64 {
        self.thickness
    }

    /// Center of the edge band where it leaves the source node.
    #[must_use]
    pub fn start(&self) -> Point {
        self.start
    }

    /// Center of the edge band where it enters the target node.
    #[must_use]
    pub fn end(&self) -> Point {
        self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowLayoutReport {
    pub max_depth: u32,
    pub column_count: u32,
    /// Depth search revisited a node still on its own path; depths may be shallower than true.
    pub cycle_detected: bool,
    /// Pixels per unit of flow.
    pub value_scale: f64,
}

/// Result of building a flow graph from rows.
#[derive(Debug, Clone)]
pub struct FlowBuild {
    pub graph: FlowGraph,
    pub errors: DataErrorLog,
}

/// Small directed flow graph with named nodes and weighted edges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowGraph {
    nodes: Vec<FlowNode>,
    edges: Vec<FlowEdge>,
    index: IndexMap<String, FlowNodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Upstream,
    Downstream,
}

struct DepthSearch {
    direction: Direction,
    memo: Vec<Option<u32>>,
    best: Vec<u32>,
    on_path: Vec<bool>,
    cycle: bool,
}

impl FlowGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from edge rows; invalid rows are skipped and logged.
    pub fn from_rows<I>(rows: I) -> FlowBuild
    where
        I: IntoIterator<Item = FlowRow>,
    {
        let mut graph = Self::new();
        let mut errors = DataErrorLog::default();
        for (index, row) in rows.into_iter().enumerate() {
            let source = row.source.trim();
            let target = row.target.trim();
            if source.is_empty() || target.is_empty() {
                errors.record(index, DataErrorKind::EmptyName);
                continue;
            }
            if source == target {
                errors.record(index, DataErrorKind::SelfLoop(source.to_owned()));
                continue;
            }
            let weight = match row.weight.to_size() {
                Ok(weight) => weight,
                Err(kind) => {
                    warn!(index, error = %kind, "skipping flow row");
                    errors.record(index, kind);
                    continue;
                }
            };
            let source = graph.add_node(source);
            let target = graph.add_node(target);
            if let Err(err) = graph.add_edge(source, target, weight) {
                warn!(index, error = %err, "skipping flow row after graph error");
            }
        }
        debug!(
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            data_errors = errors.len(),
            "built flow graph"
        );
        FlowBuild { graph, errors }
    }

    /// Returns the node named `name`, creating it on first sight.
    pub fn add_node(&mut self, name: &str) -> FlowNodeId {
        if let Some(id) = self.index.get(name) {
            return *id;
        }
        let id = FlowNodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(FlowNode::new(name.to_owned()));
        self.index.insert(name.to_owned(), id);
        id
    }

    /// Adds a weighted edge; repeated `(source, target)` pairs accumulate weight.
    pub fn add_edge(
        &mut self,
        source: FlowNodeId,
        target: FlowNodeId,
        weight: f64,
    ) -> LayoutResult<FlowEdgeId> {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(LayoutError::InvalidData(format!(
                "flow weight must be finite and > 0, got {weight}"
            )));
        }
        for id in [source, target] {
            if id.index() >= self.nodes.len() {
                return Err(LayoutError::UnknownFlowNode(format!("#{}", id.raw())));
            }
        }

        let existing = self.nodes[source.index()]
            .outgoing
            .iter()
            .copied()
            .find(|edge| self.edges[edge.index()].target == target);
        if let Some(edge) = existing {
            self.edges[edge.index()].weight += weight;
            return Ok(edge);
        }

        let id = FlowEdgeId(u32::try_from(self.edges.len()).unwrap_or(u32::MAX));
        self.edges.push(FlowEdge {
            source,
            target,
            weight,
            thickness: 0.0,
            start: Point::default(),
            end: Point::default(),
        });
        self.nodes[source.index()].outgoing.push(id);
        self.nodes[target.index()].incoming.push(id);
        self.reset_depths();
        Ok(id)
    }

    pub fn add_edge_by_name(
        &mut self,
        source: &str,
        target: &str,
        weight: f64,
    ) -> LayoutResult<FlowEdgeId> {
        let source = self.add_node(source);
        let target = self.add_node(target);
        self.add_edge(source, target, weight)
    }

    #[must_use]
    pub fn node_id(&self, name: &str) -> Option<FlowNodeId> {
        self.index.get(name).copied()
    }

    pub fn node(&self, id: FlowNodeId) -> LayoutResult<&FlowNode> {
        self.nodes
            .get(id.index())
            .ok_or_else(|| LayoutError::UnknownFlowNode(format!("#{}", id.raw())))
    }

    pub fn node_by_name(&self, name: &str) -> LayoutResult<&FlowNode> {
        let id = self
            .node_id(name)
            .ok_or_else(|| LayoutError::UnknownFlowNode(name.to_owned()))?;
        self.node(id)
    }

    #[must_use]
    pub fn nodes(&self) -> &[FlowNode] {
        &self.nodes
    }

    #[must_use]
    pub fn edges(&self) -> &[FlowEdge] {
        &self.edges
    }

    #[must_use]
    pub fn edge(&self, id: FlowEdgeId) -> Option<&FlowEdge> {
        self.edges.get(id.index())
    }

    /// Node ids in discovery order.
    pub fn node_ids(&self) -> impl Iterator<Item = FlowNodeId> + '_ {
        self.index.values().copied()
    }

    /// Total flow through a node: `max(inflow, outflow)`.
    #[must_use]
    pub fn node_value(&self, id: FlowNodeId) -> f64 {
        let Some(node) = self.nodes.get(id.index()) else {
            return 0.0;
        };
        let inflow: f64 = node.incoming.iter().map(|e| self.edges[e.index()].weight).sum();
        let outflow: f64 = node.outgoing.iter().map(|e| self.edges[e.index()].weight).sum();
        inflow.max(outflow)
    }

    fn reset_depths(&mut self) {
        for node in &mut self.nodes {
            node.src_depth = None;
            node.dest_depth = None;
        }
    }

    /// Computes source and sink depths for every node.
    ///
    /// Returns `(max_depth, cycle_detected)`. A node revisited while still on
    /// the current search path contributes its best depth so far instead of
    /// recursing, so cyclic input terminates with truncated depths.
    pub fn compute_depths(&mut self) -> (u32, bool) {
        let mut upstream = DepthSearch::new(Direction::Upstream, self.nodes.len());
        let mut downstream = DepthSearch::new(Direction::Downstream, self.nodes.len());
        for index in 0..self.nodes.len() {
            let src = upstream.depth(self, index);
            let dest = downstream.depth(self, index);
            self.nodes[index].src_depth = Some(src);
            self.nodes[index].dest_depth = Some(dest);
        }
        let max_depth = self
            .nodes
            .iter()
            .filter_map(|node| node.src_depth)
            .max()
            .unwrap_or(0);
        let cycle = upstream.cycle || downstream.cycle;
        if cycle {
            warn!(max_depth, "flow graph contains a cycle, depths truncated");
        }
        (max_depth, cycle)
    }

    /// Runs the full layout inside a `width` x `height` box.
    pub fn layout(&mut self, width: f64, height: f64, config: &FlowConfig) -> FlowLayoutReport {
        let (max_depth, cycle_detected) = self.compute_depths();
        for node in &mut self.nodes {
            node.column = column_for(
                node.src_depth.unwrap_or(0),
                node.dest_depth.unwrap_or(0),
                max_depth,
                config.alignment,
            );
        }

        let mut columns: Vec<Vec<usize>> = vec![Vec::new(); max_depth as usize + 1];
        for id in self.index.values() {
            columns[self.nodes[id.index()].column as usize].push(id.index());
        }

        let value_scale = self.value_scale(&columns, height, config.node_gap);
        self.initial_placement(&columns, width, value_scale, max_depth, config);

        for pass in 0..config.passes {
            if pass % 2 == 0 {
                for column in 1..columns.len() {
                    self.relax_column(&columns[column]);
                    self.resolve_overlaps(&mut columns[column], height, config.node_gap);
                }
            } else {
                for column in (0..columns.len().saturating_sub(1)).rev() {
                    self.relax_column(&columns[column]);
                    self.resolve_overlaps(&mut columns[column], height, config.node_gap);
                }
            }
        }
        trace!(passes = config.passes, "flow relaxation finished");

        self.reorder_edges();
        self.place_edges(value_scale, config.node_width);

        let report = FlowLayoutReport {
            max_depth,
            column_count: max_depth + 1,
            cycle_detected,
            value_scale,
        };
        debug!(
            max_depth,
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            cycle_detected,
            "flow layout finished"
        );
        report
    }

    fn value_scale(&self, columns: &[Vec<usize>], height: f64, gap: f64) -> f64 {
        columns
            .iter()
            .filter_map(|column| {
                let total: f64 = column
                    .iter()
                    .map(|index| self.node_value(FlowNodeId(*index as u32)))
                    .sum();
                if total <= 0.0 {
                    return None;
                }
                let gaps = gap * column.len().saturating_sub(1) as f64;
                Some(((height - gaps) / total).max(0.0))
            })
            .min_by_key(|scale| OrderedFloat(*scale))
            .unwrap_or(0.0)
    }

    fn initial_placement(
        &mut self,
        columns: &[Vec<usize>],
        width: f64,
        value_scale: f64,
        max_depth: u32,
        config: &FlowConfig,
    ) {
        let step = if max_depth > 0 {
            (width - config.node_width).max(0.0) / f64::from(max_depth)
        } else {
            0.0
        };
        for (column_index, column) in columns.iter().enumerate() {
            let mut cursor = 0.0;
            for index in column {
                let value = self.node_value(FlowNodeId(*index as u32));
                let node = &mut self.nodes[*index];
                node.x = step * column_index as f64;
                node.y = cursor;
                node.height = value * value_scale;
                cursor += node.height + config.node_gap;
            }
        }
    }

    /// Moves every connected node in `column` to the weighted mean center of
    /// its neighbors; heavier edges pull harder.
    fn relax_column(&mut self, column: &[usize]) {
        for index in column {
            let node = &self.nodes[*index];
            let mut weighted = 0.0;
            let mut total = 0.0;
            for edge in node.incoming.iter().chain(node.outgoing.iter()) {
                let edge = &self.edges[edge.index()];
                let neighbor = if edge.target.index() == *index {
                    edge.source
                } else {
                    edge.target
                };
                weighted += self.nodes[neighbor.index()].center_y() * edge.weight;
                total += edge.weight;
            }
            if total <= 0.0 {
                continue;
            }
            let node = &mut self.nodes[*index];
            node.y = weighted / total - node.height * 0.5;
        }
    }

    /// Sorts the column top to bottom, pushes overlapping nodes down and
    /// shifts the column back inside `[0, height]` when it overflows.
    fn resolve_overlaps(&mut self, column: &mut [usize], height: f64, gap: f64) {
        if column.is_empty() {
            return;
        }
        column.sort_by_key(|index| OrderedFloat(self.nodes[*index].y));
        self.push_down(column, gap);

        let last = &self.nodes[column[column.len() - 1]];
        let overflow = last.y + last.height - height;
        if overflow > 0.0 {
            for index in column.iter() {
                self.nodes[*index].y -= overflow;
            }
            if self.nodes[column[0]].y < 0.0 {
                self.push_down(column, gap);
            }
        }
    }

    fn push_down(&mut self, column: &[usize], gap: f64) {
        let mut cursor = 0.0;
        for index in column {
            let node = &mut self.nodes[*index];
            if node.y < cursor {
                node.y = cursor;
            }
            cursor = node.y + node.height + gap;
        }
    }

    fn reorder_edges(&mut self) {
        for index in 0..self.nodes.len() {
            let mut outgoing = std::mem::take(&mut self.nodes[index].outgoing);
            outgoing.sort_by_key(|edge| {
                OrderedFloat(self.nodes[self.edges[edge.index()].target.index()].center_y())
            });
            let mut incoming = std::mem::take(&mut self.nodes[index].incoming);
            incoming.sort_by_key(|edge| {
                OrderedFloat(self.nodes[self.edges[edge.index()].source.index()].center_y())
            });
            self.nodes[index].outgoing = outgoing;
            self.nodes[index].incoming = incoming;
        }
    }

    fn place_edges(&mut self, value_scale: f64, node_width: f64) {
        for edge in &mut self.edges {
            edge.thickness = edge.weight * value_scale;
        }
        for node in &self.nodes {
            let mut offset = 0.0;
            for id in &node.outgoing {
                let edge = &mut self.edges[id.index()];
                edge.start = Point::new(node.x + node_width, node.y + offset + edge.thickness * 0.5);
                offset += edge.thickness;
            }
            let mut offset = 0.0;
            for id in &node.incoming {
                let edge = &mut self.edges[id.index()];
                edge.end = Point::new(node.x, node.y + offset + edge.thickness * 0.5);
                offset += edge.thickness;
            }
        }
    }
}

impl DepthSearch {
    fn new(direction: Direction, len: usize) -> Self {
        Self {
            direction,
            memo: vec![None; len],
            best: vec![0; len],
            on_path: vec![false; len],
            cycle: false,
        }
    }

    fn depth(&mut self, graph: &FlowGraph, index: usize) -> u32 {
        if let Some(depth) = self.memo[index] {
            return depth;
        }
        if self.on_path[index] {
            self.cycle = true;
            return self.best[index];
        }
        self.on_path[index] = true;
        let node = &graph.nodes[index];
        let neighbors: Vec<usize> = match self.direction {
            Direction::Upstream => node
                .incoming
                .iter()
                .map(|edge| graph.edges[edge.index()].source.index())
                .collect(),
            Direction::Downstream => node
                .outgoing
                .iter()
                .map(|edge| graph.edges[edge.index()].target.index())
                .collect(),
        };
        for neighbor in neighbors {
            let candidate = self.depth(graph, neighbor) + 1;
            self.best[index] = self.best[index].max(candidate);
        }
        self.on_path[index] = false;
        self.memo[index] = Some(self.best[index]);
        self.best[index]
    }
}

/// Column index for a node; sources (including isolated nodes) always sit in column 0.
#[must_use]
pub fn column_for(src_depth: u32, dest_depth: u32, max_depth: u32, alignment: FlowAlignment) -> u32 {
    if src_depth == 0 {
        return 0;
    }
    let column = match alignment {
        FlowAlignment::Src => src_depth,
        FlowAlignment::Dest => max_depth.saturating_sub(dest_depth),
        FlowAlignment::Justify => {
            if dest_depth == 0 {
                max_depth
            } else {
                let ratio = f64::from(src_depth) / f64::from(src_depth + dest_depth);
                (f64::from(max_depth) * ratio).round() as u32
            }
        }
    };
    column.min(max_depth)
}
