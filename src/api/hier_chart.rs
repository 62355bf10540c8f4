use tracing::{debug, warn};

use crate::core::{ColorPalette, DefaultPalette, Geometry, NodeId, NodeTree, Point, Viewport};
use crate::data::{DataErrorLog, HierEvent, HierRow, TreeBuild, build_tree, build_tree_from_events};
use crate::error::LayoutResult;
use crate::layout::{DrillNavigator, SortPolicy, pack_hierarchy, pack_sunburst, pack_treemap};
use crate::render::{LayoutFrame, PlacedNode, Renderer};

use super::{HierChartConfig, HierLayoutKind};

/// Bubble, hierarchical bubble, tree-map and sunburst plot over one node tree.
///
/// The tree is rebuilt from scratch on every data change and re-laid out on
/// every structural or view change.
pub struct HierChart<R: Renderer> {
    renderer: R,
    config: HierChartConfig,
    palette: Box<dyn ColorPalette>,
    sort_reverse: bool,
    // Field order matters: the frame is dropped before the tree.
    frame: Option<LayoutFrame>,
    navigator: Option<DrillNavigator>,
    tree: Option<NodeTree>,
    errors: DataErrorLog,
}

impl<R: Renderer> HierChart<R> {
    pub fn new(renderer: R, config: HierChartConfig) -> LayoutResult<Self> {
        config.validate()?;
        let sort_reverse = config.circle.order == SortPolicy::Descending;
        Ok(Self {
            renderer,
            config,
            palette: Box::new(DefaultPalette::default()),
            sort_reverse,
            frame: None,
            navigator: None,
            tree: None,
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
    pub fn config(&self) -> &HierChartConfig {
        &self.config
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[must_use]
    pub fn tree(&self) -> Option<&NodeTree> {
        self.tree.as_ref()
    }

    #[must_use]
    pub fn navigator(&self) -> Option<&DrillNavigator> {
        self.navigator.as_ref()
    }

    #[must_use]
    pub fn frame(&self) -> Option<&LayoutFrame> {
        self.frame.as_ref()
    }

    #[must_use]
    pub fn data_errors(&self) -> &DataErrorLog {
        &self.errors
    }

    /// Rebuilds the tree from path rows and lays it out.
    pub fn set_rows<I>(&mut self, rows: I) -> LayoutResult<()>
    where
        I: IntoIterator<Item = HierRow>,
    {
        self.install(build_tree(rows))
    }

    /// Rebuilds the tree from an enter/exit event stream and lays it out.
    pub fn set_events<I>(&mut self, events: I) -> LayoutResult<()>
    where
        I: IntoIterator<Item = HierEvent>,
    {
        self.install(build_tree_from_events(events))
    }

    fn install(&mut self, build: TreeBuild) -> LayoutResult<()> {
        // Visual objects go before the tree they were derived from.
        self.frame = None;
        self.navigator = None;
        self.tree = None;

        let TreeBuild { tree, errors } = build;
        let mut navigator = DrillNavigator::new(tree.root());
        if let Some(path) = self.config.drill_path.as_deref() {
            navigator.restore_path(&tree, path);
        }
        if !errors.is_empty() {
            warn!(data_errors = errors.len(), "rows skipped during rebuild");
        }
        self.errors = errors;
        self.navigator = Some(navigator);
        self.tree = Some(tree);
        self.relayout().map(|_| ())
    }

    pub fn set_kind(&mut self, kind: HierLayoutKind) -> LayoutResult<()> {
        self.config.kind = kind;
        self.relayout().map(|_| ())
    }

    pub fn set_viewport(&mut self, viewport: Viewport) -> LayoutResult<()> {
        let mut config = self.config.clone();
        config.viewport = viewport;
        config.validate()?;
        self.config = config;
        self.relayout().map(|_| ())
    }

    /// "Sorted" toggle for circle packing and sunburst ordering.
    pub fn set_sorted(&mut self, sorted: bool) -> LayoutResult<()> {
        self.apply_order(SortPolicy::from_toggles(sorted, self.sort_reverse))
    }

    /// "Sort-reverse" toggle; only takes effect while sorting is on.
    pub fn set_sort_reverse(&mut self, reverse: bool) -> LayoutResult<()> {
        self.sort_reverse = reverse;
        let sorted = self.config.circle.order.is_sorted();
        self.apply_order(SortPolicy::from_toggles(sorted, reverse))
    }

    fn apply_order(&mut self, order: SortPolicy) -> LayoutResult<()> {
        self.config.circle.order = order;
        self.config.sunburst.order = order;
        self.relayout().map(|_| ())
    }

    /// Drills into `node` (or its parent when `node` is a leaf).
    pub fn push(&mut self, node: NodeId) -> LayoutResult<bool> {
        let (Some(tree), Some(navigator)) = (self.tree.as_ref(), self.navigator.as_mut()) else {
            return Ok(false);
        };
        let changed = navigator.push(tree, node)?;
        self.sync_drill_path();
        if changed {
            self.relayout()?;
        }
        Ok(changed)
    }

    /// Drills into the node under a viewport point.
    pub fn push_at(&mut self, x: f64, y: f64) -> LayoutResult<bool> {
        let Some(raw) = self.hit_test(x, y).map(|hit| hit.id) else {
            return Ok(false);
        };
        match self.tree.as_ref().and_then(|tree| tree.id_from_raw(raw)) {
            Some(node) => self.push(node),
            None => Ok(false),
        }
    }

    pub fn pop(&mut self) -> LayoutResult<bool> {
        let (Some(tree), Some(navigator)) = (self.tree.as_ref(), self.navigator.as_mut()) else {
            return Ok(false);
        };
        let changed = navigator.pop(tree);
        self.sync_drill_path();
        if changed {
            self.relayout()?;
        }
        Ok(changed)
    }

    pub fn pop_top(&mut self) -> LayoutResult<bool> {
        let Some(navigator) = self.navigator.as_mut() else {
            return Ok(false);
        };
        let changed = navigator.pop_top();
        self.sync_drill_path();
        if changed {
            self.relayout()?;
        }
        Ok(changed)
    }

    fn sync_drill_path(&mut self) {
        if let (Some(tree), Some(navigator)) = (self.tree.as_ref(), self.navigator.as_ref()) {
            let path = navigator.active_path(tree);
            self.config.drill_path = if path.is_empty() { None } else { Some(path) };
        }
    }

    /// Deepest placed node under a viewport point.
    #[must_use]
    pub fn hit_test(&self, x: f64, y: f64) -> Option<&PlacedNode> {
        self.frame.as_ref()?.hit_test(x, y)
    }

    /// Recomputes all geometry for the active root and rebuilds the frame.
    pub fn relayout(&mut self) -> LayoutResult<&LayoutFrame> {
        self.frame = None;
        let viewport = self.config.viewport;
        let mut frame = LayoutFrame::new(viewport);

        if let (Some(tree), Some(navigator)) = (self.tree.as_mut(), self.navigator.as_ref()) {
            let active = navigator.active_root();
            tree.clear_geometry();
            tree.assign_depths(active);

            let (cx, cy, radius) = viewport.inscribed_circle();
            let center = Point::new(cx, cy);
            match self.config.kind {
                HierLayoutKind::Bubble => {
                    pack_hierarchy(tree, active, &self.config.circle);
                }
                HierLayoutKind::Treemap => {
                    pack_treemap(tree, active, viewport.bounds(), &self.config.treemap);
                }
                HierLayoutKind::Sunburst => {
                    let sunburst = &self.config.sunburst;
                    pack_sunburst(
                        tree,
                        active,
                        radius * sunburst.inner_radius_ratio,
                        radius * sunburst.outer_radius_ratio,
                        sunburst,
                    );
                }
            }

            for id in tree.subtree(active) {
                let Some(node) = tree.get(id) else {
                    continue;
                };
                let Some(geometry) = node.geometry() else {
                    continue;
                };
                let geometry = match geometry {
                    Geometry::Circle(circle) => {
                        Geometry::Circle(circle.transformed(Point::default(), radius, center))
                    }
                    other => other,
                };
                frame.nodes.push(PlacedNode {
                    id: id.raw(),
                    name: node.name().to_owned(),
                    path: tree.path_of(id),
                    depth: node.depth(),
                    value: tree.hier_size(id),
                    color: tree.interpolated_color(id, self.palette.as_ref()),
                    geometry,
                    is_leaf: !node.has_members(),
                    is_filler: node.is_filler(),
                });
            }
            debug!(
                kind = ?self.config.kind,
                active_root = active.raw(),
                placed = frame.nodes.len(),
                "hierarchical relayout"
            );
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
