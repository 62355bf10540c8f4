use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{Geometry, NodeId, NodeTree, Wedge};
use crate::error::{LayoutError, LayoutResult};
use crate::layout::SortPolicy;

/// Metric used to order and weight sunburst siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortType {
    /// Aggregate size; also the angular weight.
    #[default]
    Size,
    /// Number of visible leaves; also the angular weight.
    Count,
    /// Case-insensitive name; ordering only, weight stays the aggregate size.
    ///
    /// `SortPolicy::Ascending` gives A to Z. The legacy default of reverse
    /// lexical order (Z to A) is `SortPolicy::Descending`.
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SunburstConfig {
    /// Inner radius as a share of the largest centered circle.
    #[serde(default = "default_inner_radius_ratio")]
    pub inner_radius_ratio: f64,
    #[serde(default = "default_outer_radius_ratio")]
    pub outer_radius_ratio: f64,
    #[serde(default)]
    pub start_angle_deg: f64,
    #[serde(default)]
    pub sort_type: SortType,
    #[serde(default)]
    pub order: SortPolicy,
    /// Draws the top-level members as separate roots instead of the root disk.
    #[serde(default)]
    pub multi_root: bool,
}

impl Default for SunburstConfig {
    fn default() -> Self {
        Self {
            inner_radius_ratio: default_inner_radius_ratio(),
            outer_radius_ratio: default_outer_radius_ratio(),
            start_angle_deg: 0.0,
            sort_type: SortType::Size,
            order: SortPolicy::Insertion,
            multi_root: false,
        }
    }
}

impl SunburstConfig {
    pub fn validate(self) -> LayoutResult<()> {
        let inner = self.inner_radius_ratio;
        let outer = self.outer_radius_ratio;
        if !inner.is_finite() || !outer.is_finite() || inner < 0.0 || outer <= inner {
            return Err(LayoutError::InvalidData(
                "sunburst radius ratios must be finite with 0 <= inner < outer".to_owned(),
            ));
        }
        if !self.start_angle_deg.is_finite() {
            return Err(LayoutError::InvalidData(
                "sunburst start angle must be finite".to_owned(),
            ));
        }
        Ok(())
    }
}

fn default_inner_radius_ratio() -> f64 {
    0.1
}

fn default_outer_radius_ratio() -> f64 {
    1.0
}

struct Rings<'a> {
    inner: f64,
    band_width: f64,
    config: &'a SunburstConfig,
}

impl Rings<'_> {
    fn wedge(&self, band: u32, start: f64, delta: f64) -> Wedge {
        let band = f64::from(band);
        Wedge::new(
            self.inner + band * self.band_width,
            self.inner + (band + 1.0) * self.band_width,
            start,
            delta,
        )
    }
}

/// Writes wedge geometry for the subtree under `root` inside the
/// `[inner_radius, outer_radius]` ring. Returns the number of placed nodes.
pub fn pack_sunburst(
    tree: &mut NodeTree,
    root: NodeId,
    inner_radius: f64,
    outer_radius: f64,
    config: &SunburstConfig,
) -> usize {
    let Some(root_node) = tree.get(root) else {
        return 0;
    };
    let members = tree.members(root);
    let full_turn = 360.0;
    let start = config.start_angle_deg;
    let mut placed = 0;

    if config.multi_root && !members.is_empty() {
        let levels = tree.height(root).saturating_sub(1).max(1);
        let rings = Rings {
            inner: inner_radius,
            band_width: (outer_radius - inner_radius) / f64::from(levels),
            config,
        };
        partition(tree, members, start, full_turn, 0, &rings, &mut placed);
    } else {
        // An unnamed root with a single member would only draw an empty disk.
        let top = match members.as_slice() {
            [only] if root_node.name().is_empty() => *only,
            _ => root,
        };
        let levels = tree.height(top).max(1);
        let rings = Rings {
            inner: inner_radius,
            band_width: (outer_radius - inner_radius) / f64::from(levels),
            config,
        };
        place_node(tree, top, start, full_turn, 0, &rings, &mut placed);
    }

    trace!(root = root.raw(), placed, "sunburst packed");
    placed
}

fn place_node(
    tree: &mut NodeTree,
    id: NodeId,
    start: f64,
    delta: f64,
    band: u32,
    rings: &Rings<'_>,
    placed: &mut usize,
) {
    tree.set_geometry(id, Geometry::Wedge(rings.wedge(band, start, delta)));
    *placed += 1;
    let members = tree.members(id);
    if !members.is_empty() {
        partition(tree, members, start, delta, band + 1, rings, placed);
    }
}

fn partition(
    tree: &mut NodeTree,
    members: Vec<NodeId>,
    start: f64,
    delta: f64,
    band: u32,
    rings: &Rings<'_>,
    placed: &mut usize,
) {
    let config = rings.config;
    let mut items: Vec<(NodeId, f64)> = members
        .into_iter()
        .map(|member| {
            let weight = match config.sort_type {
                SortType::Size | SortType::Name => tree.hier_size(member),
                SortType::Count => tree.leaf_count(member) as f64,
            };
            (member, weight)
        })
        .collect();

    match config.sort_type {
        SortType::Name => config.order.sort_by_name(&mut items, |item| {
            tree.get(item.0)
                .map(|node| node.name().to_owned())
                .unwrap_or_default()
        }),
        SortType::Size | SortType::Count => config.order.sort_by_metric(&mut items, |item| item.1),
    }

    let total: f64 = items.iter().map(|item| item.1).sum();
    if total.is_nan() || total <= 0.0 {
        return;
    }

    let mut angle = start;
    for (member, weight) in items {
        let span = delta * weight / total;
        place_node(tree, member, angle, span, band, rings, placed);
        angle += span;
    }
}
