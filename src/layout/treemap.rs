use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{Geometry, NodeId, NodeTree, Rect};
use crate::error::{LayoutError, LayoutResult};
use crate::layout::SortPolicy;

/// Label band reserved at the top of every container rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeaderBandConfig {
    #[serde(default = "default_header_enabled")]
    pub enabled: bool,
    #[serde(default = "default_header_height")]
    pub height: f64,
    /// Band is auto-hidden when it would take more than this share of the height.
    #[serde(default = "default_header_max_fraction")]
    pub max_fraction: f64,
    /// Deepest container depth (relative to the active root) that gets a band.
    #[serde(default)]
    pub max_depth: Option<u32>,
}

impl Default for HeaderBandConfig {
    fn default() -> Self {
        Self {
            enabled: default_header_enabled(),
            height: default_header_height(),
            max_fraction: default_header_max_fraction(),
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreemapConfig {
    #[serde(default = "default_margin")]
    pub margin: f64,
    #[serde(default)]
    pub header: HeaderBandConfig,
}

impl Default for TreemapConfig {
    fn default() -> Self {
        Self {
            margin: default_margin(),
            header: HeaderBandConfig::default(),
        }
    }
}

impl TreemapConfig {
    /// Config without header bands or margins.
    #[must_use]
    pub fn flat() -> Self {
        Self {
            margin: 0.0,
            header: HeaderBandConfig {
                enabled: false,
                ..HeaderBandConfig::default()
            },
        }
    }

    pub fn validate(self) -> LayoutResult<()> {
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(LayoutError::InvalidData(
                "treemap margin must be finite and >= 0".to_owned(),
            ));
        }
        if !self.header.height.is_finite() || self.header.height < 0.0 {
            return Err(LayoutError::InvalidData(
                "treemap header height must be finite and >= 0".to_owned(),
            ));
        }
        if !self.header.max_fraction.is_finite() || !(0.0..=1.0).contains(&self.header.max_fraction)
        {
            return Err(LayoutError::InvalidData(
                "treemap header max fraction must be in [0, 1]".to_owned(),
            ));
        }
        Ok(())
    }
}

fn default_header_enabled() -> bool {
    true
}

fn default_header_height() -> f64 {
    16.0
}

fn default_header_max_fraction() -> f64 {
    0.3
}

fn default_margin() -> f64 {
    2.0
}

/// Area left for members once the margin and header band are reserved.
#[must_use]
pub fn content_rect(rect: Rect, depth: u32, config: &TreemapConfig) -> Rect {
    let mut inner = rect.inset(config.margin);
    let header = config.header;
    let depth_allowed = header.max_depth.is_none_or(|max| depth <= max);
    if header.enabled
        && depth_allowed
        && header.height > 0.0
        && header.height <= header.max_fraction * inner.h
    {
        inner.y += header.height;
        inner.h -= header.height;
    }
    inner
}

/// Writes rect geometry for `root` and every placeable descendant.
///
/// Returns the number of nodes that received a rectangle.
pub fn pack_treemap(tree: &mut NodeTree, root: NodeId, bounds: Rect, config: &TreemapConfig) -> usize {
    if tree.get(root).is_none() {
        return 0;
    }
    let mut placed = 0;
    layout_node(tree, root, bounds, 0, config, &mut placed);
    trace!(root = root.raw(), placed, "treemap packed");
    placed
}

fn layout_node(
    tree: &mut NodeTree,
    id: NodeId,
    rect: Rect,
    depth: u32,
    config: &TreemapConfig,
    placed: &mut usize,
) {
    tree.set_geometry(id, Geometry::Rect(rect));
    *placed += 1;

    let mut items: Vec<(NodeId, f64)> = tree
        .members(id)
        .into_iter()
        .map(|member| (member, tree.hier_size(member)))
        .collect();
    if items.is_empty() {
        return;
    }
    SortPolicy::Descending.sort_by_metric(&mut items, |item| item.1);
    let inner = content_rect(rect, depth, config);
    split(tree, &items, inner, depth + 1, config, placed);
}

fn split(
    tree: &mut NodeTree,
    items: &[(NodeId, f64)],
    rect: Rect,
    depth: u32,
    config: &TreemapConfig,
    placed: &mut usize,
) {
    let total: f64 = items.iter().map(|item| item.1).sum();
    if total.is_nan() || total <= 0.0 {
        return;
    }
    if let [(only, _)] = items {
        layout_node(tree, *only, rect, depth, config, placed);
        return;
    }

    let (first, second) = items.split_at(bisect_index(items, total));
    let first_total: f64 = first.iter().map(|item| item.1).sum();
    let fraction = first_total / total;

    let (first_rect, second_rect) = if rect.w >= rect.h {
        let w1 = rect.w * fraction;
        (
            Rect::new(rect.x, rect.y, w1, rect.h),
            Rect::new(rect.x + w1, rect.y, rect.w - w1, rect.h),
        )
    } else {
        let h1 = rect.h * fraction;
        (
            Rect::new(rect.x, rect.y, rect.w, h1),
            Rect::new(rect.x, rect.y + h1, rect.w, rect.h - h1),
        )
    };
    split(tree, first, first_rect, depth, config, placed);
    split(tree, second, second_rect, depth, config, placed);
}

/// Length of the first group: the shortest prefix reaching half the total,
/// keeping at least one item on each side.
fn bisect_index(items: &[(NodeId, f64)], total: f64) -> usize {
    let half = total * 0.5;
    let mut running = 0.0;
    for (index, item) in items.iter().enumerate() {
        running += item.1;
        if running >= half {
            return (index + 1).clamp(1, items.len() - 1);
        }
    }
    items.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_hidden_when_rect_is_too_short() {
        let config = TreemapConfig {
            margin: 0.0,
            header: HeaderBandConfig {
                height: 10.0,
                max_fraction: 0.25,
                ..HeaderBandConfig::default()
            },
        };
        let tall = content_rect(Rect::new(0.0, 0.0, 100.0, 100.0), 0, &config);
        assert_eq!(tall, Rect::new(0.0, 10.0, 100.0, 90.0));
        let short = content_rect(Rect::new(0.0, 0.0, 100.0, 30.0), 0, &config);
        assert_eq!(short, Rect::new(0.0, 0.0, 100.0, 30.0));
    }

    #[test]
    fn header_respects_max_depth() {
        let config = TreemapConfig {
            margin: 1.0,
            header: HeaderBandConfig {
                height: 10.0,
                max_fraction: 0.5,
                max_depth: Some(0),
                ..HeaderBandConfig::default()
            },
        };
        let nested = content_rect(Rect::new(0.0, 0.0, 100.0, 100.0), 1, &config);
        assert_eq!(nested, Rect::new(1.0, 1.0, 98.0, 98.0));
    }
}
