use hierchart_rs::core::{Circle, Geometry, NodeId, NodeTree, Rect};
use hierchart_rs::layout::{
    CirclePackConfig, SunburstConfig, TreemapConfig, pack_circles, pack_hierarchy, pack_sunburst,
    pack_treemap,
};
use proptest::prelude::*;

fn circle_of(tree: &NodeTree, id: NodeId) -> Circle {
    match tree.node(id).expect("node").geometry() {
        Some(Geometry::Circle(circle)) => circle,
        other => panic!("expected circle geometry, got {other:?}"),
    }
}

proptest! {
    #[test]
    fn packed_circles_never_overlap_and_stay_enclosed(
        radii in prop::collection::vec(0.1f64..10.0, 1..30)
    ) {
        let packed = pack_circles(&radii);
        let circles = &packed.circles;
        prop_assert_eq!(circles.len(), radii.len());

        for (i, a) in circles.iter().enumerate() {
            prop_assert!((a.r - radii[i]).abs() <= 1e-12);
            for b in &circles[i + 1..] {
                let gap = a.center().distance(b.center()) - (a.r + b.r);
                prop_assert!(gap >= -1e-5, "overlap of {gap}");
            }
            let reach = a.center().distance(packed.enclosing.center()) + a.r;
            prop_assert!(reach <= packed.enclosing.r * (1.0 + 1e-9) + 1e-6);
        }

        let total_area: f64 = circles.iter().map(|c| c.area()).sum();
        prop_assert!(packed.enclosing.area() >= total_area * (1.0 - 1e-9));
    }

    #[test]
    fn packed_circles_never_overlap_at_any_magnitude(
        radii in prop::collection::vec(1.0f64..12.0, 2..25),
        exponent in -13i32..3
    ) {
        let magnitude = 10f64.powi(exponent);
        let radii: Vec<f64> = radii.iter().map(|r| r * magnitude).collect();
        let packed = pack_circles(&radii);
        let max_r = radii.iter().copied().fold(0.0, f64::max);

        for (i, a) in packed.circles.iter().enumerate() {
            for b in &packed.circles[i + 1..] {
                let gap = (a.center().distance(b.center()) - (a.r + b.r)) / max_r;
                prop_assert!(gap >= -1e-6, "relative overlap of {gap} at 1e{exponent}");
            }
            let reach = (a.center().distance(packed.enclosing.center()) + a.r) / packed.enclosing.r;
            prop_assert!(reach <= 1.0 + 1e-6);
        }
    }

    #[test]
    fn nested_circles_stay_inside_their_parent(
        groups in prop::collection::vec(prop::collection::vec(0.5f64..50.0, 1..8), 1..6),
        exponent in -13i32..3
    ) {
        let magnitude = 10f64.powi(exponent);
        let mut tree = NodeTree::new("root");
        let root = tree.root();
        let mut layout = Vec::new();
        for (g, leaves) in groups.iter().enumerate() {
            let group = tree.add_hier_node(root, format!("g{g}")).expect("group");
            let ids: Vec<NodeId> = leaves
                .iter()
                .enumerate()
                .map(|(l, size)| tree.add_node(group, format!("l{l}"), size * magnitude).expect("leaf"))
                .collect();
            layout.push((group, ids));
        }

        let root_circle = pack_hierarchy(&mut tree, root, &CirclePackConfig::default()).expect("root");
        prop_assert!((root_circle.r - 1.0).abs() <= 1e-9);

        let group_circles: Vec<Circle> = layout.iter().map(|(group, _)| circle_of(&tree, *group)).collect();
        for (i, a) in group_circles.iter().enumerate() {
            prop_assert!(a.center().distance(root_circle.center()) + a.r <= root_circle.r + 1e-6);
            for b in &group_circles[i + 1..] {
                prop_assert!(a.center().distance(b.center()) - (a.r + b.r) >= -1e-6);
            }
        }

        for ((_, leaves), parent) in layout.iter().zip(&group_circles) {
            let circles: Vec<Circle> = leaves.iter().map(|id| circle_of(&tree, *id)).collect();
            for (i, a) in circles.iter().enumerate() {
                prop_assert!(a.r > 0.0);
                let reach = a.center().distance(parent.center()) + a.r;
                prop_assert!(reach <= parent.r + 1e-6, "leaf escapes its group by {}", reach - parent.r);
                for b in &circles[i + 1..] {
                    let gap = a.center().distance(b.center()) - (a.r + b.r);
                    prop_assert!(gap >= -1e-6, "sibling overlap of {gap} at 1e{exponent}");
                }
            }
        }
    }

    #[test]
    fn treemap_leaves_tile_the_bounds_proportionally(
        sizes in prop::collection::vec(0.5f64..100.0, 1..20),
        width in 10.0f64..1_000.0,
        height in 10.0f64..1_000.0
    ) {
        let mut tree = NodeTree::new("");
        let root = tree.root();
        let ids: Vec<_> = sizes
            .iter()
            .enumerate()
            .map(|(i, size)| tree.add_node(root, format!("n{i}"), *size).expect("leaf"))
            .collect();
        let bounds = Rect::new(0.0, 0.0, width, height);
        pack_treemap(&mut tree, root, bounds, &TreemapConfig::flat());

        let total: f64 = sizes.iter().sum();
        let mut covered = 0.0;
        for (id, size) in ids.iter().zip(&sizes) {
            let Some(Geometry::Rect(rect)) = tree.node(*id).expect("node").geometry() else {
                panic!("leaf was not placed");
            };
            let expected = bounds.area() * size / total;
            prop_assert!((rect.area() - expected).abs() <= expected * 1e-6 + 1e-9);
            prop_assert!(rect.x >= -1e-9 && rect.right() <= width + 1e-6);
            prop_assert!(rect.y >= -1e-9 && rect.bottom() <= height + 1e-6);
            covered += rect.area();
        }
        prop_assert!((covered - bounds.area()).abs() <= bounds.area() * 1e-9);
    }

    #[test]
    fn sunburst_children_partition_their_parent_wedge(
        groups in prop::collection::vec(prop::collection::vec(0.5f64..50.0, 1..6), 1..6),
        start in -180.0f64..180.0
    ) {
        let mut tree = NodeTree::new("root");
        let root = tree.root();
        let mut group_ids = Vec::new();
        for (g, leaves) in groups.iter().enumerate() {
            let group = tree.add_hier_node(root, format!("g{g}")).expect("group");
            for (l, size) in leaves.iter().enumerate() {
                tree.add_node(group, format!("l{l}"), *size).expect("leaf");
            }
            group_ids.push(group);
        }
        let config = SunburstConfig {
            start_angle_deg: start,
            ..SunburstConfig::default()
        };
        pack_sunburst(&mut tree, root, 10.0, 100.0, &config);

        let wedge = |id| match tree.node(id).expect("node").geometry() {
            Some(Geometry::Wedge(wedge)) => wedge,
            other => panic!("expected wedge, got {other:?}"),
        };
        let top_sum: f64 = group_ids.iter().map(|id| wedge(*id).angle_delta).sum();
        prop_assert!((top_sum - 360.0).abs() <= 1e-9);

        for group in &group_ids {
            let parent = wedge(*group);
            let mut cursor = parent.angle_start;
            for member in tree.members(*group) {
                let child = wedge(member);
                prop_assert!((child.angle_start - cursor).abs() <= 1e-9);
                prop_assert!(child.r_inner >= parent.r_outer - 1e-9);
                cursor += child.angle_delta;
            }
            prop_assert!((cursor - parent.angle_start - parent.angle_delta).abs() <= 1e-9);
        }
    }
}
