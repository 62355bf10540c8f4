use approx::assert_abs_diff_eq;
use hierchart_rs::core::{Geometry, NodeId, NodeTree, Wedge};
use hierchart_rs::layout::{SortPolicy, SortType, SunburstConfig, pack_sunburst};

fn wedge_of(tree: &NodeTree, id: NodeId) -> Wedge {
    match tree.node(id).expect("node").geometry() {
        Some(Geometry::Wedge(wedge)) => wedge,
        other => panic!("expected wedge geometry, got {other:?}"),
    }
}

#[test]
fn childless_root_gets_the_full_ring() {
    let mut tree = NodeTree::new("");
    let root = tree.root();

    let placed = pack_sunburst(&mut tree, root, 10.0, 100.0, &SunburstConfig::default());
    assert_eq!(placed, 1);
    let wedge = wedge_of(&tree, root);
    assert_abs_diff_eq!(wedge.angle_start, 0.0);
    assert_abs_diff_eq!(wedge.angle_delta, 360.0);
    assert_abs_diff_eq!(wedge.r_inner, 10.0);
    assert_abs_diff_eq!(wedge.r_outer, 100.0);
}

#[test]
fn named_root_sits_in_the_first_band() {
    let mut tree = NodeTree::new("root");
    let root = tree.root();
    let a = tree.add_node(root, "a", 1.0).expect("a");
    let b = tree.add_node(root, "b", 3.0).expect("b");

    pack_sunburst(&mut tree, root, 0.0, 100.0, &SunburstConfig::default());
    let root_wedge = wedge_of(&tree, root);
    assert_abs_diff_eq!(root_wedge.r_outer, 50.0);
    assert_abs_diff_eq!(root_wedge.angle_delta, 360.0);

    let a = wedge_of(&tree, a);
    let b = wedge_of(&tree, b);
    assert_abs_diff_eq!(a.r_inner, 50.0);
    assert_abs_diff_eq!(a.r_outer, 100.0);
    assert_abs_diff_eq!(a.angle_start, 0.0);
    assert_abs_diff_eq!(a.angle_delta, 90.0, epsilon = 1e-9);
    assert_abs_diff_eq!(b.angle_start, 90.0, epsilon = 1e-9);
    assert_abs_diff_eq!(b.angle_delta, 270.0, epsilon = 1e-9);
}

#[test]
fn unnamed_root_with_one_member_is_elided() {
    let mut tree = NodeTree::new("");
    let root = tree.root();
    let only = tree.add_hier_node(root, "only").expect("only");
    let x = tree.add_node(only, "x", 1.0).expect("x");
    tree.add_node(only, "y", 3.0).expect("y");

    let placed = pack_sunburst(&mut tree, root, 0.0, 100.0, &SunburstConfig::default());
    assert_eq!(placed, 3);
    assert!(!tree.node(root).expect("root").is_placed());

    let top = wedge_of(&tree, only);
    assert_abs_diff_eq!(top.r_inner, 0.0);
    assert_abs_diff_eq!(top.r_outer, 50.0);
    assert_abs_diff_eq!(top.angle_delta, 360.0);
    let x = wedge_of(&tree, x);
    assert_abs_diff_eq!(x.r_inner, 50.0);
    assert_abs_diff_eq!(x.angle_delta, 90.0, epsilon = 1e-9);
}

#[test]
fn multi_root_starts_members_in_the_first_band() {
    let mut tree = NodeTree::new("");
    let root = tree.root();
    let a = tree.add_node(root, "a", 1.0).expect("a");
    let group = tree.add_hier_node(root, "g").expect("g");
    let c = tree.add_node(group, "c", 1.0).expect("c");
    let d = tree.add_node(group, "d", 2.0).expect("d");

    let config = SunburstConfig {
        multi_root: true,
        ..SunburstConfig::default()
    };
    let placed = pack_sunburst(&mut tree, root, 0.0, 100.0, &config);
    assert_eq!(placed, 4);
    assert!(!tree.node(root).expect("root").is_placed());

    let a = wedge_of(&tree, a);
    let g = wedge_of(&tree, group);
    assert_abs_diff_eq!(a.r_inner, 0.0);
    assert_abs_diff_eq!(a.r_outer, 50.0);
    assert_abs_diff_eq!(g.r_outer, 50.0);
    assert_abs_diff_eq!(a.angle_delta + g.angle_delta, 360.0, epsilon = 1e-9);
    assert_abs_diff_eq!(g.angle_delta, 270.0, epsilon = 1e-9);

    let c = wedge_of(&tree, c);
    let d = wedge_of(&tree, d);
    assert_abs_diff_eq!(c.r_inner, 50.0);
    assert_abs_diff_eq!(d.r_outer, 100.0);
    assert_abs_diff_eq!(c.angle_delta, 90.0, epsilon = 1e-9);
    assert_abs_diff_eq!(d.angle_delta, 180.0, epsilon = 1e-9);
    assert_abs_diff_eq!(c.angle_start, g.angle_start, epsilon = 1e-9);
}

#[test]
fn count_sort_weights_by_visible_leaves() {
    let mut tree = NodeTree::new("root");
    let root = tree.root();
    let group = tree.add_hier_node(root, "group").expect("group");
    for name in ["a", "b", "c"] {
        tree.add_node(group, name, 1.0).expect("leaf");
    }
    let big = tree.add_node(root, "big", 30.0).expect("big");

    let by_count = SunburstConfig {
        sort_type: SortType::Count,
        ..SunburstConfig::default()
    };
    pack_sunburst(&mut tree, root, 0.0, 90.0, &by_count);
    assert_abs_diff_eq!(wedge_of(&tree, group).angle_delta, 270.0, epsilon = 1e-9);
    assert_abs_diff_eq!(wedge_of(&tree, big).angle_delta, 90.0, epsilon = 1e-9);

    tree.clear_geometry();
    pack_sunburst(&mut tree, root, 0.0, 90.0, &SunburstConfig::default());
    assert_abs_diff_eq!(wedge_of(&tree, group).angle_delta, 360.0 * 3.0 / 33.0, epsilon = 1e-9);
    assert_abs_diff_eq!(wedge_of(&tree, big).angle_delta, 360.0 * 30.0 / 33.0, epsilon = 1e-9);
}

#[test]
fn name_sort_orders_case_insensitively() {
    let mut tree = NodeTree::new("root");
    let root = tree.root();
    let beta = tree.add_node(root, "beta", 1.0).expect("beta");
    let alpha = tree.add_node(root, "Alpha", 1.0).expect("alpha");
    let gamma = tree.add_node(root, "gamma", 2.0).expect("gamma");

    let ascending = SunburstConfig {
        sort_type: SortType::Name,
        order: SortPolicy::Ascending,
        ..SunburstConfig::default()
    };
    pack_sunburst(&mut tree, root, 0.0, 100.0, &ascending);
    assert_abs_diff_eq!(wedge_of(&tree, alpha).angle_start, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(wedge_of(&tree, beta).angle_start, 90.0, epsilon = 1e-9);
    assert_abs_diff_eq!(wedge_of(&tree, gamma).angle_start, 180.0, epsilon = 1e-9);
    assert_abs_diff_eq!(wedge_of(&tree, gamma).angle_delta, 180.0, epsilon = 1e-9);

    let descending = SunburstConfig {
        order: SortPolicy::Descending,
        ..ascending
    };
    tree.clear_geometry();
    pack_sunburst(&mut tree, root, 0.0, 100.0, &descending);
    assert_abs_diff_eq!(wedge_of(&tree, gamma).angle_start, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(wedge_of(&tree, alpha).angle_start, 270.0, epsilon = 1e-9);
}

#[test]
fn start_angle_offsets_every_wedge() {
    let mut tree = NodeTree::new("root");
    let root = tree.root();
    let a = tree.add_node(root, "a", 1.0).expect("a");

    let config = SunburstConfig {
        start_angle_deg: -90.0,
        ..SunburstConfig::default()
    };
    pack_sunburst(&mut tree, root, 0.0, 100.0, &config);
    assert_abs_diff_eq!(wedge_of(&tree, root).angle_start, -90.0);
    assert_abs_diff_eq!(wedge_of(&tree, a).angle_start, -90.0);
}

#[test]
fn zero_weight_members_are_left_unplaced() {
    let mut tree = NodeTree::new("root");
    let root = tree.root();
    let a = tree.add_node(root, "a", 0.0).expect("a");
    let b = tree.add_node(root, "b", 0.0).expect("b");

    let placed = pack_sunburst(&mut tree, root, 0.0, 100.0, &SunburstConfig::default());
    assert_eq!(placed, 1);
    assert!(!tree.node(a).expect("a").is_placed());
    assert!(!tree.node(b).expect("b").is_placed());
}

#[test]
fn invalid_radius_ratios_are_rejected() {
    let config = SunburstConfig {
        inner_radius_ratio: 0.8,
        outer_radius_ratio: 0.5,
        ..SunburstConfig::default()
    };
    assert!(config.validate().is_err());
    assert!(SunburstConfig::default().validate().is_ok());
}
