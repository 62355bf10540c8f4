use hierchart_rs::LayoutError;
use hierchart_rs::core::{NodeId, NodeTree};
use hierchart_rs::layout::DrillNavigator;

struct Fixture {
    tree: NodeTree,
    a: NodeId,
    b: NodeId,
    x: NodeId,
    top: NodeId,
}

fn fixture() -> Fixture {
    let mut tree = NodeTree::new("");
    let root = tree.root();
    let a = tree.add_hier_node(root, "a").expect("a");
    let b = tree.add_hier_node(a, "b").expect("b");
    let x = tree.add_node(b, "x", 2.0).expect("x");
    let top = tree.add_node(root, "top", 1.0).expect("top");
    Fixture { tree, a, b, x, top }
}

#[test]
fn push_into_group_changes_the_active_root_once() {
    let f = fixture();
    let mut nav = DrillNavigator::new(f.tree.root());
    assert!(nav.is_at_top());

    assert!(nav.push(&f.tree, f.b).expect("push b"));
    assert_eq!(nav.active_root(), f.b);
    assert!(!nav.push(&f.tree, f.b).expect("push b again"));
    assert_eq!(nav.absolute_root(), f.tree.root());
}

#[test]
fn push_on_a_leaf_drills_into_its_parent() {
    let f = fixture();
    let mut nav = DrillNavigator::new(f.tree.root());

    assert!(nav.push(&f.tree, f.x).expect("push x"));
    assert_eq!(nav.active_root(), f.b);

    assert!(nav.push(&f.tree, f.top).expect("push top"));
    assert!(nav.is_at_top());
}

#[test]
fn pop_walks_up_one_level_and_stops_at_the_top() {
    let f = fixture();
    let mut nav = DrillNavigator::new(f.tree.root());
    nav.push(&f.tree, f.b).expect("push b");

    assert!(nav.pop(&f.tree));
    assert_eq!(nav.active_root(), f.a);
    assert!(nav.pop(&f.tree));
    assert!(nav.is_at_top());
    assert!(!nav.pop(&f.tree));
}

#[test]
fn pop_top_returns_to_the_absolute_root() {
    let f = fixture();
    let mut nav = DrillNavigator::new(f.tree.root());
    nav.push(&f.tree, f.b).expect("push b");

    assert!(nav.pop_top());
    assert!(nav.is_at_top());
    assert!(!nav.pop_top());
}

#[test]
fn removed_node_cannot_be_pushed() {
    let mut f = fixture();
    let root = f.tree.root();
    f.tree.remove_node(root, f.a).expect("remove a");
    let mut nav = DrillNavigator::new(root);

    let err = nav.push(&f.tree, f.b).expect_err("b was dropped with a");
    assert!(matches!(err, LayoutError::UnknownNode(raw) if raw == f.b.raw()));
    assert!(nav.is_at_top());
}

#[test]
fn resolve_path_reports_how_far_it_got() {
    let f = fixture();
    let nav = DrillNavigator::new(f.tree.root());

    let full = nav.resolve_path(&f.tree, "a/b");
    assert_eq!(full.node, f.b);
    assert_eq!(full.matched, 2);
    assert!(full.complete);

    let partial = nav.resolve_path(&f.tree, "a/missing/b");
    assert_eq!(partial.node, f.a);
    assert_eq!(partial.matched, 1);
    assert!(!partial.complete);

    let through_leaf = nav.resolve_path(&f.tree, "a/b/x");
    assert_eq!(through_leaf.node, f.b);
    assert!(!through_leaf.complete);

    let empty = nav.resolve_path(&f.tree, "");
    assert_eq!(empty.node, f.tree.root());
    assert!(empty.complete);
}

#[test]
fn active_path_restores_the_same_view() {
    let f = fixture();
    let mut nav = DrillNavigator::new(f.tree.root());
    nav.push(&f.tree, f.b).expect("push b");
    let path = nav.active_path(&f.tree);
    assert_eq!(path, "a/b");

    let mut restored = DrillNavigator::new(f.tree.root());
    let resolution = restored.restore_path(&f.tree, &path);
    assert!(resolution.complete);
    assert_eq!(restored, nav);
}
