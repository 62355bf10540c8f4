use hierchart_rs::data::{HierRow, build_tree};
use hierchart_rs::layout::DrillNavigator;
use proptest::prelude::*;

fn rows_strategy() -> impl Strategy<Value = Vec<(u8, u8, f64)>> {
    prop::collection::vec((0u8..4, 0u8..4, 0.5f64..100.0), 1..40)
}

fn to_rows(raw: &[(u8, u8, f64)]) -> Vec<HierRow> {
    raw.iter()
        .map(|(group, leaf, size)| HierRow::new([format!("g{group}"), format!("l{leaf}")], *size))
        .collect()
}

proptest! {
    #[test]
    fn aggregate_size_equals_the_sum_of_row_sizes(raw in rows_strategy()) {
        let build = build_tree(to_rows(&raw));
        prop_assert!(build.errors.is_empty());

        let tree = build.tree;
        let total: f64 = raw.iter().map(|row| row.2).sum();
        prop_assert!((tree.hier_size(tree.root()) - total).abs() <= total * 1e-12);

        for group in tree.members(tree.root()) {
            let members: f64 = tree.members(group).iter().map(|m| tree.hier_size(*m)).sum();
            prop_assert!((tree.hier_size(group) - members).abs() <= members * 1e-12);
        }
    }

    #[test]
    fn drilling_into_any_group_round_trips_through_its_path(raw in rows_strategy(), pick in 0usize..4) {
        let tree = build_tree(to_rows(&raw)).tree;
        let groups = tree.members(tree.root());
        let target = groups[pick % groups.len()];

        let mut navigator = DrillNavigator::new(tree.root());
        prop_assert!(navigator.push(&tree, target).expect("push"));
        let path = navigator.active_path(&tree);

        let mut restored = DrillNavigator::new(tree.root());
        let resolution = restored.restore_path(&tree, &path);
        prop_assert!(resolution.complete);
        prop_assert_eq!(restored.active_root(), target);

        prop_assert!(navigator.pop_top());
        prop_assert!(navigator.is_at_top());
    }
}
