use tracing::{debug, warn};

use crate::core::{NodeId, NodeTree};
use crate::data::{DataErrorKind, DataErrorLog, HierEvent, HierRow};
use crate::error::LayoutResult;

/// Result of one full tree construction.
#[derive(Debug, Clone)]
pub struct TreeBuild {
    pub tree: NodeTree,
    pub errors: DataErrorLog,
}

/// Builds a fresh tree from path rows.
///
/// Every path prefix becomes a hierarchical node, the last segment a leaf.
/// Repeated paths accumulate size. Invalid rows are skipped and logged.
pub fn build_tree<I>(rows: I) -> TreeBuild
where
    I: IntoIterator<Item = HierRow>,
{
    let mut tree = NodeTree::new("");
    let mut errors = DataErrorLog::default();
    let root = tree.root();
    let mut row_count = 0;

    for (index, row) in rows.into_iter().enumerate() {
        row_count += 1;
        insert_row(&mut tree, root, &row, index, &mut errors);
    }

    finish(tree, errors, row_count)
}

/// Builds a fresh tree from an event stream with explicit group boundaries.
pub fn build_tree_from_events<I>(events: I) -> TreeBuild
where
    I: IntoIterator<Item = HierEvent>,
{
    let mut tree = NodeTree::new("");
    let mut errors = DataErrorLog::default();
    let mut stack: Vec<NodeId> = vec![tree.root()];
    let mut event_count = 0;

    for (index, event) in events.into_iter().enumerate() {
        event_count += 1;
        let current = stack.last().copied().unwrap_or_else(|| tree.root());
        match event {
            HierEvent::Enter(name) => {
                if name.trim().is_empty() {
                    errors.record(index, DataErrorKind::EmptyName);
                    // Keep enter/exit pairs balanced.
                    stack.push(current);
                    continue;
                }
                match find_or_create_group(&mut tree, current, &name) {
                    Ok(group) => stack.push(group),
                    Err(err) => {
                        warn!(index, error = %err, "skipping group enter");
                        stack.push(current);
                    }
                }
            }
            HierEvent::Exit => {
                if stack.len() > 1 {
                    stack.pop();
                } else {
                    errors.record(index, DataErrorKind::UnbalancedExit);
                }
            }
            HierEvent::Row(row) => insert_row(&mut tree, current, &row, index, &mut errors),
        }
    }

    finish(tree, errors, event_count)
}

fn finish(mut tree: NodeTree, errors: DataErrorLog, input_count: usize) -> TreeBuild {
    let fillers = tree.materialize_fillers();
    let root = tree.root();
    tree.assign_depths(root);
    debug!(
        input_count,
        node_count = tree.node_count(),
        fillers,
        data_errors = errors.len(),
        "built node tree"
    );
    TreeBuild { tree, errors }
}

fn insert_row(
    tree: &mut NodeTree,
    base: NodeId,
    row: &HierRow,
    index: usize,
    errors: &mut DataErrorLog,
) {
    let Some((last, prefix)) = row.path.split_last() else {
        errors.record(index, DataErrorKind::EmptyPath);
        return;
    };
    if row.path.iter().any(|segment| segment.trim().is_empty()) {
        errors.record(index, DataErrorKind::EmptyName);
        return;
    }
    let size = match row.size.to_size() {
        Ok(size) => size,
        Err(kind) => {
            warn!(index, error = %kind, "skipping row");
            errors.record(index, kind);
            return;
        }
    };

    if let Err(err) = insert_valid_row(tree, base, prefix, last, size, row) {
        warn!(index, error = %err, "skipping row after tree error");
    }
}

fn insert_valid_row(
    tree: &mut NodeTree,
    base: NodeId,
    prefix: &[String],
    last: &str,
    size: f64,
    row: &HierRow,
) -> LayoutResult<()> {
    let mut cursor = base;
    for segment in prefix {
        cursor = find_or_create_group(tree, cursor, segment)?;
    }

    let target = match tree.find_child(cursor, last) {
        Some(existing) => {
            let accumulated = tree.node(existing)?.size() + size;
            tree.set_own_size(existing, accumulated)?;
            existing
        }
        None => tree.add_node(cursor, last, size)?,
    };
    if row.color.is_some() {
        tree.set_color(target, row.color)?;
    }
    if row.color_bucket.is_some() {
        tree.set_color_bucket(target, row.color_bucket)?;
    }
    Ok(())
}

fn find_or_create_group(tree: &mut NodeTree, parent: NodeId, name: &str) -> LayoutResult<NodeId> {
    match tree.find_child(parent, name) {
        Some(existing) => {
            tree.promote_to_hier(existing)?;
            Ok(existing)
        }
        None => tree.add_hier_node(parent, name),
    }
}
