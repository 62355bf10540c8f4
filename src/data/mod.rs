//! Row-iteration input and tree construction.

mod rows;
mod tree_builder;

pub use rows::{CellValue, DataError, DataErrorKind, DataErrorLog, FlowRow, HierEvent, HierRow};
pub use tree_builder::{TreeBuild, build_tree, build_tree_from_events};
