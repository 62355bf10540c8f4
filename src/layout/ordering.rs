use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Sibling ordering applied before packing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortPolicy {
    #[default]
    Insertion,
    Ascending,
    Descending,
}

impl SortPolicy {
    /// Maps the host's "sorted" / "sort-reverse" toggles to a policy.
    #[must_use]
    pub fn from_toggles(sorted: bool, reverse: bool) -> Self {
        match (sorted, reverse) {
            (false, _) => Self::Insertion,
            (true, false) => Self::Ascending,
            (true, true) => Self::Descending,
        }
    }

    #[must_use]
    pub fn is_sorted(self) -> bool {
        self != Self::Insertion
    }

    /// Stable sort of `items` by a numeric key.
    pub fn sort_by_metric<T>(self, items: &mut [T], mut key: impl FnMut(&T) -> f64) {
        match self {
            Self::Insertion => {}
            Self::Ascending => items.sort_by_key(|item| OrderedFloat(key(item))),
            Self::Descending => {
                items.sort_by_key(|item| std::cmp::Reverse(OrderedFloat(key(item))));
            }
        }
    }

    /// Stable case-insensitive sort of `items` by name.
    pub fn sort_by_name<T>(self, items: &mut [T], mut name: impl FnMut(&T) -> String) {
        match self {
            Self::Insertion => {}
            Self::Ascending => items.sort_by_cached_key(|item| name(item).to_lowercase()),
            Self::Descending => {
                items.sort_by_cached_key(|item| std::cmp::Reverse(name(item).to_lowercase()));
            }
        }
    }
}
