//! Grid state specs.
//!
//! These are the immutable snapshots state plugins keep in the host's input
//! table. Actions never edit them in place; they produce a replacement
//! snapshot so recomputation can compare by version.

use serde::{Deserialize, Serialize};

/// Sort direction for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// The opposite direction.
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// A sort criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sorting {
    /// Column to sort by.
    pub column_name: String,

    /// Direction to sort in.
    pub direction: SortDirection,
}

impl Sorting {
    /// Create an ascending sort on the given column.
    pub fn asc(column_name: impl Into<String>) -> Self {
        Self {
            column_name: column_name.into(),
            direction: SortDirection::Asc,
        }
    }

    /// Create a descending sort on the given column.
    pub fn desc(column_name: impl Into<String>) -> Self {
        Self {
            column_name: column_name.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// A column filter. Rows whose cell text does not contain `value`
/// (case-insensitively) are dropped by local filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    /// Column to filter on.
    pub column_name: String,

    /// Substring the cell text must contain.
    pub value: String,
}

impl Filter {
    /// Create a filter on the given column.
    pub fn new(column_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column_name: column_name.into(),
            value: value.into(),
        }
    }
}

/// A grouping criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grouping {
    /// Column to group by.
    pub column_name: String,
}

impl Grouping {
    /// Group by the given column.
    pub fn new(column_name: impl Into<String>) -> Self {
        Self {
            column_name: column_name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sort_direction_toggled() {
        assert_eq!(SortDirection::Asc.toggled(), SortDirection::Desc);
        assert_eq!(SortDirection::Desc.toggled(), SortDirection::Asc);
    }

    #[test]
    fn test_sorting_serde_shape() {
        let value = serde_json::to_value(Sorting::asc("amount")).unwrap();
        assert_eq!(value, json!({ "columnName": "amount", "direction": "asc" }));
    }

    #[test]
    fn test_filter_serde_shape() {
        let value = serde_json::to_value(Filter::new("region", "nor")).unwrap();
        assert_eq!(value, json!({ "columnName": "region", "value": "nor" }));
    }
}
