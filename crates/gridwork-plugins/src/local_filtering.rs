//! Local filtering plugin.
//!
//! Drops rows that fail the current `filters` spec. The predicate is
//! case-insensitive substring containment over the cell's display text,
//! and every filter must match.

use serde_json::Value;

use gridwork_core::{cell_value, Filter};
use gridwork_plugin_api::PluginDeclaration;

use crate::convert::{list, value_text};

/// Filters rows in memory; requires `FilteringState`.
pub fn local_filtering() -> PluginDeclaration {
    PluginDeclaration::new("LocalFiltering")
        .requires("FilteringState")
        .getter("rows", |acc, ctx| {
            let filters: Vec<Filter> = list(&ctx.get("filters"));
            if filters.is_empty() {
                return (*acc).clone();
            }

            let kept: Vec<Value> = acc
                .as_array()
                .map(|rows| {
                    rows.iter()
                        .filter(|row| row_matches(row, &filters))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
            Value::Array(kept)
        })
}

fn row_matches(row: &Value, filters: &[Filter]) -> bool {
    filters.iter().all(|filter| {
        let cell = value_text(&cell_value(row, &filter.column_name)).to_lowercase();
        cell.contains(&filter.value.to_lowercase())
    })
}
