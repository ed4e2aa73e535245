//! Local sorting plugin.
//!
//! Sorts the `rows` getter by the current `sorting` spec. The sort is
//! stable, so criteria beyond the first act as tie-breaks when the data
//! layer pre-orders rows.

use serde_json::Value;
use std::cmp::Ordering;

use gridwork_core::{cell_value, SortDirection, Sorting};
use gridwork_plugin_api::PluginDeclaration;

use crate::convert::{compare_values, list};

/// Sorts rows in memory; requires `SortingState`.
pub fn local_sorting() -> PluginDeclaration {
    PluginDeclaration::new("LocalSorting")
        .requires("SortingState")
        .getter("rows", |acc, ctx| {
            let sorting: Vec<Sorting> = list(&ctx.get("sorting"));
            if sorting.is_empty() {
                return (*acc).clone();
            }

            let mut rows: Vec<Value> = acc.as_array().cloned().unwrap_or_default();
            rows.sort_by(|a, b| compare_rows(a, b, &sorting));
            Value::Array(rows)
        })
}

fn compare_rows(a: &Value, b: &Value, sorting: &[Sorting]) -> Ordering {
    for criterion in sorting {
        let ordering = compare_values(
            &cell_value(a, &criterion.column_name),
            &cell_value(b, &criterion.column_name),
        );
        let ordering = match criterion.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sorting_state::sorting_state;
    use gridwork_plugin_api::{PluginHost, ResolveError};
    use serde_json::json;

    fn host_with_rows(initial: Vec<Sorting>) -> PluginHost {
        let host = PluginHost::new();
        host.set_input(
            "rows",
            json!([
                { "id": 0, "region": "south", "amount": 65 },
                { "id": 1, "region": "north", "amount": 40 },
                { "id": 2, "region": "east", "amount": 175 },
            ]),
        );
        host.mount(vec![sorting_state(initial), local_sorting()]).unwrap();
        host
    }

    #[test]
    fn test_rows_sorted_ascending() {
        let host = host_with_rows(vec![Sorting::asc("amount")]);
        let rows = host.get_value("rows").unwrap();
        let amounts: Vec<i64> = rows
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["amount"].as_i64().unwrap())
            .collect();
        assert_eq!(amounts, vec![40, 65, 175]);
    }

    #[test]
    fn test_rows_sorted_descending_by_string() {
        let host = host_with_rows(vec![Sorting::desc("region")]);
        let rows = host.get_value("rows").unwrap();
        let regions: Vec<&str> = rows
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["region"].as_str().unwrap())
            .collect();
        assert_eq!(regions, vec!["south", "north", "east"]);
    }

    #[test]
    fn test_empty_sorting_keeps_order() {
        let host = host_with_rows(Vec::new());
        let rows = host.get_value("rows").unwrap();
        let ids: Vec<i64> = rows
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_change_sort_reorders_rows() {
        let host = host_with_rows(Vec::new());
        host.invoke_action(
            "changeSort",
            json!({ "columnName": "amount", "direction": "desc" }),
        )
        .unwrap();

        let rows = host.get_value("rows").unwrap();
        assert_eq!(rows[0]["amount"], json!(175));
        assert_eq!(rows[2]["amount"], json!(40));
    }

    #[test]
    fn test_requires_sorting_state() {
        let host = PluginHost::new();
        let error = host.mount(vec![local_sorting()]).unwrap_err();
        assert_eq!(
            error,
            ResolveError::MissingDependency {
                plugin: "LocalSorting".to_string(),
                dependency: "SortingState".to_string(),
            }
            .into()
        );
    }
}
