//! Local grouping plugin.
//!
//! Regroups the `rows` getter by the first `grouping` criterion: the output
//! is a flat array of group marker objects, each followed by its member rows
//! when the group is expanded. Groups appear in first-seen row order.
//!
//! Markers carry a `__group__` bag; the table layer recognizes it and lifts
//! the marker into a group table row.

use serde_json::{json, Value};

use gridwork_core::{cell_value, Grouping};
use gridwork_plugin_api::PluginDeclaration;

use crate::convert::{list, value_text};

/// The key identifying a group of rows sharing `value` in `column_name`.
pub fn group_key(column_name: &str, value: &Value) -> String {
    format!("{}|{}", column_name, value_text(value))
}

/// Groups rows in memory; requires `GroupingState`.
pub fn local_grouping() -> PluginDeclaration {
    PluginDeclaration::new("LocalGrouping")
        .requires("GroupingState")
        .getter("rows", |acc, ctx| {
            let grouping: Vec<Grouping> = list(&ctx.get("grouping"));
            let Some(criterion) = grouping.first() else {
                return (*acc).clone();
            };
            let expanded: Vec<String> = list(&ctx.get("expandedGroups"));

            let rows = acc.as_array().cloned().unwrap_or_default();
            let mut groups: Vec<(String, Value, Vec<Value>)> = Vec::new();
            for row in rows {
                let value = cell_value(&row, &criterion.column_name);
                let key = group_key(&criterion.column_name, &value);
                match groups.iter_mut().find(|(existing, _, _)| *existing == key) {
                    Some((_, _, members)) => members.push(row),
                    None => groups.push((key, value, vec![row])),
                }
            }

            let mut out = Vec::new();
            for (key, value, members) in groups {
                out.push(json!({
                    "__group__": {
                        "groupKey": key,
                        "columnName": criterion.column_name,
                        "value": value,
                    }
                }));
                if expanded.iter().any(|k| *k == key) {
                    out.extend(members);
                }
            }
            Value::Array(out)
        })
}
