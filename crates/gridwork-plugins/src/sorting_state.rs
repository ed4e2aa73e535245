//! Sorting state plugin.
//!
//! Keeps the `sorting` spec in the host's input table and reduces it through
//! the `changeSort` action. Single-sort: `changeSort` on a new column
//! replaces the spec, on the current column it flips the direction.

use gridwork_core::{SortDirection, Sorting};
use gridwork_plugin_api::PluginDeclaration;

use crate::convert::{list, to_array};

/// Sorting state, seeded with an initial spec.
pub fn sorting_state(initial: Vec<Sorting>) -> PluginDeclaration {
    let initial_value = to_array(&initial);

    PluginDeclaration::new("SortingState")
        .getter("sorting", move |acc, _ctx| {
            if acc.is_null() {
                initial_value.clone()
            } else {
                (*acc).clone()
            }
        })
        .action("changeSort", |payload, ctx, next| {
            let Some(column_name) = payload["columnName"].as_str() else {
                next.call(payload);
                return;
            };

            let current: Vec<Sorting> = list(&ctx.get_value("sorting"));
            let direction = match payload["direction"].as_str() {
                Some("asc") => SortDirection::Asc,
                Some("desc") => SortDirection::Desc,
                _ => match current.first() {
                    Some(sorting) if sorting.column_name == column_name => {
                        sorting.direction.toggled()
                    }
                    _ => SortDirection::Asc,
                },
            };

            let next_sorting = vec![Sorting {
                column_name: column_name.to_string(),
                direction,
            }];
            ctx.set_input("sorting", to_array(&next_sorting));
            next.call(payload);
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridwork_plugin_api::PluginHost;
    use serde_json::json;

    fn sorting_of(host: &PluginHost) -> Vec<Sorting> {
        list(&host.get_value("sorting").unwrap())
    }

    #[test]
    fn test_initial_sorting() {
        let host = PluginHost::new();
        host.mount(vec![sorting_state(vec![Sorting::asc("region")])]).unwrap();
        assert_eq!(sorting_of(&host), vec![Sorting::asc("region")]);
    }

    #[test]
    fn test_change_sort_replaces_column() {
        let host = PluginHost::new();
        host.mount(vec![sorting_state(vec![Sorting::asc("region")])]).unwrap();

        host.invoke_action("changeSort", json!({ "columnName": "amount" }))
            .unwrap();
        assert_eq!(sorting_of(&host), vec![Sorting::asc("amount")]);
    }

    #[test]
    fn test_change_sort_toggles_current_column() {
        let host = PluginHost::new();
        host.mount(vec![sorting_state(Vec::new())]).unwrap();

        host.invoke_action("changeSort", json!({ "columnName": "amount" }))
            .unwrap();
        assert_eq!(sorting_of(&host), vec![Sorting::asc("amount")]);

        host.invoke_action("changeSort", json!({ "columnName": "amount" }))
            .unwrap();
        assert_eq!(sorting_of(&host), vec![Sorting::desc("amount")]);
    }

    #[test]
    fn test_change_sort_explicit_direction() {
        let host = PluginHost::new();
        host.mount(vec![sorting_state(Vec::new())]).unwrap();

        host.invoke_action(
            "changeSort",
            json!({ "columnName": "amount", "direction": "desc" }),
        )
        .unwrap();
        assert_eq!(sorting_of(&host), vec![Sorting::desc("amount")]);
    }

    #[test]
    fn test_change_sort_without_column_is_ignored() {
        let host = PluginHost::new();
        host.mount(vec![sorting_state(vec![Sorting::asc("region")])]).unwrap();

        host.invoke_action("changeSort", json!({})).unwrap();
        assert_eq!(sorting_of(&host), vec![Sorting::asc("region")]);
    }
}
