//! Grouping state plugin.
//!
//! Keeps the `grouping` spec and the `expandedGroups` key list in the host's
//! input table. `changeGrouping` toggles a column in or out of the spec;
//! `toggleGroupExpanded` toggles one group key. Groups start collapsed
//! unless seeded.

use gridwork_core::Grouping;
use gridwork_plugin_api::PluginDeclaration;

use crate::convert::{list, to_array};

/// Grouping state, seeded with an initial spec and expanded keys.
pub fn grouping_state(initial: Vec<Grouping>, expanded: Vec<String>) -> PluginDeclaration {
    let initial_value = to_array(&initial);
    let expanded_value = to_array(&expanded);

    PluginDeclaration::new("GroupingState")
        .getter("grouping", move |acc, _ctx| {
            if acc.is_null() {
                initial_value.clone()
            } else {
                (*acc).clone()
            }
        })
        .getter("expandedGroups", move |acc, _ctx| {
            if acc.is_null() {
                expanded_value.clone()
            } else {
                (*acc).clone()
            }
        })
        .action("changeGrouping", |payload, ctx, next| {
            let Some(column_name) = payload["columnName"].as_str() else {
                next.call(payload);
                return;
            };

            let mut grouping: Vec<Grouping> = list(&ctx.get_value("grouping"));
            let had = grouping.len();
            grouping.retain(|g| g.column_name != column_name);
            if grouping.len() == had {
                grouping.push(Grouping::new(column_name));
            }

            ctx.set_input("grouping", to_array(&grouping));
            next.call(payload);
        })
        .action("toggleGroupExpanded", |payload, ctx, next| {
            let Some(group_key) = payload["groupKey"].as_str() else {
                next.call(payload);
                return;
            };

            let mut expanded: Vec<String> = list(&ctx.get_value("expandedGroups"));
            let had = expanded.len();
            expanded.retain(|key| key != group_key);
            if expanded.len() == had {
                expanded.push(group_key.to_string());
            }

            ctx.set_input("expandedGroups", to_array(&expanded));
            next.call(payload);
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridwork_plugin_api::PluginHost;
    use serde_json::json;

    fn grouping_of(host: &PluginHost) -> Vec<Grouping> {
        list(&host.get_value("grouping").unwrap())
    }

    fn expanded_of(host: &PluginHost) -> Vec<String> {
        list(&host.get_value("expandedGroups").unwrap())
    }

    #[test]
    fn test_initial_state() {
        let host = PluginHost::new();
        host.mount(vec![grouping_state(
            vec![Grouping::new("region")],
            vec!["region|north".to_string()],
        )])
        .unwrap();

        assert_eq!(grouping_of(&host), vec![Grouping::new("region")]);
        assert_eq!(expanded_of(&host), vec!["region|north"]);
    }

    #[test]
    fn test_change_grouping_toggles_column() {
        let host = PluginHost::new();
        host.mount(vec![grouping_state(Vec::new(), Vec::new())]).unwrap();

        host.invoke_action("changeGrouping", json!({ "columnName": "region" }))
            .unwrap();
        assert_eq!(grouping_of(&host), vec![Grouping::new("region")]);

        host.invoke_action("changeGrouping", json!({ "columnName": "region" }))
            .unwrap();
        assert!(grouping_of(&host).is_empty());
    }

    #[test]
    fn test_toggle_group_expanded() {
        let host = PluginHost::new();
        host.mount(vec![grouping_state(vec![Grouping::new("region")], Vec::new())])
            .unwrap();

        host.invoke_action("toggleGroupExpanded", json!({ "groupKey": "region|north" }))
            .unwrap();
        assert_eq!(expanded_of(&host), vec!["region|north"]);

        host.invoke_action("toggleGroupExpanded", json!({ "groupKey": "region|north" }))
            .unwrap();
        assert!(expanded_of(&host).is_empty());
    }
}
