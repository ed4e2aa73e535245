//! Table group row plugin.
//!
//! Turns the group markers produced by local grouping into group table rows,
//! prepends the indent column while grouping is active, and overrides
//! `tableViewRow` for group rows only: a group row renders as a caret, the
//! grouped column's title, and the group value. Data and heading rows fall
//! through to the rest of the chain.

use serde_json::Value;

use gridwork_core::{Column, RowKind, TableColumn, TableRow};
use gridwork_plugin_api::PluginDeclaration;

use crate::convert::{list, to_array, value_text};

/// Renders group rows; requires `GroupingState` and `TableView`.
pub fn table_group_row() -> PluginDeclaration {
    PluginDeclaration::new("TableGroupRow")
        .requires("GroupingState")
        .requires("TableView")
        .getter("tableColumns", |acc, ctx| {
            let grouping = ctx.get("grouping");
            if grouping.as_array().map(|g| g.is_empty()).unwrap_or(true) {
                return (*acc).clone();
            }

            let mut columns: Vec<TableColumn> = vec![TableColumn::indent()];
            columns.extend(list::<TableColumn>(&acc));
            to_array(&columns)
        })
        .getter("tableBodyRows", |acc, _ctx| {
            let rows: Vec<TableRow> = list(&acc)
                .into_iter()
                .map(|row: TableRow| match group_bag(&row) {
                    Some(bag) => TableRow::group(
                        bag["columnName"].as_str().unwrap_or(""),
                        &bag["value"],
                        bag["groupKey"].as_str().unwrap_or(""),
                    ),
                    None => row,
                })
                .collect();
            to_array(&rows)
        })
        .template("tableViewRow", |ctx, scope| {
            let Some(row) = ctx.field::<TableRow>("tableRow") else {
                return scope.rest(ctx);
            };
            if row.kind != RowKind::Group {
                return scope.rest(ctx);
            }

            let group_key = row.row["groupKey"].as_str().unwrap_or("");
            let expanded = list::<String>(&scope.value("expandedGroups"))
                .iter()
                .any(|key| key == group_key);
            let caret = if expanded { "▾" } else { "▸" };

            let column_name = row.row["columnName"].as_str().unwrap_or("");
            let title = list::<Column>(&scope.value("columns"))
                .into_iter()
                .find(|column| column.name == column_name)
                .map(|column| column.display_title().to_string())
                .unwrap_or_else(|| column_name.to_string());

            format!("{} {}: {}", caret, title, value_text(&row.row["value"]))
        })
}

/// The `__group__` bag of a marker row lifted by local grouping.
fn group_bag(row: &TableRow) -> Option<&Value> {
    if row.kind != RowKind::Data {
        return None;
    }
    row.row.get("__group__")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping_state::grouping_state;
    use crate::local_grouping::local_grouping;
    use crate::table_view::{table_view, TableViewOptions};
    use gridwork_core::Grouping;
    use gridwork_plugin_api::{PluginHost, TemplateContext};
    use serde_json::json;

    fn grouped_host(expanded: Vec<String>) -> PluginHost {
        let host = PluginHost::new();
        host.set_input(
            "rows",
            json!([
                { "id": 0, "region": "north", "amount": 40 },
                { "id": 1, "region": "south", "amount": 65 },
                { "id": 2, "region": "north", "amount": 175 },
            ]),
        );
        host.set_input(
            "columns",
            json!([
                { "name": "region", "title": "Region" },
                { "name": "amount" },
            ]),
        );
        host.mount(vec![
            grouping_state(vec![Grouping::new("region")], expanded),
            local_grouping(),
            table_view(TableViewOptions::default()),
            table_group_row(),
        ])
        .unwrap();
        host
    }

    #[test]
    fn test_markers_become_group_rows() {
        let host = grouped_host(Vec::new());
        let rows: Vec<TableRow> = list(&host.get_value("tableBodyRows").unwrap());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].kind, RowKind::Group);
        assert_eq!(rows[0].row["groupKey"], json!("region|north"));
    }

    #[test]
    fn test_indent_column_prepended_while_grouping() {
        let host = grouped_host(Vec::new());
        let columns: Vec<TableColumn> = list(&host.get_value("tableColumns").unwrap());
        assert_eq!(columns.len(), 3);
        assert!(columns[0].column.is_none());
    }

    #[test]
    fn test_render_collapsed_groups() {
        let host = grouped_host(Vec::new());
        let text = host.render_slot("tableView", &TemplateContext::new()).unwrap();
        assert_eq!(text, "▸ Region: north\n▸ Region: south");
    }

    #[test]
    fn test_render_expanded_group_shows_members() {
        let host = grouped_host(vec!["region|north".to_string()]);
        let text = host.render_slot("tableView", &TemplateContext::new()).unwrap();
        assert_eq!(
            text,
            "▾ Region: north\n | north | 40\n | north | 175\n▸ Region: south"
        );
    }

    #[test]
    fn test_toggle_action_drives_rendering() {
        let host = grouped_host(Vec::new());
        host.invoke_action("toggleGroupExpanded", json!({ "groupKey": "region|south" }))
            .unwrap();

        let text = host.render_slot("tableView", &TemplateContext::new()).unwrap();
        assert_eq!(text, "▸ Region: north\n▾ Region: south\n | south | 65");
    }

    #[test]
    fn test_no_grouping_leaves_table_untouched() {
        let host = PluginHost::new();
        host.set_input("rows", json!([{ "id": 0, "region": "north" }]));
        host.set_input("columns", json!([{ "name": "region" }]));
        host.mount(vec![
            grouping_state(Vec::new(), Vec::new()),
            local_grouping(),
            table_view(TableViewOptions::default()),
            table_group_row(),
        ])
        .unwrap();

        let text = host.render_slot("tableView", &TemplateContext::new()).unwrap();
        assert_eq!(text, "north");
    }
}
