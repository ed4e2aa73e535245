//! Table view plugin.
//!
//! Lifts the grid's rows and columns into the table abstractions
//! (`tableColumns`, `tableBodyRows`, `tableRows`) and supplies the base
//! templates for the `tableView`, `tableViewRow`, and `tableViewCell` slots.
//! Feature plugins extend the getters and override the templates; the base
//! renders plain text, one line per table row.

use serde_json::Value;

use gridwork_core::{cell_value, row_key, AppearanceConfig, Column, RowKind, TableColumn, TableRow};
use gridwork_plugin_api::PluginDeclaration;

use crate::convert::{list, to_array, to_value, value_text};

/// Rendering options for the table view.
#[derive(Debug, Clone)]
pub struct TableViewOptions {
    /// Separator between cells in a rendered row.
    pub column_separator: String,
}

impl Default for TableViewOptions {
    fn default() -> Self {
        Self {
            column_separator: " | ".to_string(),
        }
    }
}

impl From<&AppearanceConfig> for TableViewOptions {
    fn from(appearance: &AppearanceConfig) -> Self {
        Self {
            column_separator: appearance.column_separator.clone(),
        }
    }
}

/// The table rendering plugin.
pub fn table_view(options: TableViewOptions) -> PluginDeclaration {
    let separator = options.column_separator;

    PluginDeclaration::new("TableView")
        .getter("tableColumns", |_acc, ctx| {
            let columns: Vec<Column> = list(&ctx.get("columns"));
            let table_columns: Vec<TableColumn> =
                columns.into_iter().map(TableColumn::data).collect();
            to_array(&table_columns)
        })
        .getter("tableBodyRows", |_acc, ctx| {
            let rows = ctx.get("rows");
            let table_rows: Vec<TableRow> = rows
                .as_array()
                .map(|rows| {
                    rows.iter()
                        .enumerate()
                        .map(|(index, row)| TableRow::data(row.clone(), row_key(row, index)))
                        .collect()
                })
                .unwrap_or_default();
            to_array(&table_rows)
        })
        .getter("tableRows", |_acc, ctx| {
            let mut rows: Vec<Value> = ctx
                .get("tableHeaderRows")
                .as_array()
                .cloned()
                .unwrap_or_default();
            rows.extend(ctx.get("tableBodyRows").as_array().cloned().unwrap_or_default());
            Value::Array(rows)
        })
        .template("tableView", |ctx, scope| {
            let table_rows = scope.value("tableRows");
            let table_columns = scope.value("tableColumns");
            let rows = match table_rows.as_array() {
                Some(rows) => rows,
                None => return String::new(),
            };

            let lines: Vec<String> = rows
                .iter()
                .map(|row| {
                    let row_ctx = ctx
                        .clone()
                        .with("tableRow", row.clone())
                        .with("tableColumns", (*table_columns).clone());
                    scope.slot("tableViewRow", &row_ctx)
                })
                .collect();
            lines.join("\n")
        })
        .template("tableViewRow", move |ctx, scope| {
            let Some(row) = ctx.field::<TableRow>("tableRow") else {
                return String::new();
            };
            let columns: Vec<TableColumn> = ctx.field("tableColumns").unwrap_or_default();
            let row_value = ctx.get("tableRow").cloned().unwrap_or(Value::Null);

            let cells: Vec<String> = columns
                .iter()
                .map(|table_column| {
                    let value = match (&row.kind, &table_column.column) {
                        (RowKind::Data, Some(column)) => cell_value(&row.row, &column.name),
                        _ => Value::Null,
                    };
                    let cell_ctx = ctx
                        .clone()
                        .with("tableRow", row_value.clone())
                        .with("tableColumn", to_value(table_column))
                        .with("value", value);
                    scope.slot("tableViewCell", &cell_ctx)
                })
                .collect();
            cells.join(&separator)
        })
        .template("tableViewCell", |ctx, _scope| {
            ctx.get("value").map(value_text).unwrap_or_default()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridwork_plugin_api::{PluginHost, TemplateContext};
    use serde_json::json;

    fn host() -> PluginHost {
        let host = PluginHost::new();
        host.set_input(
            "rows",
            json!([
                { "id": 0, "region": "north", "amount": 40 },
                { "id": 1, "region": "south", "amount": 65 },
            ]),
        );
        host.set_input(
            "columns",
            json!([
                { "name": "region", "title": "Region" },
                { "name": "amount" },
            ]),
        );
        host.mount(vec![table_view(TableViewOptions::default())]).unwrap();
        host
    }

    #[test]
    fn test_table_columns_getter() {
        let host = host();
        let columns: Vec<TableColumn> = list(&host.get_value("tableColumns").unwrap());
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].column.as_ref().unwrap().name, "region");
    }

    #[test]
    fn test_table_body_rows_getter() {
        let host = host();
        let rows: Vec<TableRow> = list(&host.get_value("tableBodyRows").unwrap());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].kind, RowKind::Data);
        assert_eq!(rows[0].key, "0");
    }

    #[test]
    fn test_table_rows_without_header_plugin() {
        let host = host();
        // No header plugin mounted: tableHeaderRows is unclaimed.
        let rows: Vec<TableRow> = list(&host.get_value("tableRows").unwrap());
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_render_table_text() {
        let host = host();
        let text = host.render_slot("tableView", &TemplateContext::new()).unwrap();
        assert_eq!(text, "north | 40\nsouth | 65");
    }

    #[test]
    fn test_custom_separator() {
        let host = PluginHost::new();
        host.set_input("rows", json!([{ "a": 1, "b": 2 }]));
        host.set_input("columns", json!([{ "name": "a" }, { "name": "b" }]));
        host.mount(vec![table_view(TableViewOptions {
            column_separator: " / ".to_string(),
        })])
        .unwrap();

        let text = host.render_slot("tableView", &TemplateContext::new()).unwrap();
        assert_eq!(text, "1 / 2");
    }
}
