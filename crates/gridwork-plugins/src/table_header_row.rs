//! Table header row plugin.
//!
//! Contributes the heading row to `tableHeaderRows` and overrides
//! `tableViewCell` for heading cells only: data and group cells fall through
//! to the rest of the chain. When sorting state is mounted the heading cell
//! shows the current sort indicator; the dependency is optional, so the
//! plugin works in grids without sorting.

use gridwork_core::{RowKind, Sorting, TableColumn, TableRow};
use gridwork_plugin_api::PluginDeclaration;

use crate::convert::{list, to_array};

/// Adds the heading row; requires `TableView`, orders after `SortingState`
/// when present.
pub fn table_header_row() -> PluginDeclaration {
    PluginDeclaration::new("TableHeaderRow")
        .requires("TableView")
        .optionally("SortingState")
        .getter("tableHeaderRows", |acc, _ctx| {
            let mut rows: Vec<TableRow> = list(&acc);
            rows.push(TableRow::heading());
            to_array(&rows)
        })
        .template("tableViewCell", |ctx, scope| {
            let is_heading = ctx
                .field::<TableRow>("tableRow")
                .map(|row| row.kind == RowKind::Heading)
                .unwrap_or(false);
            if !is_heading {
                return scope.rest(ctx);
            }

            let Some(column) = ctx
                .field::<TableColumn>("tableColumn")
                .and_then(|table_column| table_column.column)
            else {
                return scope.rest(ctx);
            };

            let sorting: Vec<Sorting> = list(&scope.value("sorting"));
            let indicator = sorting
                .iter()
                .find(|s| s.column_name == column.name)
                .map(|s| match s.direction {
                    gridwork_core::SortDirection::Asc => " ▲",
                    gridwork_core::SortDirection::Desc => " ▼",
                })
                .unwrap_or("");

            format!("{}{}", column.display_title(), indicator)
        })
}
