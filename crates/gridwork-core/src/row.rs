//! Row and Column types for grid data.
//!
//! Rows are plain JSON objects supplied by the data layer; the grid never
//! assumes a schema beyond the column names it is asked to display. Table
//! plugins lift rows and columns into `TableRow` / `TableColumn`, which carry
//! the kind tag the render layer dispatches on.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A data row. Rows are schemaless JSON objects owned by the data layer.
pub type Row = Value;

/// A grid column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Field name used to read cell values from rows.
    pub name: String,

    /// Display title. Falls back to `name` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Column {
    /// Create a column reading the given row field.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
        }
    }

    /// Set the display title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// The text shown in heading cells.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }
}

/// Read a cell value from a row by column name.
///
/// Returns `Value::Null` for missing fields and non-object rows.
pub fn cell_value(row: &Row, column_name: &str) -> Value {
    row.get(column_name).cloned().unwrap_or(Value::Null)
}

/// Derive a stable key for a row.
///
/// Uses the row's `id` field when present, the row's position otherwise.
pub fn row_key(row: &Row, index: usize) -> String {
    match row.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => format!("row:{}", index),
    }
}

/// Kind tag for a table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    /// A data row from the data layer.
    Data,
    /// A heading row describing the columns.
    Heading,
    /// A group header row introduced by grouping.
    Group,
}

/// A row as the table layer sees it.
///
/// Data rows wrap the original row object; group rows carry a
/// `{ groupKey, columnName, value }` bag instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    /// Row kind, dispatched on by templates.
    #[serde(rename = "type")]
    pub kind: RowKind,

    /// The underlying row object (or group bag for group rows).
    pub row: Value,

    /// Stable key for memoization and expansion tracking.
    pub key: String,
}

impl TableRow {
    /// Wrap a data row.
    pub fn data(row: Row, key: impl Into<String>) -> Self {
        Self {
            kind: RowKind::Data,
            row,
            key: key.into(),
        }
    }

    /// The heading row. There is at most one per table.
    pub fn heading() -> Self {
        Self {
            kind: RowKind::Heading,
            row: Value::Null,
            key: "heading".to_string(),
        }
    }

    /// A group header row for the given column/value pair.
    pub fn group(column_name: &str, value: &Value, group_key: &str) -> Self {
        Self {
            kind: RowKind::Group,
            row: serde_json::json!({
                "groupKey": group_key,
                "columnName": column_name,
                "value": value,
            }),
            key: format!("group:{}", group_key),
        }
    }
}

/// Kind tag for a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// A column backed by a grid `Column`.
    Data,
    /// The indent column grouping prepends.
    Indent,
}

/// A column as the table layer sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableColumn {
    /// Column kind, dispatched on by templates.
    #[serde(rename = "type")]
    pub kind: ColumnKind,

    /// The backing column. Absent for indent columns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<Column>,
}

impl TableColumn {
    /// Wrap a data column.
    pub fn data(column: Column) -> Self {
        Self {
            kind: ColumnKind::Data,
            column: Some(column),
        }
    }

    /// The group indent column.
    pub fn indent() -> Self {
        Self {
            kind: ColumnKind::Indent,
            column: None,
        }
    }
}
