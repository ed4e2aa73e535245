//! Core types for the Gridwork data grid.
//!
//! This crate contains shared data structures that are used across all
//! Gridwork crates:
//! - Row and Column types plus the table-row abstractions built from them
//! - Grid state specs (sorting, filters, grouping)
//! - Configuration types
//! - Error types

mod config;
mod error;
mod row;
mod state;

pub use config::{
    config_dir, config_file_path, ensure_config_dir, load_config, load_config_from,
    AppearanceConfig, GridConfig, ThemeMode,
};
pub use error::ConfigError;
pub use row::{cell_value, row_key, Column, ColumnKind, Row, RowKind, TableColumn, TableRow};
pub use state::{Filter, Grouping, SortDirection, Sorting};
