//! Standard plugins for the Gridwork data grid.
//!
//! Each plugin is a `PluginDeclaration` built by a constructor function.
//! State plugins (`*_state`) keep their snapshots in the host's input table
//! and reduce them through actions; `local_*` plugins derive row getters
//! from that state; the `table_*` plugins lift rows and columns into table
//! abstractions and render them as text.
//!
//! A typical grid mounts, in any declaration order:
//!
//! ```text
//! grid_core()
//! filtering_state(..)   local_filtering()
//! sorting_state(..)     local_sorting()
//! grouping_state(..)    local_grouping()
//! editing_state(..)
//! table_view(..)        table_header_row()      table_group_row()
//! ```

mod convert;
mod editing_state;
mod filtering_state;
mod grid_core;
mod grouping_state;
mod local_filtering;
mod local_grouping;
mod local_sorting;
mod sorting_state;
mod table_group_row;
mod table_header_row;
mod table_view;

pub use editing_state::editing_state;
pub use filtering_state::filtering_state;
pub use grid_core::grid_core;
pub use grouping_state::grouping_state;
pub use local_filtering::local_filtering;
pub use local_grouping::{group_key, local_grouping};
pub use local_sorting::local_sorting;
pub use sorting_state::sorting_state;
pub use table_group_row::table_group_row;
pub use table_header_row::table_header_row;
pub use table_view::{table_view, TableViewOptions};
