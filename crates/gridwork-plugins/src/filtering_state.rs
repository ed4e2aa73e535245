//! Filtering state plugin.
//!
//! Keeps the `filters` spec in the host's input table and reduces it through
//! the `changeColumnFilter` action: a string payload upserts the column's
//! filter, a null payload removes it.

use gridwork_core::Filter;
use gridwork_plugin_api::PluginDeclaration;

use crate::convert::{list, to_array};

/// Filtering state, seeded with an initial spec.
pub fn filtering_state(initial: Vec<Filter>) -> PluginDeclaration {
    let initial_value = to_array(&initial);

    PluginDeclaration::new("FilteringState")
        .getter("filters", move |acc, _ctx| {
            if acc.is_null() {
                initial_value.clone()
            } else {
                (*acc).clone()
            }
        })
        .action("changeColumnFilter", |payload, ctx, next| {
            let Some(column_name) = payload["columnName"].as_str() else {
                next.call(payload);
                return;
            };

            let mut filters: Vec<Filter> = list(&ctx.get_value("filters"));
            filters.retain(|filter| filter.column_name != column_name);
            if let Some(value) = payload["value"].as_str() {
                filters.push(Filter::new(column_name, value));
            }

            ctx.set_input("filters", to_array(&filters));
            next.call(payload);
        })
}
