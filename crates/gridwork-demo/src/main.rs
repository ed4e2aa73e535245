//! Gridwork demo - main entry point.
//!
//! Assembles a full grid from the standard plugins, feeds it a sample sales
//! data set, and walks through filtering, sorting, grouping, and editing by
//! dispatching the same actions a UI would.

use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use gridwork_core::{load_config, GridConfig, Sorting};
use gridwork_plugin_api::{HostResult, PluginDeclaration, PluginHost, TemplateContext};
use gridwork_plugins::{
    editing_state, filtering_state, grid_core, grouping_state, local_filtering, local_grouping,
    local_sorting, sorting_state, table_group_row, table_header_row, table_view, TableViewOptions,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(error) = run() {
        eprintln!("gridwork-demo: {}", error);
        std::process::exit(1);
    }
}

fn run() -> HostResult<()> {
    let config = load_config().unwrap_or_else(|error| {
        tracing::warn!("Falling back to default config: {}", error);
        GridConfig::default()
    });

    // The demo owns its data set; committed edits land here and are
    // re-supplied to the host as fresh inputs.
    let data: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(
        json!([
            { "id": 0, "region": "North", "product": "Piquant", "amount": 6550 },
            { "id": 1, "region": "South", "product": "Tofu", "amount": 4750 },
            { "id": 2, "region": "North", "product": "Tofu", "amount": 950 },
            { "id": 3, "region": "East", "product": "Piquant", "amount": 2250 },
            { "id": 4, "region": "South", "product": "Piquant", "amount": 1800 },
        ])
        .as_array()
        .cloned()
        .unwrap_or_default(),
    ));

    let host = PluginHost::new();
    host.set_input(
        "columns",
        json!([
            { "name": "region", "title": "Region" },
            { "name": "product", "title": "Product" },
            { "name": "amount", "title": "Amount" },
        ]),
    );
    host.set_input("rows", Value::Array(data.lock().map(|rows| rows.clone()).unwrap_or_default()));

    host.mount(plugin_set(&config, data.clone()))?;
    tracing::info!("Mounted plugins: [{}]", host.plugin_order().join(", "));

    let slot = TemplateContext::new();

    println!("== initial ==");
    println!("{}", host.render_slot("tableView", &slot)?);

    println!("\n== filter: product contains \"tofu\" ==");
    host.invoke_action(
        "changeColumnFilter",
        json!({ "columnName": "product", "value": "tofu" }),
    )?;
    println!("{}", host.render_slot("tableView", &slot)?);

    host.invoke_action("changeColumnFilter", json!({ "columnName": "product", "value": null }))?;

    println!("\n== sort: amount descending ==");
    host.invoke_action(
        "changeSort",
        json!({ "columnName": "amount", "direction": "desc" }),
    )?;
    println!("{}", host.render_slot("tableView", &slot)?);

    println!("\n== group by region, expand North ==");
    host.invoke_action("changeGrouping", json!({ "columnName": "region" }))?;
    host.invoke_action("toggleGroupExpanded", json!({ "groupKey": "region|North" }))?;
    println!("{}", host.render_slot("tableView", &slot)?);

    println!("\n== edit row 2 and commit ==");
    host.invoke_action("changeGrouping", json!({ "columnName": "region" }))?;
    host.invoke_action("startEditRows", json!({ "rowIds": ["2"] }))?;
    host.invoke_action(
        "changeRow",
        json!({ "rowId": "2", "change": { "amount": 1200 } }),
    )?;
    host.invoke_action("commitChanges", json!({}))?;
    // The commit callback updated the demo's data set; feed it back in.
    host.set_input("rows", Value::Array(data.lock().map(|rows| rows.clone()).unwrap_or_default()));
    println!("{}", host.render_slot("tableView", &slot)?);

    Ok(())
}

/// The full standard plugin set, in an intentionally shuffled declaration
/// order: the dependency resolver puts it right.
fn plugin_set(config: &GridConfig, data: Arc<Mutex<Vec<Value>>>) -> Vec<PluginDeclaration> {
    vec![
        table_group_row(),
        table_header_row(),
        table_view(TableViewOptions::from(&config.appearance)),
        local_grouping(),
        grouping_state(Vec::new(), Vec::new()),
        local_sorting(),
        sorting_state(Vec::<Sorting>::new()),
        local_filtering(),
        filtering_state(Vec::new()),
        editing_state(move |changes| {
            tracing::info!("Committing {} row change(s)", changes.len());
            let Ok(mut rows) = data.lock() else {
                return;
            };
            for (row_id, change) in changes {
                let Some(row) = rows
                    .iter_mut()
                    .find(|row| row["id"].to_string() == *row_id || row["id"] == json!(row_id))
                else {
                    continue;
                };
                if let (Some(row), Some(change)) = (row.as_object_mut(), change.as_object()) {
                    for (field, value) in change {
                        row.insert(field.clone(), value.clone());
                    }
                }
            }
        }),
        grid_core(),
    ]
}
