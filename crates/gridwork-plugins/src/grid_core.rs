//! Grid core plugin.
//!
//! Normalizes the `rows` and `columns` inputs so every downstream plugin can
//! assume arrays. The data layer may feed nothing (before its first load) or
//! a non-array by mistake; both read as empty.

use serde_json::Value;

use gridwork_plugin_api::PluginDeclaration;

/// The root plugin every grid mounts first.
pub fn grid_core() -> PluginDeclaration {
    PluginDeclaration::new("GridCore")
        .getter("rows", |acc, _ctx| normalize_array(&acc))
        .getter("columns", |acc, _ctx| normalize_array(&acc))
}

fn normalize_array(value: &Value) -> Value {
    if value.is_array() {
        value.clone()
    } else {
        Value::Array(Vec::new())
    }
}
