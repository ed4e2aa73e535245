//! Editing state plugin.
//!
//! Keeps row edit drafts (`editingRows`, `changedRows`) in the host's input
//! table. Edits never touch the data layer's rows; `commitChanges` hands the
//! accumulated changes to the externally supplied callback, which owns the
//! data set and decides how to apply them, then clears the drafts.

use serde_json::{Map, Value};
use std::sync::Arc;

use gridwork_plugin_api::PluginDeclaration;

use crate::convert::{list, to_array};

/// Editing state. `on_commit` receives a map of row key to merged change
/// object when `commitChanges` is dispatched.
pub fn editing_state(
    on_commit: impl Fn(&Map<String, Value>) + Send + Sync + 'static,
) -> PluginDeclaration {
    let on_commit: Arc<dyn Fn(&Map<String, Value>) + Send + Sync> = Arc::new(on_commit);

    PluginDeclaration::new("EditingState")
        .getter("editingRows", |acc, _ctx| {
            if acc.is_null() {
                Value::Array(Vec::new())
            } else {
                (*acc).clone()
            }
        })
        .getter("changedRows", |acc, _ctx| {
            if acc.is_null() {
                Value::Object(Map::new())
            } else {
                (*acc).clone()
            }
        })
        .action("startEditRows", |payload, ctx, next| {
            let mut editing: Vec<String> = list(&ctx.get_value("editingRows"));
            for key in list::<String>(&payload["rowIds"]) {
                if !editing.contains(&key) {
                    editing.push(key);
                }
            }
            ctx.set_input("editingRows", to_array(&editing));
            next.call(payload);
        })
        .action("stopEditRows", |payload, ctx, next| {
            let stopped: Vec<String> = list(&payload["rowIds"]);
            let mut editing: Vec<String> = list(&ctx.get_value("editingRows"));
            editing.retain(|key| !stopped.contains(key));
            ctx.set_input("editingRows", to_array(&editing));
            next.call(payload);
        })
        .action("changeRow", |payload, ctx, next| {
            let Some(row_id) = payload["rowId"].as_str() else {
                next.call(payload);
                return;
            };
            let Some(change) = payload["change"].as_object() else {
                next.call(payload);
                return;
            };

            let mut changed = ctx
                .get_value("changedRows")
                .as_object()
                .cloned()
                .unwrap_or_default();
            let draft = changed
                .entry(row_id.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Some(draft) = draft.as_object_mut() {
                for (field, value) in change {
                    draft.insert(field.clone(), value.clone());
                }
            }

            ctx.set_input("changedRows", Value::Object(changed));
            next.call(payload);
        })
        .action("commitChanges", move |payload, ctx, next| {
            let changed = ctx
                .get_value("changedRows")
                .as_object()
                .cloned()
                .unwrap_or_default();
            tracing::debug!("Committing {} changed row(s)", changed.len());
            on_commit(&changed);

            ctx.set_input("changedRows", Value::Object(Map::new()));
            ctx.set_input("editingRows", Value::Array(Vec::new()));
            next.call(payload);
        })
}
