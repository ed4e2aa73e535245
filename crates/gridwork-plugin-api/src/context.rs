//! Contexts handed to plugin contributions.
//!
//! Each contribution kind gets a context scoped to what it may do:
//!
//! | Contribution | Context | Capabilities |
//! |--------------|---------------------|--------------------------------------|
//! | getter       | `GetterContext`     | read other getters                   |
//! | action       | `ActionContext`     | read getters, emit state effects     |
//! | template     | `TemplateContext`   | named render arguments (data only)   |
//!
//! Getter reads are always mediated by the host's registries; plugins never
//! hold references to each other.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::sync::Arc;

use crate::effect::{Effect, EffectCollector};
use crate::engine::ObservableInputs;
use crate::getters::{DepVersion, GetterRegistry, ResolveSession};
use crate::types::SlotName;

// =============================================================================
// Getter Context
// =============================================================================

/// Read access to the other getters, handed to getter contributions.
///
/// Every read is recorded against the fold in progress so the memoization
/// layer knows what to revalidate. Reads are cycle-checked: reading a getter
/// that is currently being folded fails the whole resolution.
pub struct GetterContext<'a> {
    registry: &'a GetterRegistry,
    inputs: &'a ObservableInputs,
    session: &'a ResolveSession,
    deps: &'a RefCell<Vec<DepVersion>>,
}

impl<'a> GetterContext<'a> {
    pub(crate) fn new(
        registry: &'a GetterRegistry,
        inputs: &'a ObservableInputs,
        session: &'a ResolveSession,
        deps: &'a RefCell<Vec<DepVersion>>,
    ) -> Self {
        Self {
            registry,
            inputs,
            session,
            deps,
        }
    }

    /// Read another getter's current value.
    ///
    /// Unclaimed names read the external input (or `Null`). On a cyclic
    /// read the error is recorded against the pass and `Null` is returned;
    /// the enclosing resolution discards the fold and fails.
    pub fn get(&self, name: impl Into<SlotName>) -> Arc<Value> {
        let name = name.into();
        match self.registry.resolve_in_session(&name, self.inputs, self.session) {
            Ok(value) => {
                self.registry.record_read(&name, self.inputs, self.deps);
                value
            }
            Err(error) => {
                self.session.record_error(error);
                Arc::new(Value::Null)
            }
        }
    }
}

// =============================================================================
// Action Context
// =============================================================================

/// Context handed to action handlers.
///
/// Handlers read getters and emit state effects; they never mutate inputs
/// directly. Effects become visible only after the dispatch returns.
pub struct ActionContext<'a> {
    getters: &'a GetterRegistry,
    inputs: &'a ObservableInputs,
    effects: &'a EffectCollector,
}

impl<'a> ActionContext<'a> {
    pub(crate) fn new(
        getters: &'a GetterRegistry,
        inputs: &'a ObservableInputs,
        effects: &'a EffectCollector,
    ) -> Self {
        Self {
            getters,
            inputs,
            effects,
        }
    }

    /// Read a getter's current value (the pre-dispatch snapshot).
    pub fn get_value(&self, name: impl Into<SlotName>) -> Arc<Value> {
        let name = name.into();
        match self.getters.resolve(name.clone(), self.inputs) {
            Ok(value) => value,
            Err(error) => {
                tracing::error!("Getter '{}' failed during action dispatch: {}", name, error);
                Arc::new(Value::Null)
            }
        }
    }

    /// Replace a named input with a new snapshot once the dispatch returns.
    pub fn set_input(&self, name: impl Into<SlotName>, value: Value) {
        self.effects.push(Effect::SetInput {
            name: name.into(),
            value,
        });
    }
}

// =============================================================================
// Template Context
// =============================================================================

/// The named-argument bag passed into a template render call.
///
/// The bag is owned by no plugin and keeps a consistent shape across a
/// chain: overrides read the same fields the base renderer does (`tableRow`,
/// `tableColumn`, `value`, ...). Fields are plain JSON values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateContext {
    fields: Map<String, Value>,
}

impl TemplateContext {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named field.
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Read a field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Read and deserialize a field.
    ///
    /// Returns `None` when the field is absent or has the wrong shape.
    pub fn field<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.fields
            .get(key)
            .cloned()
            .and_then(|value| serde_json::from_value(value).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_template_context_fields() {
        let ctx = TemplateContext::new()
            .with("value", json!("north"))
            .with("tableRow", json!({ "type": "data", "row": { "id": 1 }, "key": "1" }));

        assert_eq!(ctx.get("value"), Some(&json!("north")));
        assert_eq!(ctx.get("missing"), None);

        let row: gridwork_core::TableRow = ctx.field("tableRow").unwrap();
        assert_eq!(row.kind, gridwork_core::RowKind::Data);
        assert!(ctx.field::<gridwork_core::TableRow>("value").is_none());
    }
}
