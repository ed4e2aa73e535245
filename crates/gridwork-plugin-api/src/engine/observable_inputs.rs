//! Observable external inputs with automatic change notifications.
//!
//! The key insight: mutation = notification. Every write that actually
//! changes an input also broadcasts the new state. Callers cannot mutate
//! without notifying.
//!
//! Inputs are the external side of the getter system: the data layer's rows
//! and columns, and the snapshots state plugins keep through effects. Each
//! slot carries a version counter; the memoization layer compares versions
//! instead of values to decide what to recompute.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;

use crate::types::SlotName;

/// One input slot: the current snapshot and its version.
struct InputSlot {
    value: Arc<Value>,
    version: u64,
}

/// Input name/version pair sent to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    /// Input slot name.
    pub name: String,

    /// Version, bumped on every effective write.
    pub version: u64,
}

/// Named external inputs that automatically broadcast changes.
///
/// Writing an equal value is a no-op: the version stays put, no broadcast is
/// sent, and every getter cache keyed on this slot stays valid.
///
/// ## Thread Safety
///
/// Uses `parking_lot::RwLock` for the slot table (never poisons) and
/// `tokio::sync::watch` for broadcasts. Multiple threads can read
/// concurrently; writes are exclusive.
pub struct ObservableInputs {
    inner: RwLock<HashMap<SlotName, InputSlot>>,
    tx: watch::Sender<Vec<InputState>>,
    rx: watch::Receiver<Vec<InputState>>,
}

impl ObservableInputs {
    /// Create an empty input table.
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(Vec::new());
        Self {
            inner: RwLock::new(HashMap::new()),
            tx,
            rx,
        }
    }

    // =========================================================================
    // Mutation (broadcasts on effective change)
    // =========================================================================

    /// Set an input to a new snapshot.
    ///
    /// Returns `true` if the value changed. Broadcasts the new state only on
    /// an effective change; writing an equal value keeps the version.
    pub fn set(&self, name: impl Into<SlotName>, value: Value) -> bool {
        let name = name.into();
        let states = {
            let mut inner = self.inner.write();
            match inner.get_mut(&name) {
                Some(slot) if *slot.value == value => {
                    tracing::debug!("Input '{}' unchanged at version {}", name, slot.version);
                    return false;
                }
                Some(slot) => {
                    slot.value = Arc::new(value);
                    slot.version += 1;
                    tracing::debug!("Input '{}' updated to version {}", name, slot.version);
                }
                None => {
                    inner.insert(
                        name.clone(),
                        InputSlot {
                            value: Arc::new(value),
                            version: 1,
                        },
                    );
                    tracing::debug!("Input '{}' created at version 1", name);
                }
            }
            snapshot(&inner)
        };
        let _ = self.tx.send(states);
        true
    }

    /// Remove all inputs.
    ///
    /// Broadcasts the new (empty) state.
    pub fn clear(&self) {
        self.inner.write().clear();
        let _ = self.tx.send(Vec::new());
    }

    // =========================================================================
    // Read Methods
    // =========================================================================

    /// Get the current snapshot for an input.
    pub fn get(&self, name: &SlotName) -> Option<Arc<Value>> {
        self.inner.read().get(name).map(|slot| slot.value.clone())
    }

    /// Get the current snapshot, or `Value::Null` for an absent input.
    pub fn value_or_null(&self, name: &SlotName) -> Arc<Value> {
        self.get(name).unwrap_or_else(|| Arc::new(Value::Null))
    }

    /// Get the snapshot and version together. Absent inputs read as
    /// `(Null, 0)`, so creating the slot later invalidates dependents.
    pub fn get_with_version(&self, name: &SlotName) -> (Arc<Value>, u64) {
        let inner = self.inner.read();
        match inner.get(name) {
            Some(slot) => (slot.value.clone(), slot.version),
            None => (Arc::new(Value::Null), 0),
        }
    }

    /// Current version of an input. Absent inputs are version 0.
    pub fn version(&self, name: &SlotName) -> u64 {
        self.inner.read().get(name).map(|slot| slot.version).unwrap_or(0)
    }

    /// Number of inputs that have been set.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Whether no inputs have been set.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Get a snapshot of the current input states, sorted by name.
    pub fn states(&self) -> Vec<InputState> {
        snapshot(&self.inner.read())
    }

    // =========================================================================
    // Subscription
    // =========================================================================

    /// Subscribe to input changes.
    ///
    /// The receiver gets the current state immediately and every effective
    /// change after that. Clone the receiver for multiple subscribers.
    pub fn subscribe(&self) -> watch::Receiver<Vec<InputState>> {
        self.rx.clone()
    }
}

impl Default for ObservableInputs {
    fn default() -> Self {
        Self::new()
    }
}

/// Sorted name/version snapshot of the slot table.
fn snapshot(inner: &HashMap<SlotName, InputSlot>) -> Vec<InputState> {
    let mut states: Vec<InputState> = inner
        .iter()
        .map(|(name, slot)| InputState {
            name: name.to_string(),
            version: slot.version,
        })
        .collect();
    states.sort_by(|a, b| a.name.cmp(&b.name));
    states
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_broadcasts() {
        let inputs = ObservableInputs::new();
        let rx = inputs.subscribe();
        assert!(rx.borrow().is_empty());

        assert!(inputs.set("rows", json!([{ "id": 0 }])));

        let states = rx.borrow().clone();
        assert_eq!(states.len(), 1);
        assert_eq!(states[0].name, "rows");
        assert_eq!(states[0].version, 1);
    }

    #[test]
    fn test_set_equal_value_keeps_version() {
        let inputs = ObservableInputs::new();
        inputs.set("rows", json!([1, 2]));
        assert_eq!(inputs.version(&"rows".into()), 1);

        // Writing the same snapshot again is a no-op.
        assert!(!inputs.set("rows", json!([1, 2])));
        assert_eq!(inputs.version(&"rows".into()), 1);

        assert!(inputs.set("rows", json!([1, 2, 3])));
        assert_eq!(inputs.version(&"rows".into()), 2);
    }

    #[test]
    fn test_absent_input_reads_null_version_zero() {
        let inputs = ObservableInputs::new();
        let name: SlotName = "missing".into();
        assert_eq!(inputs.version(&name), 0);
        assert_eq!(*inputs.value_or_null(&name), Value::Null);

        let (value, version) = inputs.get_with_version(&name);
        assert_eq!(*value, Value::Null);
        assert_eq!(version, 0);
    }

    #[test]
    fn test_states_sorted_by_name() {
        let inputs = ObservableInputs::new();
        inputs.set("sorting", json!([]));
        inputs.set("columns", json!([]));
        inputs.set("rows", json!([]));

        let names: Vec<String> = inputs.states().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["columns", "rows", "sorting"]);
    }

    #[test]
    fn test_clear_broadcasts_empty() {
        let inputs = ObservableInputs::new();
        let rx = inputs.subscribe();
        inputs.set("rows", json!([]));
        assert_eq!(rx.borrow().len(), 1);

        inputs.clear();
        assert!(rx.borrow().is_empty());
        assert!(inputs.is_empty());
    }
}
