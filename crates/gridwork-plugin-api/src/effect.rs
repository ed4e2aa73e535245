//! Effect-based state mutation.
//!
//! Action handlers never write host inputs directly. They push effects into
//! a collector, and the host applies the collected effects after the whole
//! dispatch chain has returned. Getters resolved during a dispatch therefore
//! see the pre-dispatch snapshot; the new snapshot exists only once the
//! dispatch completes.

use parking_lot::Mutex;
use serde_json::Value;

use crate::types::SlotName;

/// A deferred state mutation produced by an action handler.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Replace the named external input with a new snapshot.
    SetInput { name: SlotName, value: Value },
}

/// Collects effects during one action dispatch.
pub struct EffectCollector {
    effects: Mutex<Vec<Effect>>,
}

impl EffectCollector {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self {
            effects: Mutex::new(Vec::new()),
        }
    }

    /// Record an effect.
    pub fn push(&self, effect: Effect) {
        self.effects.lock().push(effect);
    }

    /// Take all collected effects, in the order they were recorded.
    pub fn drain(&self) -> Vec<Effect> {
        std::mem::take(&mut *self.effects.lock())
    }

    /// Number of effects collected so far.
    pub fn len(&self) -> usize {
        self.effects.lock().len()
    }

    /// Whether no effects were collected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EffectCollector {
    fn default() -> Self {
        Self::new()
    }
}
