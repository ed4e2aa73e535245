//! Action registry and dispatch chains.
//!
//! An action is a named side-effecting operation. Each plugin may contribute
//! a handler to a named chain; dispatch enters the earliest-declared handler
//! and every handler receives a `next` continuation bound to the next-later
//! contributor (a no-op past the end). A handler that does not call `next`
//! stops the rest of the chain.
//!
//! The registry wires call order only; all side effects flow through the
//! `ActionContext` as deferred state effects.

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::context::ActionContext;
use crate::types::{ActionFn, SlotName};

/// One plugin's handler in an action chain.
struct ActionContributor {
    plugin: String,
    position: usize,
    f: ActionFn,
}

/// Continuation bound to the rest of an action chain.
///
/// Calling it runs the next-later contributor's handler with whatever
/// payload it is given — unchanged, transformed, or repeatedly. Not calling
/// it swallows the rest of the chain.
pub struct NextAction<'a> {
    contributors: &'a [Arc<ActionContributor>],
    index: usize,
    ctx: &'a ActionContext<'a>,
}

impl NextAction<'_> {
    /// Run the rest of the chain with the given payload.
    pub fn call(&self, payload: &Value) {
        run_from(self.contributors, self.index, payload, self.ctx);
    }
}

fn run_from(
    contributors: &[Arc<ActionContributor>],
    index: usize,
    payload: &Value,
    ctx: &ActionContext<'_>,
) {
    // Terminal no-op past the last contributor.
    let Some(contributor) = contributors.get(index) else {
        return;
    };
    let next = NextAction {
        contributors,
        index: index + 1,
        ctx,
    };
    (contributor.f)(payload, ctx, &next);
}

/// Registry of action chains, keyed by slot name.
pub struct ActionRegistry {
    chains: RwLock<HashMap<SlotName, Vec<Arc<ActionContributor>>>>,
}

impl ActionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            chains: RwLock::new(HashMap::new()),
        }
    }

    /// Register a handler at the given resolved plugin position.
    pub fn register(&self, name: impl Into<SlotName>, position: usize, plugin: &str, f: ActionFn) {
        let name = name.into();
        let mut chains = self.chains.write();
        let chain = chains.entry(name.clone()).or_default();
        chain.push(Arc::new(ActionContributor {
            plugin: plugin.to_string(),
            position,
            f,
        }));
        chain.sort_by_key(|c| c.position);
        tracing::debug!(
            "Registered action '{}' from plugin '{}' (chain length {})",
            name,
            plugin,
            chain.len()
        );
    }

    /// Remove all chains.
    pub fn clear(&self) {
        self.chains.write().clear();
    }

    /// Whether any plugin handles the named action.
    pub fn has_chain(&self, name: &SlotName) -> bool {
        self.chains.read().contains_key(name)
    }

    /// Names of plugins handling the named action, in chain order.
    pub fn contributors(&self, name: &SlotName) -> Vec<String> {
        self.chains
            .read()
            .get(name)
            .map(|chain| chain.iter().map(|c| c.plugin.clone()).collect())
            .unwrap_or_default()
    }

    /// Dispatch an action through its chain.
    ///
    /// Dispatching an unclaimed name is a no-op and returns `false`.
    pub fn dispatch(&self, name: &SlotName, payload: &Value, ctx: &ActionContext<'_>) -> bool {
        let chain = { self.chains.read().get(name).cloned() };
        match chain {
            Some(chain) if !chain.is_empty() => {
                run_from(&chain, 0, payload, ctx);
                true
            }
            _ => {
                tracing::debug!("Action '{}' has no handlers; dispatch is a no-op", name);
                false
            }
        }
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
