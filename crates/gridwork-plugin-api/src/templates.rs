//! Template registry and render chains.
//!
//! A template is a named render slot. The base renderer for a slot is its
//! first-declared contributor (typically the plugin that introduces the
//! slot); every later contributor is an override that receives a
//! continuation rendering the chain built so far.
//!
//! ## Wrap Order
//!
//! The last-registered override wraps outermost. With a base rendering "X"
//! and two overrides each rendering `"[" + rest + "]"`, the slot renders
//! "[[X]]". An override may also replace the chain entirely (ignore the
//! continuation) or render conditionally on the context, falling through to
//! the continuation for everything it does not own.

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::context::TemplateContext;
use crate::engine::ObservableInputs;
use crate::getters::GetterRegistry;
use crate::types::{SlotName, TemplateFn};

/// One plugin's override in a template chain.
struct TemplateContributor {
    plugin: String,
    position: usize,
    f: TemplateFn,
}

/// Render scope handed to a template contribution.
///
/// Lets the contribution render the rest of its own chain, render nested
/// slots, and read getter values — all mediated by the host's registries.
pub struct TemplateScope<'a> {
    registry: &'a TemplateRegistry,
    getters: &'a GetterRegistry,
    inputs: &'a ObservableInputs,
    chain: &'a [Arc<TemplateContributor>],
    index: usize,
    fallback: &'a str,
}

impl TemplateScope<'_> {
    /// Render the chain below this override.
    ///
    /// For the base contributor this is the caller-supplied fallback.
    pub fn rest(&self, ctx: &TemplateContext) -> String {
        if self.index == 0 {
            self.fallback.to_string()
        } else {
            self.registry.render_contributor(
                self.chain,
                self.index - 1,
                ctx,
                self.fallback,
                self.getters,
                self.inputs,
            )
        }
    }

    /// Render another named slot with its full chain.
    ///
    /// Unclaimed slots render as the empty string.
    pub fn slot(&self, name: impl Into<SlotName>, ctx: &TemplateContext) -> String {
        self.registry
            .render_or(&name.into(), ctx, "", self.getters, self.inputs)
    }

    /// Read a getter's current value.
    pub fn value(&self, name: impl Into<SlotName>) -> Arc<Value> {
        let name = name.into();
        match self.getters.resolve(name.clone(), self.inputs) {
            Ok(value) => value,
            Err(error) => {
                tracing::error!("Getter '{}' failed during render: {}", name, error);
                Arc::new(Value::Null)
            }
        }
    }
}

/// Registry of template chains, keyed by slot name.
pub struct TemplateRegistry {
    chains: RwLock<HashMap<SlotName, Vec<Arc<TemplateContributor>>>>,
}

impl TemplateRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            chains: RwLock::new(HashMap::new()),
        }
    }

    /// Register an override at the given resolved plugin position.
    pub fn register(&self, name: impl Into<SlotName>, position: usize, plugin: &str, f: TemplateFn) {
        let name = name.into();
        let mut chains = self.chains.write();
        let chain = chains.entry(name.clone()).or_default();
        chain.push(Arc::new(TemplateContributor {
            plugin: plugin.to_string(),
            position,
            f,
        }));
        chain.sort_by_key(|c| c.position);
        tracing::debug!(
            "Registered template '{}' from plugin '{}' (chain length {})",
            name,
            plugin,
            chain.len()
        );
    }

    /// Remove all chains.
    pub fn clear(&self) {
        self.chains.write().clear();
    }

    /// Whether any plugin renders the named slot.
    pub fn has_chain(&self, name: &SlotName) -> bool {
        self.chains.read().contains_key(name)
    }

    /// Names of plugins rendering the named slot, in chain order.
    pub fn contributors(&self, name: &SlotName) -> Vec<String> {
        self.chains
            .read()
            .get(name)
            .map(|chain| chain.iter().map(|c| c.plugin.clone()).collect())
            .unwrap_or_default()
    }

    /// Render a slot, or `None` when no plugin claims it.
    pub fn render(
        &self,
        name: &SlotName,
        ctx: &TemplateContext,
        getters: &GetterRegistry,
        inputs: &ObservableInputs,
    ) -> Option<String> {
        let chain = { self.chains.read().get(name).cloned() }?;
        if chain.is_empty() {
            return None;
        }
        Some(self.render_contributor(&chain, chain.len() - 1, ctx, "", getters, inputs))
    }

    /// Render a slot, falling back to the caller's value for unclaimed
    /// names. The fallback is also what the base contributor's continuation
    /// renders.
    pub fn render_or(
        &self,
        name: &SlotName,
        ctx: &TemplateContext,
        fallback: &str,
        getters: &GetterRegistry,
        inputs: &ObservableInputs,
    ) -> String {
        let chain = { self.chains.read().get(name).cloned() };
        match chain {
            Some(chain) if !chain.is_empty() => self.render_contributor(
                &chain,
                chain.len() - 1,
                ctx,
                fallback,
                getters,
                inputs,
            ),
            _ => fallback.to_string(),
        }
    }

    fn render_contributor(
        &self,
        chain: &[Arc<TemplateContributor>],
        index: usize,
        ctx: &TemplateContext,
        fallback: &str,
        getters: &GetterRegistry,
        inputs: &ObservableInputs,
    ) -> String {
        let scope = TemplateScope {
            registry: self,
            getters,
            inputs,
            chain,
            index,
            fallback,
        };
        (chain[index].f)(ctx, &scope)
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}
