//! Plugin Host
//!
//! The PluginHost orchestrates the composition engine:
//! - Dependency resolution over the declared plugin set
//! - Chain installation in resolved plugin order
//! - Getter resolution, action dispatch, and template rendering
//! - Effect application after each dispatch
//!
//! ## Update Flow
//!
//! ```text
//! Data layer sets inputs          UI event
//!        │                            │
//!        ▼                            ▼
//! ┌──────────────────┐       ┌─────────────────┐
//! │ ObservableInputs │       │ invoke_action   │
//! │ (versioned)      │       │ (handler chain) │
//! └────────┬─────────┘       └────────┬────────┘
//!          │                          │ effects
//!          │                          ▼
//!          │                  inputs updated,
//!          │                  versions bumped
//!          └────────┬─────────────────┘
//!                   ▼
//!          get_value (memoized fold)
//!                   │
//!                   ▼
//!          render_slot (template chains)
//! ```
//!
//! ## Lifecycle
//!
//! `Uninitialized → Mounting → Resolved → Active → Unmounted`. Every mount
//! re-runs the dependency resolver in full; plugin sets change rarely
//! relative to getter and action traffic, so there is no incremental
//! re-resolution. A failed mount aborts: the host stays unusable and the
//! error names the plugin and dependency involved.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::watch;
use uuid::Uuid;

use crate::context::{ActionContext, TemplateContext};
use crate::effect::{Effect, EffectCollector};
use crate::error::{HostError, HostResult};
use crate::registry::PluginRegistry;
use crate::resolver::resolve_order;
use crate::types::{PluginDeclaration, SlotName};

mod observable_inputs;

pub use observable_inputs::{InputState, ObservableInputs};

// =============================================================================
// Host Phase
// =============================================================================

/// Lifecycle phase of a plugin host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostPhase {
    /// No mount attempted yet.
    Uninitialized,
    /// A declaration set is being collected and resolved.
    Mounting,
    /// Dependency order computed, chains installed.
    Resolved,
    /// Serving resolve/dispatch/render.
    Active,
    /// Chains torn down.
    Unmounted,
}

/// Host state snapshot sent to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostSnapshot {
    /// Current lifecycle phase.
    pub phase: HostPhase,

    /// Plugin names in resolved order (empty unless resolved).
    pub plugin_order: Vec<String>,
}

// =============================================================================
// Plugin Host
// =============================================================================

/// The PluginHost owns the registries and the external input table for one
/// mounted grid instance.
///
/// ## Reactive State
///
/// The lifecycle is observable: subscribe to phase changes via
/// `subscribe()`, and to input changes via `subscribe_inputs()`. All
/// mutations broadcast automatically.
pub struct PluginHost {
    /// Instance id carried in log output.
    id: Uuid,

    /// Plugin registry containing all chain sub-registries.
    registry: Arc<PluginRegistry>,

    /// External inputs (versioned, observable).
    inputs: ObservableInputs,

    /// Current lifecycle phase.
    phase: RwLock<HostPhase>,

    tx: watch::Sender<HostSnapshot>,
    rx: watch::Receiver<HostSnapshot>,
}

impl PluginHost {
    /// Create an unmounted host.
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(HostSnapshot {
            phase: HostPhase::Uninitialized,
            plugin_order: Vec::new(),
        });
        Self {
            id: Uuid::new_v4(),
            registry: Arc::new(PluginRegistry::new()),
            inputs: ObservableInputs::new(),
            phase: RwLock::new(HostPhase::Uninitialized),
            tx,
            rx,
        }
    }

    /// Instance id for log correlation.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The plugin registry (chain sub-registries and metadata).
    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// The external input table.
    pub fn inputs(&self) -> &ObservableInputs {
        &self.inputs
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Mount a declaration set.
    ///
    /// Resolves dependency order, installs every contribution at its
    /// resolved position, and activates the host. Mounting again replaces
    /// the previous set wholesale; external inputs are kept.
    ///
    /// On a resolution error the mount is aborted: no chains are installed
    /// and the host is not usable.
    pub fn mount(&self, declarations: Vec<PluginDeclaration>) -> HostResult<()> {
        self.set_phase(HostPhase::Mounting);

        let order = match resolve_order(&declarations) {
            Ok(order) => order,
            Err(error) => {
                tracing::error!(host = %self.id, "Mount aborted: {}", error);
                self.registry.clear();
                self.set_phase(HostPhase::Uninitialized);
                return Err(error.into());
            }
        };

        self.registry.install(declarations, &order);
        self.set_phase(HostPhase::Resolved);
        tracing::debug!(
            host = %self.id,
            "Resolved plugin order: [{}]",
            self.registry.plugin_order().join(", ")
        );

        self.set_phase(HostPhase::Active);
        Ok(())
    }

    /// Tear down the mounted plugin set.
    ///
    /// External inputs are kept; they are owned by the data layer.
    pub fn unmount(&self) {
        self.registry.clear();
        self.set_phase(HostPhase::Unmounted);
        tracing::debug!(host = %self.id, "Unmounted");
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> HostPhase {
        *self.phase.read()
    }

    /// Plugin names in resolved order.
    pub fn plugin_order(&self) -> Vec<String> {
        self.registry.plugin_order()
    }

    // =========================================================================
    // External Inputs
    // =========================================================================

    /// Set an external input to a new snapshot.
    ///
    /// Allowed in any phase; inputs are owned by the data layer and may be
    /// fed before the first mount. Returns `true` if the value changed.
    pub fn set_input(&self, name: impl Into<SlotName>, value: Value) -> bool {
        self.inputs.set(name, value)
    }

    // =========================================================================
    // Public Surface (getters / actions / templates)
    // =========================================================================

    /// Read the current resolved value of a getter.
    ///
    /// Unclaimed names read the external input (or `Null`).
    pub fn get_value(&self, name: impl Into<SlotName>) -> HostResult<Arc<Value>> {
        self.require_active()?;
        Ok(self.registry.getters().resolve(name, &self.inputs)?)
    }

    /// Dispatch an action through its handler chain.
    ///
    /// Effects emitted by handlers are applied to the input table after the
    /// chain returns, so getters resolved during the dispatch see the
    /// pre-dispatch snapshot. Returns `true` if any handler ran.
    pub fn invoke_action(&self, name: impl Into<SlotName>, payload: Value) -> HostResult<bool> {
        self.require_active()?;
        let name = name.into();

        let collector = EffectCollector::new();
        let handled = {
            let ctx = ActionContext::new(self.registry.getters(), &self.inputs, &collector);
            self.registry.actions().dispatch(&name, &payload, &ctx)
        };

        for effect in collector.drain() {
            match effect {
                Effect::SetInput { name, value } => {
                    self.inputs.set(name, value);
                }
            }
        }
        tracing::debug!(host = %self.id, "Dispatched action '{}' (handled: {})", name, handled);
        Ok(handled)
    }

    /// Render a named slot. Unclaimed slots render as the empty string.
    pub fn render_slot(&self, name: impl Into<SlotName>, ctx: &TemplateContext) -> HostResult<String> {
        self.render_slot_or(name, ctx, "")
    }

    /// Render a named slot, falling back to the caller's value when no
    /// plugin claims it.
    pub fn render_slot_or(
        &self,
        name: impl Into<SlotName>,
        ctx: &TemplateContext,
        fallback: &str,
    ) -> HostResult<String> {
        self.require_active()?;
        Ok(self.registry.templates().render_or(
            &name.into(),
            ctx,
            fallback,
            self.registry.getters(),
            &self.inputs,
        ))
    }

    // =========================================================================
    // Subscription
    // =========================================================================

    /// Subscribe to lifecycle changes.
    pub fn subscribe(&self) -> watch::Receiver<HostSnapshot> {
        self.rx.clone()
    }

    /// Subscribe to external input changes.
    pub fn subscribe_inputs(&self) -> watch::Receiver<Vec<InputState>> {
        self.inputs.subscribe()
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    fn require_active(&self) -> HostResult<()> {
        match *self.phase.read() {
            HostPhase::Active => Ok(()),
            _ => Err(HostError::NotMounted),
        }
    }

    fn set_phase(&self, phase: HostPhase) {
        *self.phase.write() = phase;
        let _ = self.tx.send(HostSnapshot {
            phase,
            plugin_order: self.registry.plugin_order(),
        });
    }
}

impl Default for PluginHost {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
