//! Plugin composition engine for the Gridwork data grid.
//!
//! This crate provides the machinery that assembles independent plugins into
//! one grid:
//! - Dependency-ordered plugin resolution with cycle detection
//! - Getter chains: named computed values folded across plugins, memoized
//!   by the versions of what each fold actually read
//! - Action chains: named handlers with `next` continuations for
//!   wrapping, transforming, and short-circuiting
//! - Template chains: named render slots where later overrides wrap or
//!   replace earlier ones
//! - The plugin host owning registries, external inputs, and lifecycle

pub mod actions;
pub mod context;
pub mod effect;
pub mod engine;
pub mod error;
pub mod getters;
pub mod registry;
pub mod resolver;
pub mod templates;
pub mod types;

// Re-export commonly used types
pub use actions::{ActionRegistry, NextAction};
pub use context::{ActionContext, GetterContext, TemplateContext};
pub use effect::{Effect, EffectCollector};
pub use engine::{HostPhase, HostSnapshot, InputState, ObservableInputs, PluginHost};
pub use error::{HostError, HostResult};
pub use getters::{GetterError, GetterRegistry};
pub use registry::{PluginInfo, PluginRegistry};
pub use resolver::{resolve_order, ResolveError};
pub use templates::{TemplateRegistry, TemplateScope};
pub use types::{ActionFn, GetterFn, PluginDeclaration, PluginDependency, SlotName, TemplateFn};

// Re-export gridwork_core types for convenience
pub use gridwork_core::{cell_value, row_key, Column, Row, RowKind, TableColumn, TableRow};
