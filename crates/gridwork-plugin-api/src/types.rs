//! Core types for the Gridwork Plugin API.
//!
//! A plugin is a declaration: a unique name, an ordered dependency list, and
//! the getter/action/template contributions it adds to the host's named
//! slots. Declarations are plain data plus boxed closures; they are built
//! with the `PluginDeclaration` builder methods and consumed by
//! `PluginHost::mount`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::actions::NextAction;
use crate::context::{ActionContext, GetterContext, TemplateContext};
use crate::templates::TemplateScope;

// =============================================================================
// Slot Names
// =============================================================================

/// Name of a shared slot: a getter, an action, or a template.
///
/// Slot names are an open set. Plugins may define new slots freely; reading
/// an unclaimed slot falls back to the external input for that name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotName(pub String);

impl From<String> for SlotName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SlotName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for SlotName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SlotName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Contribution Functions
// =============================================================================

/// A getter contribution.
///
/// Receives the value accumulated by earlier contributors for the same slot
/// plus read access to all other getters, and returns the new accumulated
/// value. Must be a pure function of those inputs; the memoization layer
/// assumes equal inputs produce equal outputs.
pub type GetterFn = Box<dyn Fn(Arc<Value>, &GetterContext<'_>) -> Value + Send + Sync>;

/// An action contribution.
///
/// Receives the dispatch payload, the action context, and the `next`
/// continuation bound to the next-later contributor. The handler decides
/// whether and how to call `next`: unchanged, with a transformed payload,
/// multiple times, or not at all.
pub type ActionFn = Box<dyn Fn(&Value, &ActionContext<'_>, &NextAction<'_>) + Send + Sync>;

/// A template contribution.
///
/// Receives the context bag for the item being rendered and a scope that can
/// render the rest of the chain, nested slots, and getter values. Returns
/// the rendered output.
pub type TemplateFn = Box<dyn Fn(&TemplateContext, &TemplateScope<'_>) -> String + Send + Sync>;

// =============================================================================
// Plugin Declaration
// =============================================================================

/// A dependency on another plugin, referenced by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginDependency {
    /// Name of the plugin that must be mounted before this one.
    pub plugin_name: String,

    /// Optional dependencies order the plugin when present and are skipped
    /// silently when absent. Required dependencies fail the mount.
    pub optional: bool,
}

impl PluginDependency {
    /// A required dependency.
    pub fn required(plugin_name: impl Into<String>) -> Self {
        Self {
            plugin_name: plugin_name.into(),
            optional: false,
        }
    }

    /// An optional dependency.
    pub fn optional(plugin_name: impl Into<String>) -> Self {
        Self {
            plugin_name: plugin_name.into(),
            optional: true,
        }
    }
}

/// A plugin declaration: name, dependencies, and slot contributions.
///
/// Immutable once mounted. The declaration set for a grid is consumed by
/// `PluginHost::mount`, which resolves dependency order and wires every
/// contribution into the per-slot chains.
pub struct PluginDeclaration {
    /// Unique plugin name.
    pub name: String,

    /// Ordered dependency list.
    pub dependencies: Vec<PluginDependency>,

    pub(crate) getters: Vec<(SlotName, GetterFn)>,
    pub(crate) actions: Vec<(SlotName, ActionFn)>,
    pub(crate) templates: Vec<(SlotName, TemplateFn)>,
}

impl PluginDeclaration {
    /// Create an empty declaration with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
            getters: Vec::new(),
            actions: Vec::new(),
            templates: Vec::new(),
        }
    }

    /// Declare a required dependency.
    pub fn requires(mut self, plugin_name: impl Into<String>) -> Self {
        self.dependencies.push(PluginDependency::required(plugin_name));
        self
    }

    /// Declare an optional dependency.
    pub fn optionally(mut self, plugin_name: impl Into<String>) -> Self {
        self.dependencies.push(PluginDependency::optional(plugin_name));
        self
    }

    /// Contribute a getter to the named slot.
    pub fn getter(
        mut self,
        name: impl Into<SlotName>,
        f: impl Fn(Arc<Value>, &GetterContext<'_>) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.getters.push((name.into(), Box::new(f)));
        self
    }

    /// Contribute an action handler to the named slot.
    pub fn action(
        mut self,
        name: impl Into<SlotName>,
        f: impl Fn(&Value, &ActionContext<'_>, &NextAction<'_>) + Send + Sync + 'static,
    ) -> Self {
        self.actions.push((name.into(), Box::new(f)));
        self
    }

    /// Contribute a template override to the named slot.
    pub fn template(
        mut self,
        name: impl Into<SlotName>,
        f: impl Fn(&TemplateContext, &TemplateScope<'_>) -> String + Send + Sync + 'static,
    ) -> Self {
        self.templates.push((name.into(), Box::new(f)));
        self
    }
}

impl std::fmt::Debug for PluginDeclaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginDeclaration")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("getters_count", &self.getters.len())
            .field("actions_count", &self.actions.len())
            .field("templates_count", &self.templates.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_name_conversions() {
        let name: SlotName = "rows".into();
        assert_eq!(name.as_ref(), "rows");
        assert_eq!(name.to_string(), "rows");
        assert_eq!(SlotName::from("rows".to_string()), name);
    }

    #[test]
    fn test_declaration_builder() {
        let decl = PluginDeclaration::new("LocalFiltering")
            .requires("FilteringState")
            .optionally("SortingState")
            .getter("rows", |acc, _ctx| (*acc).clone());

        assert_eq!(decl.name, "LocalFiltering");
        assert_eq!(
            decl.dependencies,
            vec![
                PluginDependency::required("FilteringState"),
                PluginDependency::optional("SortingState"),
            ]
        );
        assert_eq!(decl.getters.len(), 1);
        assert_eq!(decl.actions.len(), 0);
    }

    #[test]
    fn test_declaration_debug_skips_closures() {
        let decl = PluginDeclaration::new("TableView").template("tableViewCell", |_, _| String::new());
        let text = format!("{:?}", decl);
        assert!(text.contains("TableView"));
        assert!(text.contains("templates_count: 1"));
    }
}
