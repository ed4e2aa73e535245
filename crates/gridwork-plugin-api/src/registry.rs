//! Plugin Registry
//!
//! Owns the getter, action, and template sub-registries plus the resolved
//! plugin metadata. The host installs a declaration set here after the
//! dependency resolver has ordered it.

use parking_lot::RwLock;

use crate::actions::ActionRegistry;
use crate::getters::GetterRegistry;
use crate::templates::TemplateRegistry;
use crate::types::{PluginDeclaration, PluginDependency};

/// Metadata kept for a mounted plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginInfo {
    /// Plugin name.
    pub name: String,

    /// Declared dependencies.
    pub dependencies: Vec<PluginDependency>,
}

/// The plugin registry stores the chain sub-registries and plugin metadata.
pub struct PluginRegistry {
    /// Mounted plugins, in resolved order.
    plugins: RwLock<Vec<PluginInfo>>,

    /// Getter chains.
    getters: GetterRegistry,

    /// Action chains.
    actions: ActionRegistry,

    /// Template chains.
    templates: TemplateRegistry,
}

impl PluginRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            plugins: RwLock::new(Vec::new()),
            getters: GetterRegistry::new(),
            actions: ActionRegistry::new(),
            templates: TemplateRegistry::new(),
        }
    }

    /// Get the getter registry.
    pub fn getters(&self) -> &GetterRegistry {
        &self.getters
    }

    /// Get the action registry.
    pub fn actions(&self) -> &ActionRegistry {
        &self.actions
    }

    /// Get the template registry.
    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    /// Install a declaration set.
    ///
    /// `order` is the resolved plugin order as indices into `declarations`;
    /// every contribution is registered at its plugin's resolved position.
    /// Any previously installed set is cleared first.
    pub fn install(&self, declarations: Vec<PluginDeclaration>, order: &[usize]) {
        self.clear();

        let mut slots: Vec<Option<PluginDeclaration>> = declarations.into_iter().map(Some).collect();
        let mut infos = Vec::with_capacity(order.len());

        for (position, &declared_index) in order.iter().enumerate() {
            let Some(declaration) = slots[declared_index].take() else {
                continue;
            };
            infos.push(PluginInfo {
                name: declaration.name.clone(),
                dependencies: declaration.dependencies.clone(),
            });

            for (slot, f) in declaration.getters {
                self.getters.register(slot, position, &declaration.name, f);
            }
            for (slot, f) in declaration.actions {
                self.actions.register(slot, position, &declaration.name, f);
            }
            for (slot, f) in declaration.templates {
                self.templates.register(slot, position, &declaration.name, f);
            }
            tracing::info!("Installed plugin '{}' at position {}", declaration.name, position);
        }

        *self.plugins.write() = infos;
    }

    /// Remove all plugins and chains.
    pub fn clear(&self) {
        self.plugins.write().clear();
        self.getters.clear();
        self.actions.clear();
        self.templates.clear();
    }

    /// Plugin names in resolved order.
    pub fn plugin_order(&self) -> Vec<String> {
        self.plugins.read().iter().map(|p| p.name.clone()).collect()
    }

    /// Metadata for all mounted plugins, in resolved order.
    pub fn plugins(&self) -> Vec<PluginInfo> {
        self.plugins.read().clone()
    }

    /// Number of mounted plugins.
    pub fn count(&self) -> usize {
        self.plugins.read().len()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}
