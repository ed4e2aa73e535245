//! Dependency resolver.
//!
//! Orders a set of plugin declarations so that every declared dependency is
//! mounted before its dependents. The order is deterministic: among plugins
//! whose dependencies are all satisfied, the one declared first goes first.
//!
//! Resolution is all-or-nothing. A required dependency naming an absent
//! plugin, or any dependency cycle, fails the whole mount; a partial order is
//! never returned.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::types::PluginDeclaration;

/// Errors detected while resolving plugin order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("Plugin '{0}' is declared more than once")]
    DuplicatePlugin(String),

    #[error("Plugin '{plugin}' requires missing plugin '{dependency}'")]
    MissingDependency { plugin: String, dependency: String },

    #[error("Cyclic plugin dependency: {}", .cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },
}

/// Compute the resolved plugin order.
///
/// Returns indices into `plugins` such that for every dependency edge the
/// dependency's index appears before the dependent's. Optional dependencies
/// on absent plugins are skipped; optional dependencies on present plugins
/// still order them.
pub fn resolve_order(plugins: &[PluginDeclaration]) -> Result<Vec<usize>, ResolveError> {
    let mut index_by_name: HashMap<&str, usize> = HashMap::new();
    for (index, plugin) in plugins.iter().enumerate() {
        if index_by_name.insert(plugin.name.as_str(), index).is_some() {
            return Err(ResolveError::DuplicatePlugin(plugin.name.clone()));
        }
    }

    // dependents[j] lists plugins that must come after plugin j.
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); plugins.len()];
    let mut unmet: Vec<usize> = vec![0; plugins.len()];

    for (index, plugin) in plugins.iter().enumerate() {
        for dep in &plugin.dependencies {
            match index_by_name.get(dep.plugin_name.as_str()) {
                Some(&dep_index) => {
                    dependents[dep_index].push(index);
                    unmet[index] += 1;
                }
                None if dep.optional => {
                    tracing::debug!(
                        "Plugin '{}' skips absent optional dependency '{}'",
                        plugin.name,
                        dep.plugin_name
                    );
                }
                None => {
                    return Err(ResolveError::MissingDependency {
                        plugin: plugin.name.clone(),
                        dependency: dep.plugin_name.clone(),
                    });
                }
            }
        }
    }

    // Kahn's algorithm; the min-heap keeps ties in declaration order.
    let mut ready: BinaryHeap<Reverse<usize>> = unmet
        .iter()
        .enumerate()
        .filter(|(_, &count)| count == 0)
        .map(|(index, _)| Reverse(index))
        .collect();

    let mut order = Vec::with_capacity(plugins.len());
    while let Some(Reverse(index)) = ready.pop() {
        order.push(index);
        for &dependent in &dependents[index] {
            unmet[dependent] -= 1;
            if unmet[dependent] == 0 {
                ready.push(Reverse(dependent));
            }
        }
    }

    if order.len() < plugins.len() {
        return Err(ResolveError::CyclicDependency {
            cycle: extract_cycle(plugins, &index_by_name, &unmet),
        });
    }

    Ok(order)
}

/// Walk unresolved plugins along their unresolved dependencies until one
/// repeats; the repeated segment is a cycle.
fn extract_cycle(
    plugins: &[PluginDeclaration],
    index_by_name: &HashMap<&str, usize>,
    unmet: &[usize],
) -> Vec<String> {
    let stuck: Vec<bool> = unmet.iter().map(|&count| count > 0).collect();
    let start = match stuck.iter().position(|&s| s) {
        Some(index) => index,
        None => return Vec::new(),
    };

    let mut seen: HashMap<usize, usize> = HashMap::new();
    let mut path: Vec<usize> = Vec::new();
    let mut current = start;

    loop {
        if let Some(&pos) = seen.get(&current) {
            return path[pos..]
                .iter()
                .map(|&index| plugins[index].name.clone())
                .collect();
        }
        seen.insert(current, path.len());
        path.push(current);

        // Every stuck plugin has at least one stuck prerequisite.
        current = plugins[current]
            .dependencies
            .iter()
            .filter_map(|dep| index_by_name.get(dep.plugin_name.as_str()).copied())
            .find(|&dep_index| stuck[dep_index])
            .unwrap_or(current);
    }
}
