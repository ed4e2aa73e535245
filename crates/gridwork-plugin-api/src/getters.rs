//! Getter registry and memoized recomputation.
//!
//! A getter is a named computed value shared across plugins. Each plugin may
//! contribute a transformer to a named chain; resolving the name folds the
//! chain left-to-right in resolved plugin order. The initial accumulator is
//! the external input registered under the same name (`Null` when absent),
//! so an unclaimed name simply reads through to its input.
//!
//! ## Recomputation
//!
//! Every fold records which inputs and which other getters it actually read,
//! together with their versions. A later resolve first revalidates those
//! versions (bringing upstream getters current in the process) and returns
//! the cached value without re-invoking any contributor when nothing it read
//! has changed. A recomputation that produces an equal value keeps the old
//! `Arc` and version, so downstream caches stay valid too.
//!
//! ## Cycles
//!
//! Cross-getter reads go through a per-pass stack. Re-entering a name that
//! is already being folded fails the resolution with
//! `CyclicGetterDependency` naming the cycle members.

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use crate::context::GetterContext;
use crate::engine::ObservableInputs;
use crate::types::{GetterFn, SlotName};

/// Errors detected while resolving a getter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GetterError {
    #[error("Cyclic getter dependency: {}", .cycle.join(" -> "))]
    CyclicGetterDependency { cycle: Vec<String> },
}

/// One plugin's contribution to a getter chain.
struct GetterContributor {
    plugin: String,
    position: usize,
    f: GetterFn,
}

/// A version the previous fold depended on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DepVersion {
    /// An external input read, by version.
    Input { name: SlotName, version: u64 },
    /// Another getter chain read, by chain version.
    Getter { name: SlotName, version: u64 },
}

/// Cached fold result plus everything it read.
#[derive(Clone)]
struct CacheEntry {
    value: Arc<Value>,
    deps: Vec<DepVersion>,
}

/// Mutable per-chain state behind its own lock, so revalidating one chain
/// never blocks folding another.
struct ChainState {
    cache: Option<CacheEntry>,
    version: u64,
}

#[derive(Clone)]
struct ChainEntry {
    contributors: Vec<Arc<GetterContributor>>,
    state: Arc<Mutex<ChainState>>,
}

/// Per-resolution-pass bookkeeping: the fold stack for cycle detection and
/// the first error recorded by a nested read.
pub(crate) struct ResolveSession {
    stack: RefCell<Vec<SlotName>>,
    error: RefCell<Option<GetterError>>,
}

impl ResolveSession {
    fn new() -> Self {
        Self {
            stack: RefCell::new(Vec::new()),
            error: RefCell::new(None),
        }
    }

    pub(crate) fn record_error(&self, error: GetterError) {
        let mut slot = self.error.borrow_mut();
        if slot.is_none() {
            *slot = Some(error);
        }
    }
}

/// Registry of getter chains, keyed by slot name.
pub struct GetterRegistry {
    chains: RwLock<HashMap<SlotName, ChainEntry>>,
}

impl GetterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            chains: RwLock::new(HashMap::new()),
        }
    }

    /// Register a contribution at the given resolved plugin position.
    ///
    /// Contributions are kept sorted by position; registering resets the
    /// chain's cache.
    pub fn register(&self, name: impl Into<SlotName>, position: usize, plugin: &str, f: GetterFn) {
        let name = name.into();
        let mut chains = self.chains.write();
        let entry = chains.entry(name.clone()).or_insert_with(|| ChainEntry {
            contributors: Vec::new(),
            state: Arc::new(Mutex::new(ChainState {
                cache: None,
                version: 0,
            })),
        });
        entry.contributors.push(Arc::new(GetterContributor {
            plugin: plugin.to_string(),
            position,
            f,
        }));
        entry.contributors.sort_by_key(|c| c.position);
        entry.state.lock().cache = None;
        tracing::debug!(
            "Registered getter '{}' from plugin '{}' (chain length {})",
            name,
            plugin,
            entry.contributors.len()
        );
    }

    /// Remove all chains and caches.
    pub fn clear(&self) {
        self.chains.write().clear();
    }

    /// Whether any plugin contributes to the named getter.
    pub fn has_chain(&self, name: &SlotName) -> bool {
        self.chains.read().contains_key(name)
    }

    /// Names of plugins contributing to the named getter, in chain order.
    pub fn contributors(&self, name: &SlotName) -> Vec<String> {
        self.chains
            .read()
            .get(name)
            .map(|entry| entry.contributors.iter().map(|c| c.plugin.clone()).collect())
            .unwrap_or_default()
    }

    /// Resolve a getter against the current inputs.
    ///
    /// Unclaimed names resolve to the external input (or `Null`).
    pub fn resolve(
        &self,
        name: impl Into<SlotName>,
        inputs: &ObservableInputs,
    ) -> Result<Arc<Value>, GetterError> {
        let session = ResolveSession::new();
        self.resolve_in_session(&name.into(), inputs, &session)
    }

    /// Current chain version, bumped whenever a recomputation produced a
    /// different value. `None` for unclaimed names.
    pub(crate) fn chain_version(&self, name: &SlotName) -> Option<u64> {
        self.chains
            .read()
            .get(name)
            .map(|entry| entry.state.lock().version)
    }

    pub(crate) fn resolve_in_session(
        &self,
        name: &SlotName,
        inputs: &ObservableInputs,
        session: &ResolveSession,
    ) -> Result<Arc<Value>, GetterError> {
        // Cycle guard before anything else.
        {
            let stack = session.stack.borrow();
            if let Some(pos) = stack.iter().position(|n| n == name) {
                let cycle = stack[pos..].iter().map(|n| n.to_string()).collect();
                return Err(GetterError::CyclicGetterDependency { cycle });
            }
        }

        let entry = { self.chains.read().get(name).cloned() };
        let Some(entry) = entry else {
            return Ok(inputs.value_or_null(name));
        };

        // Memo check: valid when everything the previous fold read is at the
        // same version.
        let cached = { entry.state.lock().cache.clone() };
        if let Some(cache) = cached {
            if self.deps_current(&cache.deps, inputs, session)? {
                tracing::debug!("Getter '{}' served from cache", name);
                return Ok(cache.value);
            }
        }

        // Recompute: fold the chain over the external input, recording reads.
        session.stack.borrow_mut().push(name.clone());
        let (base, base_version) = inputs.get_with_version(name);
        let deps = RefCell::new(vec![DepVersion::Input {
            name: name.clone(),
            version: base_version,
        }]);

        let mut acc = base;
        {
            let ctx = GetterContext::new(self, inputs, session, &deps);
            for contributor in &entry.contributors {
                acc = Arc::new((contributor.f)(acc, &ctx));
            }
        }
        session.stack.borrow_mut().pop();

        if let Some(error) = session.error.borrow_mut().take() {
            return Err(error);
        }

        // Store, preserving value identity when the result is unchanged.
        let mut state = entry.state.lock();
        let unchanged = state
            .cache
            .as_ref()
            .map(|cache| *cache.value == *acc)
            .unwrap_or(false);
        let value = if unchanged {
            state.cache.as_ref().map(|cache| cache.value.clone()).unwrap_or(acc)
        } else {
            state.version += 1;
            tracing::debug!("Getter '{}' recomputed to version {}", name, state.version);
            acc
        };
        state.cache = Some(CacheEntry {
            value: value.clone(),
            deps: deps.into_inner(),
        });
        Ok(value)
    }

    /// Record a read made by a contributor, so the fold's cache entry knows
    /// what to revalidate.
    pub(crate) fn record_read(&self, name: &SlotName, inputs: &ObservableInputs, deps: &RefCell<Vec<DepVersion>>) {
        let dep = match self.chain_version(name) {
            Some(version) => DepVersion::Getter {
                name: name.clone(),
                version,
            },
            None => DepVersion::Input {
                name: name.clone(),
                version: inputs.version(name),
            },
        };
        deps.borrow_mut().push(dep);
    }

    fn deps_current(
        &self,
        deps: &[DepVersion],
        inputs: &ObservableInputs,
        session: &ResolveSession,
    ) -> Result<bool, GetterError> {
        for dep in deps {
            match dep {
                DepVersion::Input { name, version } => {
                    if inputs.version(name) != *version {
                        return Ok(false);
                    }
                }
                DepVersion::Getter { name, version } => {
                    // Bring the upstream chain current first; its version
                    // only moves when its value actually changed.
                    self.resolve_in_session(name, inputs, session)?;
                    if self.chain_version(name) != Some(*version) {
                        return Ok(false);
                    }
                }
            }
        }
        Ok(true)
    }
}

impl Default for GetterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn registry_and_inputs() -> (GetterRegistry, ObservableInputs) {
        (GetterRegistry::new(), ObservableInputs::new())
    }

    #[test]
    fn test_unclaimed_name_reads_input() {
        let (registry, inputs) = registry_and_inputs();
        inputs.set("rows", json!([{ "id": 0 }]));

        let value = registry.resolve("rows", &inputs).unwrap();
        assert_eq!(*value, json!([{ "id": 0 }]));

        let missing = registry.resolve("missing", &inputs).unwrap();
        assert_eq!(*missing, Value::Null);
    }

    #[test]
    fn test_fold_is_left_to_right_by_position() {
        let (registry, inputs) = registry_and_inputs();
        inputs.set("label", json!("base"));

        // Registered out of order; positions decide the fold order.
        registry.register("label", 2, "C", Box::new(|acc, _| json!(format!("{}+C", acc.as_str().unwrap()))));
        registry.register("label", 0, "A", Box::new(|acc, _| json!(format!("{}+A", acc.as_str().unwrap()))));
        registry.register("label", 1, "B", Box::new(|acc, _| json!(format!("{}+B", acc.as_str().unwrap()))));

        let value = registry.resolve("label", &inputs).unwrap();
        // resolve = C(B(A(base)))
        assert_eq!(*value, json!("base+A+B+C"));
    }

    #[test]
    fn test_memoization_skips_contributors() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        let (registry, inputs) = registry_and_inputs();
        inputs.set("rows", json!([1, 2, 3]));
        registry.register(
            "rows",
            0,
            "Counter",
            Box::new(|acc, _| {
                CALLS.fetch_add(1, Ordering::SeqCst);
                (*acc).clone()
            }),
        );

        let first = registry.resolve("rows", &inputs).unwrap();
        let second = registry.resolve("rows", &inputs).unwrap();
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));

        // An unrelated input does not invalidate the chain.
        inputs.set("columns", json!([]));
        registry.resolve("rows", &inputs).unwrap();
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);

        // The input the fold read does.
        inputs.set("rows", json!([1, 2]));
        registry.resolve("rows", &inputs).unwrap();
        assert_eq!(CALLS.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_cross_getter_dependency_invalidates() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        let (registry, inputs) = registry_and_inputs();
        inputs.set("rows", json!([{ "id": 0 }, { "id": 1 }]));
        inputs.set("threshold", json!(0));

        registry.register(
            "visibleRows",
            0,
            "Filtering",
            Box::new(|_, ctx| {
                CALLS.fetch_add(1, Ordering::SeqCst);
                let rows = ctx.get("rows");
                let threshold = ctx.get("threshold").as_i64().unwrap_or(0);
                let kept: Vec<Value> = rows
                    .as_array()
                    .map(|rows| {
                        rows.iter()
                            .filter(|row| row["id"].as_i64().unwrap_or(0) > threshold)
                            .cloned()
                            .collect()
                    })
                    .unwrap_or_default();
                Value::Array(kept)
            }),
        );

        let value = registry.resolve("visibleRows", &inputs).unwrap();
        assert_eq!(*value, json!([{ "id": 1 }]));
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);

        // Unchanged inputs: cache holds.
        registry.resolve("visibleRows", &inputs).unwrap();
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);

        // A read input changed: recompute.
        inputs.set("threshold", json!(-1));
        let value = registry.resolve("visibleRows", &inputs).unwrap();
        assert_eq!(*value, json!([{ "id": 0 }, { "id": 1 }]));
        assert_eq!(CALLS.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_upstream_chain_version_gates_downstream() {
        static DOWNSTREAM: AtomicUsize = AtomicUsize::new(0);

        let (registry, inputs) = registry_and_inputs();
        inputs.set("rows", json!([3, 1, 2]));
        registry.register(
            "sortedRows",
            0,
            "Sorting",
            Box::new(|_, ctx| {
                let mut rows: Vec<Value> = ctx.get("rows").as_array().cloned().unwrap_or_default();
                rows.sort_by_key(|v| v.as_i64().unwrap_or(0));
                Value::Array(rows)
            }),
        );
        registry.register(
            "rowCount",
            1,
            "Counter",
            Box::new(|_, ctx| {
                DOWNSTREAM.fetch_add(1, Ordering::SeqCst);
                json!(ctx.get("sortedRows").as_array().map(|r| r.len()).unwrap_or(0))
            }),
        );

        assert_eq!(*registry.resolve("rowCount", &inputs).unwrap(), json!(3));
        assert_eq!(DOWNSTREAM.load(Ordering::SeqCst), 1);

        // Reordering the input changes "rows" but not "sortedRows"; the
        // downstream cache stays valid because the chain version held.
        inputs.set("rows", json!([1, 2, 3]));
        assert_eq!(*registry.resolve("rowCount", &inputs).unwrap(), json!(3));
        assert_eq!(DOWNSTREAM.load(Ordering::SeqCst), 1);

        inputs.set("rows", json!([1, 2, 3, 4]));
        assert_eq!(*registry.resolve("rowCount", &inputs).unwrap(), json!(4));
        assert_eq!(DOWNSTREAM.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_equal_recompute_preserves_identity() {
        let (registry, inputs) = registry_and_inputs();
        inputs.set("rows", json!([2, 1]));
        registry.register(
            "sortedRows",
            0,
            "Sorting",
            Box::new(|_, ctx| {
                let mut rows: Vec<Value> = ctx.get("rows").as_array().cloned().unwrap_or_default();
                rows.sort_by_key(|v| v.as_i64().unwrap_or(0));
                Value::Array(rows)
            }),
        );

        let first = registry.resolve("sortedRows", &inputs).unwrap();
        inputs.set("rows", json!([1, 2]));
        let second = registry.resolve("sortedRows", &inputs).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_cyclic_getter_dependency() {
        let (registry, inputs) = registry_and_inputs();
        registry.register("a", 0, "P1", Box::new(|_, ctx| (*ctx.get("b")).clone()));
        registry.register("b", 1, "P2", Box::new(|_, ctx| (*ctx.get("a")).clone()));

        match registry.resolve("a", &inputs) {
            Err(GetterError::CyclicGetterDependency { cycle }) => {
                assert!(cycle.contains(&"a".to_string()));
                assert!(cycle.contains(&"b".to_string()));
            }
            other => panic!("expected cycle, got {:?}", other),
        }

        // A failed resolution is not cached; the error is reproducible.
        assert!(registry.resolve("a", &inputs).is_err());
    }

    #[test]
    fn test_clear_drops_chains() {
        let (registry, inputs) = registry_and_inputs();
        inputs.set("rows", json!([1]));
        registry.register("rows", 0, "P", Box::new(|_, _| json!([])));
        assert_eq!(*registry.resolve("rows", &inputs).unwrap(), json!([]));

        registry.clear();
        assert!(!registry.has_chain(&"rows".into()));
        // Unclaimed again: reads through to the input.
        assert_eq!(*registry.resolve("rows", &inputs).unwrap(), json!([1]));
    }

    #[test]
    fn test_contributors_listed_in_chain_order() {
        let (registry, _) = registry_and_inputs();
        registry.register("rows", 3, "LocalFiltering", Box::new(|acc, _| (*acc).clone()));
        registry.register("rows", 1, "GridCore", Box::new(|acc, _| (*acc).clone()));
        assert_eq!(
            registry.contributors(&"rows".into()),
            vec!["GridCore".to_string(), "LocalFiltering".to_string()]
        );
    }
}
