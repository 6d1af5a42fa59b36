use std::sync::Arc;
use std::thread::{self, ThreadId};

use dashmap::{DashMap, DashSet};
use tracing::trace;

use crate::error::ContainerError;
use crate::interfaces::container::{Container, Service, ServiceFactory};

/// A [`Container`] that builds each service lazily on first `get` and shares it afterwards.
///
/// Registering a key again replaces its factory and drops any instance already built from
/// the previous one.
pub struct BasicContainer {
    factories: DashMap<String, ServiceFactory>,
    instances: DashMap<String, Service>,
    // keys whose factory is running, per thread
    building: DashSet<(ThreadId, String)>,
}

/// Marks a key as under construction until dropped.
struct BuildGuard<'a> {
    building: &'a DashSet<(ThreadId, String)>,
    slot: (ThreadId, String),
}

impl<'a> BuildGuard<'a> {
    fn enter(building: &'a DashSet<(ThreadId, String)>, key: &str) -> Result<Self, ContainerError> {
        let slot = (thread::current().id(), key.to_string());
        if !building.insert(slot.clone()) {
            return Err(ContainerError::Cycle(key.to_string()));
        }
        Ok(BuildGuard { building, slot })
    }
}

impl Drop for BuildGuard<'_> {
    fn drop(&mut self) {
        self.building.remove(&self.slot);
    }
}

impl BasicContainer {
    pub fn new() -> Self {
        BasicContainer {
            factories: DashMap::new(),
            instances: DashMap::new(),
            building: DashSet::new(),
        }
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.factories.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Container for BasicContainer {
    fn get(&self, key: &str) -> Result<Service, ContainerError> {
        if let Some(instance) = self.instances.get(key) {
            return Ok(Arc::clone(instance.value()));
        }

        // Clone the factory out so no shard lock is held while it runs;
        // factories may resolve other keys from this container.
        let factory = self
            .factories
            .get(key)
            .map(|f| Arc::clone(f.value()))
            .ok_or_else(|| ContainerError::NotFound(key.to_string()))?;

        let guard = BuildGuard::enter(&self.building, key)?;
        trace!(key, "building service");
        let service = factory(self).map_err(|source| ContainerError::Factory {
            key: key.to_string(),
            source,
        })?;
        drop(guard);

        // Only cache if the factory is still the registered one. Holding the
        // factory entry keeps `set` from swapping it until the instance is stored.
        let current = self.factories.get(key);
        match current {
            Some(registered) if Arc::ptr_eq(registered.value(), &factory) => {
                let entry = self.instances.entry(key.to_string()).or_insert(service);
                Ok(Arc::clone(entry.value()))
            }
            _ => {
                trace!(key, "factory replaced while building, not caching");
                Ok(service)
            }
        }
    }

    fn has(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    fn set(&self, key: &str, factory: ServiceFactory) {
        trace!(key, "registering service");
        self.factories.insert(key.to_string(), factory);
        self.instances.remove(key);
    }
}

impl Default for BasicContainer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::container::ContainerExt;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_container() {
        let container = BasicContainer::new();
        container.set_value("greeting", String::from("test"));

        let resolved = container.resolve::<String>("greeting");
        assert!(resolved.is_ok(), "Failed to resolve String");
        assert_eq!(resolved.unwrap().as_str(), "test");
        assert!(container.has("greeting"));
    }

    #[test]
    fn test_multiple_registrations() {
        let container = BasicContainer::new();

        container.set_value("name", String::from("test"));
        container.set_value("count", 42i32);

        assert_eq!(container.resolve::<String>("name").unwrap().as_str(), "test");
        assert_eq!(*container.resolve::<i32>("count").unwrap(), 42);
        assert_eq!(container.keys(), vec!["count".to_string(), "name".to_string()]);
        assert_eq!(container.len(), 2);
    }

    #[test]
    fn test_missing_key() {
        let container = BasicContainer::new();
        assert!(container.is_empty());
        assert!(!container.has("absent"));
        assert!(matches!(
            container.get("absent"),
            Err(ContainerError::NotFound(key)) if key == "absent"
        ));
    }

    #[test]
    fn test_type_mismatch() {
        let container = BasicContainer::new();
        container.set_value("count", 42i32);

        match container.resolve::<String>("count") {
            Err(ContainerError::TypeMismatch { key, .. }) => assert_eq!(key, "count"),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_factory_builds_once() {
        let container = BasicContainer::new();
        let builds = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&builds);
        container.set_factory("shared", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(String::from("built"))
        });

        let first = container.resolve::<String>("shared").unwrap();
        let second = container.resolve::<String>("shared").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_factory_resolves_dependencies() {
        let container = BasicContainer::new();
        container.set_value("host", String::from("localhost"));
        container.set_value("port", 8080u16);
        container.set_factory("address", |c| {
            let host = c.resolve::<String>("host")?;
            let port = c.resolve::<u16>("port")?;
            Ok(format!("{}:{}", host, port))
        });

        assert_eq!(
            container.resolve::<String>("address").unwrap().as_str(),
            "localhost:8080"
        );
    }

    #[test]
    fn test_factory_failure() {
        let container = BasicContainer::new();
        container.set_factory::<String, _>("broken", |_| Err(anyhow::anyhow!("no database")));

        match container.get("broken") {
            Err(ContainerError::Factory { key, source }) => {
                assert_eq!(key, "broken");
                assert_eq!(source.to_string(), "no database");
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_overwrite_during_build_is_not_cached_over() {
        let container = BasicContainer::new();
        container.set_factory("mode", |c| {
            c.set_value("mode", String::from("second"));
            Ok(String::from("first"))
        });

        assert_eq!(container.resolve::<String>("mode").unwrap().as_str(), "first");
        assert_eq!(container.resolve::<String>("mode").unwrap().as_str(), "second");
        assert_eq!(container.resolve::<String>("mode").unwrap().as_str(), "second");
    }

    #[test]
    fn test_self_cycle_is_an_error() {
        let container = BasicContainer::new();
        container.set_factory("a", |c| Ok((*c.resolve::<String>("a")?).clone()));

        match container.get("a") {
            Err(ContainerError::Factory { key, source }) => {
                assert_eq!(key, "a");
                assert!(matches!(
                    source.downcast_ref::<ContainerError>(),
                    Some(ContainerError::Cycle(k)) if k == "a"
                ));
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_mutual_cycle_is_an_error() {
        let container = BasicContainer::new();
        container.set_factory("a", |c| Ok((*c.resolve::<String>("b")?).clone()));
        container.set_factory("b", |c| Ok((*c.resolve::<String>("a")?).clone()));

        let err = container.resolve::<String>("a").unwrap_err();
        let is_cycle = match &err {
            ContainerError::Factory { source, .. } => source.chain().any(|e| {
                matches!(e.downcast_ref::<ContainerError>(), Some(ContainerError::Cycle(k)) if k == "a")
            }),
            _ => false,
        };
        assert!(is_cycle, "expected a cycle on \"a\", got {:?}", err);

        // nothing is left marked as building after the failure
        container.set_value("b", String::from("leaf"));
        assert_eq!(container.resolve::<String>("a").unwrap().as_str(), "leaf");
    }

    #[test]
    fn test_overwrite_discards_built_instance() {
        let container = BasicContainer::new();
        container.set_value("mode", String::from("first"));
        assert_eq!(container.resolve::<String>("mode").unwrap().as_str(), "first");

        container.set_value("mode", String::from("second"));
        assert_eq!(container.resolve::<String>("mode").unwrap().as_str(), "second");
        assert_eq!(container.len(), 1);
    }
}
