use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::error::ProvisionError;
use crate::interfaces::provider::{Named, ServiceProvider};

/// Zero-argument constructor for a provider.
pub type ProviderFactory<P> = Box<dyn Fn() -> anyhow::Result<Box<P>> + Send + Sync>;

/// Maps provider identifiers to the constructors that build them.
///
/// Populated once at startup; a loader resolves its identifiers against it.
pub struct ProviderFactories<P: ?Sized + 'static> {
    factories: HashMap<String, ProviderFactory<P>>,
}

impl<P: ?Sized + 'static> ProviderFactories<P> {
    pub fn new() -> Self {
        ProviderFactories {
            factories: HashMap::new(),
        }
    }

    /// Registers a constructor under `identifier`, replacing any previous one.
    pub fn insert<F>(&mut self, identifier: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> anyhow::Result<Box<P>> + Send + Sync + 'static,
    {
        let identifier = identifier.into();
        if self.factories.insert(identifier.clone(), Box::new(factory)).is_some() {
            debug!(provider = %identifier, "replaced provider factory");
        }
        self
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.factories.contains_key(identifier)
    }

    pub fn get(&self, identifier: &str) -> Option<&ProviderFactory<P>> {
        self.factories.get(identifier)
    }

    /// Registered identifiers, sorted.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Builds a fresh provider for `identifier`.
    ///
    /// Fails with [`ProvisionError::ProviderNotFound`] if nothing is registered under it;
    /// a failing constructor's error is returned as-is.
    pub fn instantiate(&self, identifier: &str) -> Result<Box<P>, ProvisionError> {
        let factory = self
            .factories
            .get(identifier)
            .ok_or_else(|| ProvisionError::ProviderNotFound(identifier.to_string()))?;
        Ok(factory()?)
    }
}

impl ProviderFactories<dyn ServiceProvider> {
    /// Registers `T` under [`Named::NAME`], building it with `Default`.
    pub fn register_default<T>(&mut self) -> &mut Self
    where
        T: ServiceProvider + Named + Default + 'static,
    {
        self.insert(T::NAME, || Ok(Box::new(T::default()) as Box<dyn ServiceProvider>))
    }
}

impl<P: ?Sized + 'static> Default for ProviderFactories<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ?Sized + 'static> fmt::Debug for ProviderFactories<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderFactories")
            .field("identifiers", &self.identifiers())
            .finish()
    }
}
