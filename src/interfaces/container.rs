use std::any::{type_name, Any};
use std::sync::Arc;

use crate::error::ContainerError;

/// A shared, type-erased service instance.
pub type Service = Arc<dyn Any + Send + Sync>;

/// Builds a service, optionally resolving its own dependencies from the container.
pub type ServiceFactory = Arc<dyn Fn(&dyn Container) -> anyhow::Result<Service> + Send + Sync>;

/// Key-value service registry that providers write into.
///
/// Every method takes `&self` so a single container can be handed to many
/// providers during a registration pass and read concurrently afterwards.
pub trait Container: Send + Sync {
    fn get(&self, key: &str) -> Result<Service, ContainerError>;
    fn has(&self, key: &str) -> bool;
    fn set(&self, key: &str, factory: ServiceFactory);
}

/// Typed helpers available on every [`Container`], including `dyn Container`.
pub trait ContainerExt: Container {
    fn resolve<T: Any + Send + Sync>(&self, key: &str) -> Result<Arc<T>, ContainerError> {
        self.get(key)?
            .downcast::<T>()
            .map_err(|_| ContainerError::TypeMismatch {
                key: key.to_string(),
                expected: type_name::<T>(),
            })
    }

    /// Registers an already built value; every `get` returns the same instance.
    fn set_value<T: Any + Send + Sync>(&self, key: &str, value: T) {
        let service: Service = Arc::new(value);
        let factory: ServiceFactory =
            Arc::new(move |_: &dyn Container| -> anyhow::Result<Service> { Ok(Arc::clone(&service)) });
        self.set(key, factory);
    }

    fn set_factory<T, F>(&self, key: &str, factory: F)
    where
        T: Any + Send + Sync,
        F: Fn(&dyn Container) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        let factory: ServiceFactory =
            Arc::new(move |container: &dyn Container| -> anyhow::Result<Service> {
                Ok(Arc::new(factory(container)?))
            });
        self.set(key, factory);
    }
}

impl<C: Container + ?Sized> ContainerExt for C {}
