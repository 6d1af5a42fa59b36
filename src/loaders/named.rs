use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, trace};

use crate::config::ProvisionConfig;
use crate::error::ProvisionError;
use crate::interfaces::container::Container;
use crate::interfaces::invoker::Invoker;
use crate::interfaces::loader::ServiceLoader;
use crate::loaders::factory::ProviderFactories;

/// Loads providers by identifier and hands each one to an [`Invoker`].
///
/// The loader only knows how to find and build providers. What registering
/// means is decided by the invoker, so the same loader drives any provider
/// convention:
///
/// ```rust
/// use iprovision::{invoker, BasicContainer, Container, ContainerExt, NamedServiceLoader,
///     ProviderFactories, ServiceLoader};
///
/// // Providers that don't implement ServiceProvider.
/// struct Routes(&'static str);
///
/// impl Routes {
///     fn install_into(&self, container: &dyn Container) {
///         container.set_value("routes", self.0.to_string());
///     }
/// }
///
/// let mut factories = ProviderFactories::<Routes>::new();
/// factories.insert("routes", || Ok(Box::new(Routes("/health"))));
///
/// let loader = NamedServiceLoader::new(
///     ["routes", "routes"],
///     factories,
///     invoker(|routes: Box<Routes>, container: &dyn Container| {
///         routes.install_into(container);
///         Ok(())
///     }),
/// );
///
/// let container = BasicContainer::new();
/// loader.load_services(&container).unwrap();
/// assert_eq!(*container.resolve::<String>("routes").unwrap(), "/health");
/// ```
pub struct NamedServiceLoader<P: ?Sized + 'static, I> {
    registry: Vec<String>,
    factories: Arc<ProviderFactories<P>>,
    invoker: I,
}

impl<P, I> NamedServiceLoader<P, I>
where
    P: ?Sized + 'static,
    I: Invoker<P>,
{
    /// Identifiers are not checked here; unknown ones fail on [`ServiceLoader::load_services`].
    pub fn new<S: Into<String>>(
        registry: impl IntoIterator<Item = S>,
        factories: impl Into<Arc<ProviderFactories<P>>>,
        invoker: I,
    ) -> Self {
        NamedServiceLoader {
            registry: registry.into_iter().map(Into::into).collect(),
            factories: factories.into(),
            invoker,
        }
    }

    /// Builds a loader from the `[provisioning] providers` list of `config`.
    pub fn from_config(
        config: &ProvisionConfig,
        factories: impl Into<Arc<ProviderFactories<P>>>,
        invoker: I,
    ) -> Result<Self, anyhow::Error> {
        Ok(Self::new(config.providers()?, factories, invoker))
    }

    /// Identifiers as supplied, duplicates included.
    pub fn registry(&self) -> &[String] {
        &self.registry
    }

    pub fn factories(&self) -> &Arc<ProviderFactories<P>> {
        &self.factories
    }

    pub fn invoker(&self) -> &I {
        &self.invoker
    }

    /// Identifiers in load order: first occurrence wins.
    pub fn unique_identifiers(&self) -> Vec<&str> {
        let mut seen = HashSet::with_capacity(self.registry.len());
        self.registry
            .iter()
            .map(String::as_str)
            .filter(|id| {
                let fresh = seen.insert(*id);
                if !fresh {
                    trace!(provider = *id, "skipping duplicate provider");
                }
                fresh
            })
            .collect()
    }
}

impl<P, I> ServiceLoader for NamedServiceLoader<P, I>
where
    P: ?Sized + 'static,
    I: Invoker<P>,
{
    fn load_services(&self, container: &dyn Container) -> Result<(), ProvisionError> {
        let identifiers = self.unique_identifiers();
        debug!(count = identifiers.len(), "loading service providers");

        for id in identifiers {
            let provider = self.factories.instantiate(id).map_err(|e| {
                if e.missing_provider().is_some() {
                    error!(provider = id, "provider is not registered");
                }
                e
            })?;

            debug!(provider = id, "invoking service provider");
            self.invoker.invoke(provider, container)?;
        }

        Ok(())
    }
}

impl<P: ?Sized + 'static, I> fmt::Debug for NamedServiceLoader<P, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedServiceLoader")
            .field("registry", &self.registry)
            .field("factories", &self.factories)
            .field("invoker", &format_args!("{}", std::any::type_name::<I>()))
            .finish()
    }
}
