//! Service provider registration for dependency injection containers.
//!
//! A [`ServiceProvider`] writes a group of related services into a [`Container`].
//! A [`ServiceLoader`] drives a batch of providers: [`NamedServiceLoader`] resolves
//! provider identifiers against a [`ProviderFactories`] map, builds each provider
//! once and hands it to an [`Invoker`] that performs the registration.
//!
//! ```rust
//! use iprovision::{
//!     BasicContainer, Container, ContainerExt, IProvider, NamedServiceLoader,
//!     ProviderFactories, ServiceLoader, ServiceProvider, ServiceProviderInvoker,
//! };
//!
//! #[derive(IProvider, Default)]
//! #[provider(name = "database")]
//! struct DatabaseProvider;
//!
//! impl ServiceProvider for DatabaseProvider {
//!     fn register(&self, container: &dyn Container) -> anyhow::Result<()> {
//!         container.set_value("database.url", String::from("postgres://localhost"));
//!         Ok(())
//!     }
//! }
//!
//! let mut factories = ProviderFactories::<dyn ServiceProvider>::new();
//! factories.register_default::<DatabaseProvider>();
//!
//! let loader = NamedServiceLoader::new(["database"], factories, ServiceProviderInvoker);
//! let container = BasicContainer::new();
//! loader.load_services(&container).unwrap();
//!
//! assert!(container.has("database.url"));
//! ```

pub mod config;
pub mod containers;
pub mod error;
pub mod interfaces;
pub mod invokers;
pub mod loaders;

pub use config::ProvisionConfig;
pub use containers::basic::BasicContainer;
pub use error::ContainerError;
pub use error::ProvisionError;
pub use interfaces::container::Container;
pub use interfaces::container::ContainerExt;
pub use interfaces::container::Service;
pub use interfaces::container::ServiceFactory;
pub use interfaces::invoker::invoker;
pub use interfaces::invoker::FnInvoker;
pub use interfaces::invoker::Invoker;
pub use interfaces::loader::ServiceLoader;
pub use interfaces::provider::Named;
pub use interfaces::provider::ServiceProvider;
pub use invokers::provider::ServiceProviderInvoker;
pub use loaders::factory::ProviderFactories;
pub use loaders::factory::ProviderFactory;
pub use loaders::named::NamedServiceLoader;

pub use iprovision_derives::IProvider;
