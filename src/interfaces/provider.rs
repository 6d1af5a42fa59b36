use crate::interfaces::container::Container;

/// Registers a group of related services into a container.
///
/// ```rust
/// use iprovision::{BasicContainer, Container, ContainerExt, ServiceProvider};
///
/// struct GreetingProvider;
///
/// impl ServiceProvider for GreetingProvider {
///     fn register(&self, container: &dyn Container) -> anyhow::Result<()> {
///         container.set_value("greeting", String::from("hello"));
///         Ok(())
///     }
/// }
///
/// let container = BasicContainer::new();
/// GreetingProvider.register(&container).unwrap();
/// assert_eq!(*container.resolve::<String>("greeting").unwrap(), "hello");
/// ```
pub trait ServiceProvider {
    fn register(&self, container: &dyn Container) -> anyhow::Result<()>;
}

/// The identifier a provider type is registered under in a factory map.
///
/// Usually derived with `#[derive(IProvider)]`.
pub trait Named {
    const NAME: &'static str;
}
