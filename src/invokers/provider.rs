use crate::interfaces::container::Container;
use crate::interfaces::invoker::Invoker;
use crate::interfaces::provider::ServiceProvider;

/// Invokes [`ServiceProvider::register`] on each provider handed to it.
///
/// Stateless, so one instance can be shared by any number of loaders:
///
/// ```rust
/// use iprovision::{
///     BasicContainer, Container, ContainerExt, NamedServiceLoader, ProviderFactories,
///     ServiceLoader, ServiceProvider, ServiceProviderInvoker,
/// };
///
/// #[derive(Default)]
/// struct ClockProvider;
///
/// impl ServiceProvider for ClockProvider {
///     fn register(&self, container: &dyn Container) -> anyhow::Result<()> {
///         container.set_value("clock.timezone", String::from("UTC"));
///         Ok(())
///     }
/// }
///
/// let mut factories = ProviderFactories::<dyn ServiceProvider>::new();
/// factories.insert("clock", || Ok(Box::new(ClockProvider) as Box<dyn ServiceProvider>));
///
/// let loader = NamedServiceLoader::new(["clock"], factories, ServiceProviderInvoker);
/// let container = BasicContainer::new();
/// loader.load_services(&container).unwrap();
///
/// assert_eq!(*container.resolve::<String>("clock.timezone").unwrap(), "UTC");
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ServiceProviderInvoker;

impl<P> Invoker<P> for ServiceProviderInvoker
where
    P: ServiceProvider + ?Sized,
{
    fn invoke(&self, provider: Box<P>, container: &dyn Container) -> anyhow::Result<()> {
        provider.register(container)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containers::basic::BasicContainer;
    use crate::interfaces::container::ContainerExt;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct RecordingProvider {
        calls: Rc<RefCell<Vec<*const ()>>>,
    }

    impl ServiceProvider for RecordingProvider {
        fn register(&self, container: &dyn Container) -> anyhow::Result<()> {
            self.calls
                .borrow_mut()
                .push(container as *const _ as *const ());
            Ok(())
        }
    }

    struct FailingProvider;

    impl ServiceProvider for FailingProvider {
        fn register(&self, _container: &dyn Container) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("database unreachable"))
        }
    }

    #[test]
    fn test_register_called_once_with_container() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let provider = RecordingProvider { calls: Rc::clone(&calls) };
        let container = BasicContainer::new();

        ServiceProviderInvoker
            .invoke(Box::new(provider), &container)
            .unwrap();

        let expected = &container as *const BasicContainer as *const ();
        assert_eq!(*calls.borrow(), vec![expected]);
    }

    #[test]
    fn test_invoke_trait_object() {
        struct ValueProvider;

        impl ServiceProvider for ValueProvider {
            fn register(&self, container: &dyn Container) -> anyhow::Result<()> {
                container.set_value("value", 7u8);
                Ok(())
            }
        }

        let container = BasicContainer::new();
        let provider: Box<dyn ServiceProvider> = Box::new(ValueProvider);
        ServiceProviderInvoker.invoke(provider, &container).unwrap();

        assert_eq!(*container.resolve::<u8>("value").unwrap(), 7);
    }

    #[test]
    fn test_register_error_is_unchanged() {
        let container = BasicContainer::new();
        let err = ServiceProviderInvoker
            .invoke(Box::new(FailingProvider), &container)
            .unwrap_err();
        assert_eq!(err.to_string(), "database unreachable");
    }
}
