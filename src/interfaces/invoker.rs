use core::fmt;
use std::sync::Arc;

use crate::interfaces::container::Container;

/// Strategy deciding how an instantiated provider installs its services.
pub trait Invoker<P: ?Sized> {
    fn invoke(&self, provider: Box<P>, container: &dyn Container) -> anyhow::Result<()>;
}

impl<'a, P, T> Invoker<P> for &'a T
where
    P: ?Sized,
    T: ?Sized + Invoker<P>,
{
    fn invoke(&self, provider: Box<P>, container: &dyn Container) -> anyhow::Result<()> {
        (**self).invoke(provider, container)
    }
}

impl<P, T> Invoker<P> for Arc<T>
where
    P: ?Sized,
    T: ?Sized + Invoker<P>,
{
    fn invoke(&self, provider: Box<P>, container: &dyn Container) -> anyhow::Result<()> {
        (**self).invoke(provider, container)
    }
}

/// Wraps a closure as an [`Invoker`].
pub fn invoker<F, P>(f: F) -> FnInvoker<F>
where
    P: ?Sized,
    F: Fn(Box<P>, &dyn Container) -> anyhow::Result<()>,
{
    FnInvoker::new(f)
}

#[derive(Clone)]
pub struct FnInvoker<F> {
    func: F,
}

impl<F> FnInvoker<F> {
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> fmt::Debug for FnInvoker<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnInvoker")
            .field("f", &format_args!("{}", std::any::type_name::<F>()))
            .finish()
    }
}

impl<F, P> Invoker<P> for FnInvoker<F>
where
    P: ?Sized,
    F: Fn(Box<P>, &dyn Container) -> anyhow::Result<()>,
{
    fn invoke(&self, provider: Box<P>, container: &dyn Container) -> anyhow::Result<()> {
        (self.func)(provider, container)
    }
}
