use crate::error::ProvisionError;
use crate::interfaces::container::Container;

/// Populates a container from a batch of providers.
pub trait ServiceLoader {
    /// Fails with [`ProvisionError::ProviderNotFound`] when a provider cannot be resolved.
    fn load_services(&self, container: &dyn Container) -> Result<(), ProvisionError>;
}
