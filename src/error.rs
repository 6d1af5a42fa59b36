use thiserror::Error;

/// Errors surfaced by a [`ServiceLoader`](crate::ServiceLoader).
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// No factory is registered under the identifier.
    #[error("provider \"{0}\" was not found to be real or loadable")]
    ProviderNotFound(String),

    /// Failure raised while constructing or invoking a provider, passed through as-is.
    #[error(transparent)]
    Provider(#[from] anyhow::Error),
}

/// Errors surfaced by [`Container`](crate::Container) lookups.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("no service registered under \"{0}\"")]
    NotFound(String),

    #[error("service \"{key}\" is not of type {expected}")]
    TypeMismatch { key: String, expected: &'static str },

    #[error("service \"{0}\" depends on itself")]
    Cycle(String),

    #[error("failed to build service \"{key}\"")]
    Factory {
        key: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ProvisionError {
    /// The identifier that could not be resolved, if that is what failed.
    pub fn missing_provider(&self) -> Option<&str> {
        match self {
            ProvisionError::ProviderNotFound(id) => Some(id),
            ProvisionError::Provider(_) => None,
        }
    }
}
