//! Errors raised while resolving providers at runtime.

use thiserror::Error;

/// Failure to turn registrations into contract instances.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("no provider registered for {contract}")]
    NoProvider { contract: String },

    #[error("provider {provider} does not produce a {contract}")]
    TypeMismatch { contract: String, provider: String },

    #[error("instance name '{name}' is registered twice for {contract}")]
    DuplicateName { contract: String, name: String },
}
