//! Turn registrations into contract instances for the generated accessors.
//!
//! Every registration's constructor yields a `Box<Box<dyn Contract>>` erased to `Any`; the
//! delegates recover the inner box for the contract trait object `F` the accessor asks for.

use indexmap::IndexMap;

use crate::errors::LoadError;
use crate::loader::ServiceLoader;
use crate::registration::ProviderRegistration;

fn instantiate<F: ?Sized + 'static>(registration: &ProviderRegistration) -> Result<Box<F>, LoadError> {
    registration
        .instantiate()
        .downcast::<Box<F>>()
        .map(|boxed| *boxed)
        .map_err(|_| LoadError::TypeMismatch {
            contract: registration.contract().to_string(),
            provider: registration.provider().to_string(),
        })
}

/// Resolve the provider of a single-provider contract.
///
/// The first registration the loader reports wins.
///
/// ## Errors
/// - [`LoadError::NoProvider`] when nothing is registered for `contract`.
/// - [`LoadError::TypeMismatch`] when the registration does not build an `F`.
pub fn delegate<F: ?Sized + 'static>(loader: &dyn ServiceLoader, contract: &str) -> Result<Box<F>, LoadError> {
    let registrations = loader.load(contract);
    let first = registrations.first().ok_or_else(|| LoadError::NoProvider {
        contract: contract.to_string(),
    })?;
    instantiate::<F>(first)
}

/// Resolve every provider of a named contract, keyed by instance name (sorted by name).
///
/// An empty map is a valid result: named contracts may legitimately have no providers at runtime.
///
/// ## Errors
/// - [`LoadError::DuplicateName`] when two registrations share an instance name.
/// - [`LoadError::TypeMismatch`] when a registration does not build an `F`.
pub fn named_delegates<F: ?Sized + 'static>(
    loader: &dyn ServiceLoader,
    contract: &str,
) -> Result<IndexMap<String, Box<F>>, LoadError> {
    let mut out: IndexMap<String, Box<F>> = IndexMap::new();
    for registration in loader.load(contract) {
        let name = registration.instance_name();
        if out.contains_key(name) {
            return Err(LoadError::DuplicateName {
                contract: contract.to_string(),
                name: name.to_string(),
            });
        }
        out.insert(name.to_string(), instantiate::<F>(registration)?);
    }
    out.sort_keys();
    Ok(out)
}
