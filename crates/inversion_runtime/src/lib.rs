//! Runtime support for Inversion-generated factory wiring.
//!
//! Generated code depends on this crate for three things: link-time registration of providers
//! and validator descriptors ([`ProviderRegistration`], [`ValidatorRegistration`]), the
//! service-loading capability that finds them again ([`ServiceLoader`]), and the delegates the
//! generated accessors call ([`delegate`], [`named_delegates`]).
//!
//! The processor consults the same [`ServiceLoader`] at its validation checkpoint, so providers
//! registered by hand (never declared through a manifest) still satisfy their contracts.

#![deny(clippy::unwrap_used)]

pub mod delegates;
pub mod errors;
pub mod loader;
pub mod registration;

pub use delegates::{delegate, named_delegates};
pub use errors::LoadError;
pub use loader::{InventoryLoader, ServiceLoader, StaticLoader};
pub use registration::{Constructor, ProviderRegistration, ValidatorRegistration};

// Generated code submits registrations through these re-exports so consumers only depend on us.
pub use indexmap;
pub use inventory;

/// Capability of a provider that belongs to a named contract.
///
/// Generated wrappers for named contracts implement this with their instance name, and named
/// contract traits list it as a supertrait.
pub trait NamedFactory {
    fn name(&self) -> &'static str;
}

/// Descriptor generated once per contract so the validation checkpoint can find it.
pub trait InversionValidator {
    /// Canonical contract name (`app::greet::Greeter_Factory`).
    fn factory_name(&self) -> &'static str;
    /// Canonical name of the type the contract produces (`app::greet::Greeter`).
    fn wrapped_name(&self) -> &'static str;
}
