//! The service-loading capability: find the registrations for a contract.
//!
//! [`InventoryLoader`] sees everything linked into the current binary; [`StaticLoader`] is an
//! explicit in-memory list, used by tests and by tools that assemble registrations themselves.

use crate::registration::{ProviderRegistration, ValidatorRegistration};

/// Look up registrations by canonical contract name.
///
/// Results are unordered from the caller's point of view and may be empty.
pub trait ServiceLoader {
    fn load(&self, contract: &str) -> Vec<&ProviderRegistration>;

    fn validators(&self) -> Vec<&ValidatorRegistration>;
}

/// Loader over the registrations submitted with `inventory::submit!`.
#[derive(Debug, Default, Clone, Copy)]
pub struct InventoryLoader;

impl ServiceLoader for InventoryLoader {
    fn load(&self, contract: &str) -> Vec<&ProviderRegistration> {
        let mut found = Vec::new();
        for registration in inventory::iter::<ProviderRegistration> {
            if registration.contract() == contract {
                found.push(registration);
            }
        }
        found
    }

    fn validators(&self) -> Vec<&ValidatorRegistration> {
        let mut found = Vec::new();
        for registration in inventory::iter::<ValidatorRegistration> {
            found.push(registration);
        }
        found
    }
}

/// In-memory loader with an explicit registration list (insertion order is load order).
///
/// ## Examples
/// ```rust
/// use std::any::Any;
/// use inversion_runtime::{ProviderRegistration, ServiceLoader, StaticLoader};
///
/// fn build() -> Box<dyn Any + Send + Sync> {
///     Box::new(())
/// }
///
/// let loader = StaticLoader::new()
///     .with_provider(ProviderRegistration::new("app::Unit_Factory", "app::Unit_FactoryImpl", "", build));
/// assert_eq!(loader.load("app::Unit_Factory").len(), 1);
/// assert!(loader.load("app::Other_Factory").is_empty());
/// ```
#[derive(Debug, Default, Clone)]
pub struct StaticLoader {
    providers: Vec<ProviderRegistration>,
    validators: Vec<ValidatorRegistration>,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, registration: ProviderRegistration) -> Self {
        self.providers.push(registration);
        self
    }

    pub fn with_validator(mut self, registration: ValidatorRegistration) -> Self {
        self.validators.push(registration);
        self
    }

    pub fn register(&mut self, registration: ProviderRegistration) {
        self.providers.push(registration);
    }
}

impl ServiceLoader for StaticLoader {
    fn load(&self, contract: &str) -> Vec<&ProviderRegistration> {
        self.providers.iter().filter(|r| r.contract() == contract).collect()
    }

    fn validators(&self) -> Vec<&ValidatorRegistration> {
        self.validators.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any;

    use super::*;

    fn unit() -> Box<dyn Any + Send + Sync> {
        Box::new(())
    }

    #[test]
    fn test_static_loader_filters_by_contract() {
        let loader = StaticLoader::new()
            .with_provider(ProviderRegistration::new("a::X_Factory", "a::X_FactoryImpl", "", unit))
            .with_provider(ProviderRegistration::new("a::Y_Factory", "a::Y_FactoryImpl", "", unit))
            .with_provider(ProviderRegistration::new("a::X_Factory", "b::X_FactoryImpl", "", unit));

        let providers: Vec<_> = loader.load("a::X_Factory").iter().map(|r| r.provider()).collect();
        assert_eq!(providers, vec!["a::X_FactoryImpl", "b::X_FactoryImpl"]);
    }

    #[test]
    fn test_static_loader_validators() {
        let loader = StaticLoader::new().with_validator(ValidatorRegistration::new("a::X_Factory", "a::X"));
        assert_eq!(loader.validators().len(), 1);
        assert_eq!(loader.validators()[0].wrapped(), "a::X");
    }

    #[test]
    fn test_inventory_loader_is_empty_for_unknown_contract() {
        assert!(InventoryLoader.load("nobody::Nothing_Factory").is_empty());
    }
}
