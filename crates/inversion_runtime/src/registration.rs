//! Link-time registrations submitted by generated code.

use std::any::Any;

/// Builds a boxed contract instance (`Box<Box<dyn Contract>>` erased to `Any`).
pub type Constructor = fn() -> Box<dyn Any + Send + Sync>;

/// One provider of one contract, as submitted by a generated wrapper.
///
/// ## Examples
/// ```rust
/// use std::any::Any;
/// use inversion_runtime::ProviderRegistration;
///
/// fn build() -> Box<dyn Any + Send + Sync> {
///     Box::new(42_u32)
/// }
///
/// let reg = ProviderRegistration::new("app::Answer_Factory", "app::Answer_FactoryImpl", "", build);
/// assert_eq!(reg.contract(), "app::Answer_Factory");
/// assert!(reg.instance_name().is_empty());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ProviderRegistration {
    contract: &'static str,
    provider: &'static str,
    instance_name: &'static str,
    construct: Constructor,
}

impl ProviderRegistration {
    pub const fn new(
        contract: &'static str,
        provider: &'static str,
        instance_name: &'static str,
        construct: Constructor,
    ) -> Self {
        Self {
            contract,
            provider,
            instance_name,
            construct,
        }
    }

    pub fn contract(&self) -> &'static str {
        self.contract
    }

    pub fn provider(&self) -> &'static str {
        self.provider
    }

    /// Empty for the default provider of a non-named contract.
    pub fn instance_name(&self) -> &'static str {
        self.instance_name
    }

    pub fn instantiate(&self) -> Box<dyn Any + Send + Sync> {
        (self.construct)()
    }
}

inventory::collect!(ProviderRegistration);

/// A contract made known to the runtime by its generated validator descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorRegistration {
    contract: &'static str,
    wrapped: &'static str,
}

impl ValidatorRegistration {
    pub const fn new(contract: &'static str, wrapped: &'static str) -> Self {
        Self { contract, wrapped }
    }

    pub fn contract(&self) -> &'static str {
        self.contract
    }

    pub fn wrapped(&self) -> &'static str {
        self.wrapped
    }
}

inventory::collect!(ValidatorRegistration);
