//! Deterministic name derivations shared by the processor and the runtime.
//!
//! Every derivation is a pure function of its inputs. In particular the contract name depends on
//! nothing but the result type, which is what makes registry fragments written by unrelated
//! crates mergeable.

use heck::ToSnakeCase;

use crate::CanonicalName;

/// Suffix appended to a result type's simple name to form its contract name.
pub const FACTORY_SUFFIX: &str = "_Factory";
/// Suffix appended to a contract's simple name to form a wrapper name.
pub const IMPL_SUFFIX: &str = "Impl";
/// Suffix appended to a contract's simple name to form its validator descriptor name.
pub const VALIDATOR_SUFFIX: &str = "Validator";

/// Derive the contract name for a result type.
///
/// ## Examples
/// ```rust
/// use inversion_core::{CanonicalName, naming};
///
/// let result = CanonicalName::parse("app::greet::Greeter").unwrap();
/// assert_eq!(naming::factory_name(&result).to_string(), "app::greet::Greeter_Factory");
/// ```
pub fn factory_name(result: &CanonicalName) -> CanonicalName {
    result.sibling(&format!("{}{}", result.simple_name(), FACTORY_SUFFIX))
}

/// Recover the result type from a contract name. `None` if `contract` is not a contract name.
pub fn result_of_factory(contract: &CanonicalName) -> Option<CanonicalName> {
    let simple = contract.simple_name().strip_suffix(FACTORY_SUFFIX)?;
    if simple.is_empty() {
        return None;
    }
    Some(contract.sibling(simple))
}

/// Derive the validator descriptor name for a contract (`Greeter_FactoryValidator`).
pub fn validator_name(contract: &CanonicalName) -> CanonicalName {
    contract.sibling(&format!("{}{}", contract.simple_name(), VALIDATOR_SUFFIX))
}

/// Recover the contract from a validator descriptor name.
pub fn contract_of_validator(validator: &CanonicalName) -> Option<CanonicalName> {
    let simple = validator.simple_name().strip_suffix(VALIDATOR_SUFFIX)?;
    if !simple.ends_with(FACTORY_SUFFIX) {
        return None;
    }
    Some(validator.sibling(simple))
}

/// Derive the simple name of a wrapper implementing `contract`.
///
/// Named providers get their instance name appended (sanitized to an identifier); the default
/// provider of a non-named contract gets no suffix.
///
/// ## Examples
/// ```rust
/// use inversion_core::{CanonicalName, naming};
///
/// let contract = CanonicalName::parse("app::Plugin_Factory").unwrap();
/// assert_eq!(naming::wrapper_name(&contract, ""), "Plugin_FactoryImpl");
/// assert_eq!(naming::wrapper_name(&contract, "my-plugin"), "Plugin_FactoryImpl_my_plugin");
/// ```
pub fn wrapper_name(contract: &CanonicalName, instance_name: &str) -> String {
    if instance_name.is_empty() {
        format!("{}{}", contract.simple_name(), IMPL_SUFFIX)
    } else {
        format!(
            "{}{}_{}",
            contract.simple_name(),
            IMPL_SUFFIX,
            sanitize_ident(instance_name)
        )
    }
}

/// Derive the accessor function name for a result type.
///
/// Single-provider contracts get `factory_<path>`, named contracts get `factories_<path>`, where
/// `<path>` is the snake-cased result path.
pub fn accessor_name(result: &CanonicalName, named: bool) -> String {
    let path = result
        .segments()
        .iter()
        .map(|s| s.to_snake_case())
        .collect::<Vec<_>>()
        .join("_");
    if named {
        format!("factories_{}", path)
    } else {
        format!("factory_{}", path)
    }
}

/// Map arbitrary text onto a Rust identifier fragment.
///
/// Characters outside `[A-Za-z0-9_]` become `_`; a leading digit gets a `_` prefix.
pub fn sanitize_ident(raw: &str) -> String {
    let mut out: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}
