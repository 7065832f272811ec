//! Reserved registry keys and resource locations.
//!
//! Besides contract → provider entries, every crate publishes two metadata lists through the
//! same registry so downstream crates can discover upstream contracts exactly the way they
//! discover providers.

use crate::CanonicalName;

/// Registry key listing the validator descriptors of every declared contract.
pub const VALIDATORS_KEY: &str = "inversion::internal::InversionValidator";

/// Registry key listing the contracts that resolve to a keyed collection of providers.
pub const NAMED_CONTRACTS_KEY: &str = "inversion::internal::NamedFactory";

/// Directory, relative to a registry root, holding one resource per key.
pub const SERVICES_DIR: &str = "inversion/services";

/// Canonical form of [`VALIDATORS_KEY`].
pub fn validators_key() -> CanonicalName {
    CanonicalName::from_segments(VALIDATORS_KEY.split("::")).expect("INVARIANT: reserved registry keys are valid canonical names")
}

/// Canonical form of [`NAMED_CONTRACTS_KEY`].
pub fn named_contracts_key() -> CanonicalName {
    CanonicalName::from_segments(NAMED_CONTRACTS_KEY.split("::")).expect("INVARIANT: reserved registry keys are valid canonical names")
}

/// Whether `key` is one of the reserved metadata keys rather than a contract.
pub fn is_reserved(key: &CanonicalName) -> bool {
    let rendered = key.to_string();
    rendered == VALIDATORS_KEY || rendered == NAMED_CONTRACTS_KEY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_keys_parse() {
        assert_eq!(validators_key().to_string(), VALIDATORS_KEY);
        assert_eq!(named_contracts_key().to_string(), NAMED_CONTRACTS_KEY);
        assert!(is_reserved(&validators_key()));
        assert!(!is_reserved(&CanonicalName::parse("app::Greeter_Factory").unwrap()));
    }
}
