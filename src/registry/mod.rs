//! Cross-unit registry: contract → provider names.
//!
//! Registry entries are the only state that crosses crate boundaries. Each crate writes its own
//! partition ([`RegistryStore::write`]); readers union every visible partition.

pub mod resource;
pub mod store;

use indexmap::{IndexMap, IndexSet};
use inversion_core::{CanonicalName, keys};

pub use store::{RegistryError, RegistryStore};

/// One `(contract, provider)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistryEntry {
    pub contract: CanonicalName,
    pub provider: CanonicalName,
}

impl RegistryEntry {
    pub fn new(contract: CanonicalName, provider: CanonicalName) -> Self {
        Self { contract, provider }
    }
}

/// Contract → discovery-ordered, deduplicated provider names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    entries: IndexMap<CanonicalName, IndexSet<CanonicalName>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry. Returns `false` if it was already present.
    pub fn insert(&mut self, entry: RegistryEntry) -> bool {
        self.entries.entry(entry.contract).or_default().insert(entry.provider)
    }

    /// Record a key with no providers yet (keeps empty local contracts visible in listings).
    pub fn touch(&mut self, contract: CanonicalName) {
        self.entries.entry(contract).or_default();
    }

    pub fn merge(&mut self, other: Registry) {
        for (contract, providers) in other.entries {
            self.entries.entry(contract).or_default().extend(providers);
        }
    }

    pub fn providers(&self, contract: &CanonicalName) -> impl Iterator<Item = &CanonicalName> {
        self.entries.get(contract).into_iter().flatten()
    }

    /// Every key, reserved metadata keys included.
    pub fn keys(&self) -> impl Iterator<Item = &CanonicalName> {
        self.entries.keys()
    }

    /// Contract keys only.
    pub fn contracts(&self) -> impl Iterator<Item = &CanonicalName> {
        self.entries.keys().filter(|k| !keys::is_reserved(k))
    }

    pub fn entries(&self) -> impl Iterator<Item = RegistryEntry> + '_ {
        self.entries.iter().flat_map(|(contract, providers)| {
            providers
                .iter()
                .map(move |p| RegistryEntry::new(contract.clone(), p.clone()))
        })
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(IndexSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn groups(&self) -> impl Iterator<Item = (&CanonicalName, &IndexSet<CanonicalName>)> {
        self.entries.iter()
    }
}

impl FromIterator<RegistryEntry> for Registry {
    fn from_iter<T: IntoIterator<Item = RegistryEntry>>(iter: T) -> Self {
        let mut registry = Registry::new();
        for entry in iter {
            registry.insert(entry);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(contract: &str, provider: &str) -> RegistryEntry {
        RegistryEntry::new(
            CanonicalName::parse(contract).unwrap(),
            CanonicalName::parse(provider).unwrap(),
        )
    }

    #[test]
    fn test_insert_deduplicates() {
        let mut registry = Registry::new();
        assert!(registry.insert(entry("app::G_Factory", "app::G_FactoryImpl")));
        assert!(!registry.insert(entry("app::G_Factory", "app::G_FactoryImpl")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_merge_keeps_discovery_order() {
        let mut a: Registry = [entry("app::P_Factory", "a::X")].into_iter().collect();
        let b: Registry = [entry("app::P_Factory", "b::Y"), entry("app::P_Factory", "a::X")]
            .into_iter()
            .collect();
        a.merge(b);
        let providers: Vec<String> = a
            .providers(&CanonicalName::parse("app::P_Factory").unwrap())
            .map(ToString::to_string)
            .collect();
        assert_eq!(providers, vec!["a::X", "b::Y"]);
    }

    #[test]
    fn test_contracts_exclude_reserved_keys() {
        let registry: Registry = [
            entry("app::G_Factory", "app::G_FactoryImpl"),
            RegistryEntry::new(
                keys::validators_key(),
                CanonicalName::parse("app::G_FactoryValidator").unwrap(),
            ),
        ]
        .into_iter()
        .collect();
        assert_eq!(registry.keys().count(), 2);
        assert_eq!(registry.contracts().count(), 1);
    }
}
