//! Dependency validator.
//!
//! Runs at the crate carrying the validation marker, after that crate's own registry entries are
//! written. Every visible contract must have at least one visible provider, either in the
//! registry or registered with the runtime loader.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use inversion_core::{CanonicalName, keys, naming};
use inversion_runtime::ServiceLoader;

use crate::frontend::diagnostics::{DiagnosticSink, errors};
use crate::frontend::model::{FactoryDefinition, ValidationMarker};
use crate::registry::{Registry, RegistryError, RegistryStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Satisfied {
        contract: CanonicalName,
        providers: BTreeSet<CanonicalName>,
    },
    Unsatisfied {
        contract: CanonicalName,
        wrapped: CanonicalName,
    },
}

impl ValidationResult {
    pub fn contract(&self) -> &CanonicalName {
        match self {
            ValidationResult::Satisfied { contract, .. } | ValidationResult::Unsatisfied { contract, .. } => contract,
        }
    }

    pub fn is_satisfied(&self) -> bool {
        matches!(self, ValidationResult::Satisfied { .. })
    }
}

/// Outcome of one validation pass, one result per checked contract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub results: Vec<ValidationResult>,
}

impl ValidationReport {
    pub fn is_success(&self) -> bool {
        self.results.iter().all(ValidationResult::is_satisfied)
    }

    pub fn unsatisfied(&self) -> impl Iterator<Item = &ValidationResult> {
        self.results.iter().filter(|r| !r.is_satisfied())
    }
}

pub struct DependencyValidator<'a> {
    store: &'a RegistryStore,
    loader: &'a dyn ServiceLoader,
    pending: Option<&'a Registry>,
}

impl<'a> DependencyValidator<'a> {
    pub fn new(store: &'a RegistryStore, loader: &'a dyn ServiceLoader) -> Self {
        Self {
            store,
            loader,
            pending: None,
        }
    }

    /// Treat `entries` as already written (dry runs validate without touching the registry).
    pub fn with_pending(mut self, entries: &'a Registry) -> Self {
        self.pending = Some(entries);
        self
    }

    fn pending_providers(&self, key: &CanonicalName) -> impl Iterator<Item = &CanonicalName> {
        self.pending.into_iter().flat_map(move |registry| registry.providers(key))
    }

    /// Contracts that must be satisfied, mapped to the result type they wrap.
    ///
    /// Local definitions first, then contracts announced through the registry, then contracts
    /// whose validators are registered with the runtime.
    pub fn checked_contracts(
        &self,
        local: &[FactoryDefinition],
    ) -> Result<IndexMap<CanonicalName, CanonicalName>, RegistryError> {
        let mut contracts: IndexMap<CanonicalName, CanonicalName> = local
            .iter()
            .map(|def| (def.name.clone(), def.result.clone()))
            .collect();

        let mut validators = self.store.read_visible(&keys::validators_key())?;
        validators.extend(self.pending_providers(&keys::validators_key()).cloned());
        for validator in validators {
            let Some(contract) = naming::contract_of_validator(&validator) else {
                tracing::warn!(%validator, "registry lists a validator that names no contract");
                continue;
            };
            if let Some(wrapped) = naming::result_of_factory(&contract) {
                contracts.entry(contract).or_insert(wrapped);
            }
        }

        for registration in self.loader.validators() {
            match (
                CanonicalName::parse(registration.contract()),
                CanonicalName::parse(registration.wrapped()),
            ) {
                (Ok(contract), Ok(wrapped)) => {
                    contracts.entry(contract).or_insert(wrapped);
                }
                _ => tracing::warn!(contract = registration.contract(), "ignoring malformed runtime validator"),
            }
        }
        Ok(contracts)
    }

    /// Providers of `contract` visible from the registry or the runtime loader.
    pub fn providers(&self, contract: &CanonicalName) -> Result<BTreeSet<CanonicalName>, RegistryError> {
        let mut providers = self.store.read_visible(contract)?;
        providers.extend(self.pending_providers(contract).cloned());
        let key = contract.to_string();
        providers.extend(
            self.loader
                .load(&key)
                .into_iter()
                .filter_map(|r| CanonicalName::parse(r.provider()).ok()),
        );
        Ok(providers)
    }

    /// Check every visible contract, reporting each unsatisfied one at the marker.
    ///
    /// All violations are reported; the pass never stops at the first.
    #[tracing::instrument(skip_all, fields(marker = %marker.element))]
    pub fn validate(
        &self,
        local: &[FactoryDefinition],
        marker: &ValidationMarker,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<ValidationReport, RegistryError> {
        let mut report = ValidationReport::default();
        for (contract, wrapped) in self.checked_contracts(local)? {
            let providers = self.providers(&contract)?;
            if providers.is_empty() {
                sink.error(errors::unsatisfied_contract(&contract, &wrapped, marker.location.as_ref()));
                report.results.push(ValidationResult::Unsatisfied { contract, wrapped });
            } else {
                tracing::debug!(%contract, providers = providers.len(), "contract satisfied");
                report.results.push(ValidationResult::Satisfied { contract, providers });
            }
        }
        Ok(report)
    }
}
