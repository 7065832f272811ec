//! Code generator: resolved factory graph → artifacts and registry entries.
//!
//! Generation is a pure function of the graph. Per local contract it emits the contract trait,
//! its validator descriptor and its accessor; per accepted provider a wrapper; per namespace an
//! index that `include!`s the rest. Nothing here touches the filesystem.
//!
//! ## Module Organization
//!
//! - `interface` - contract traits
//! - `wrappers` - provider wrappers and their link-time registrations
//! - `validators` - validator descriptors
//! - `accessors` - `factory_*` / `factories_*` functions
//! - `index` - per-namespace `mod.rs`

mod accessors;
mod index;
mod interface;
mod validators;
mod wrappers;

use indexmap::IndexSet;
use inversion_core::{CanonicalName, keys, naming};

use crate::backend::artifact::Artifact;
use crate::backend::rust_emitter::{EmitError, PathResolver};
use crate::frontend::diagnostics::{DiagnosticSink, errors};
use crate::frontend::resolver::FactoryGraph;
use crate::registry::RegistryEntry;

/// Path the generated code uses to reach the runtime crate.
pub const DEFAULT_RUNTIME_PATH: &str = "::inversion_runtime";

/// Everything generated for one unit.
#[derive(Debug, Clone, Default)]
pub struct GeneratedUnit {
    pub artifacts: Vec<Artifact>,
    /// Entries this unit contributes to the registry.
    pub entries: Vec<RegistryEntry>,
}

impl GeneratedUnit {
    pub fn artifact(&self, name: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.name == name)
    }
}

/// Emits artifacts for one unit.
#[derive(Debug, Clone)]
pub struct CodeGenerator {
    resolver: PathResolver,
    runtime: syn::Path,
    emit_index: bool,
}

impl CodeGenerator {
    pub fn new(unit: impl Into<String>) -> Self {
        Self {
            resolver: PathResolver::new(unit),
            runtime: syn::parse_quote!(::inversion_runtime),
            emit_index: true,
        }
    }

    pub fn with_runtime_path(mut self, runtime: syn::Path) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn with_index(mut self, emit_index: bool) -> Self {
        self.emit_index = emit_index;
        self
    }

    /// Generate artifacts and registry entries.
    ///
    /// ## Errors
    ///
    /// [`EmitError`] only when an index over already-emitted artifacts cannot be built. A
    /// declaration whose names or type expressions do not parse is reported to `sink` as
    /// malformed and skipped, as is a provider whose wrapper name collides.
    #[tracing::instrument(skip_all, fields(unit = %self.resolver.unit()))]
    pub fn generate(&self, graph: &FactoryGraph<'_>, sink: &mut dyn DiagnosticSink) -> Result<GeneratedUnit, EmitError> {
        let mut out = GeneratedUnit::default();
        let mut taken: IndexSet<CanonicalName> = IndexSet::new();
        let mut skipped: IndexSet<CanonicalName> = IndexSet::new();

        for definition in graph.local_definitions() {
            let validator = naming::validator_name(&definition.name);
            let emitted = interface::emit(self, definition).and_then(|interface| {
                Ok([
                    interface,
                    validators::emit(self, definition)?,
                    accessors::emit(self, definition)?,
                ])
            });
            let artifacts = match emitted {
                Ok(artifacts) => artifacts,
                Err(e) => {
                    report_unemittable(sink, &definition.name.to_string(), &e, definition.location.as_ref());
                    skipped.insert(definition.name.clone());
                    continue;
                }
            };
            out.artifacts.extend(artifacts);

            taken.insert(definition.name.clone());
            taken.insert(validator.clone());
            out.entries.push(RegistryEntry::new(keys::validators_key(), validator));
            if definition.is_named {
                out.entries
                    .push(RegistryEntry::new(keys::named_contracts_key(), definition.name.clone()));
            }
        }

        for group in graph.groups() {
            if skipped.contains(&group.definition.name) {
                continue;
            }
            for provider in &group.providers {
                let base = provider
                    .namespace
                    .child(&naming::wrapper_name(&group.definition.name, &provider.instance_name));
                let wrapper = if !taken.contains(&base) {
                    base
                } else {
                    let fallback = base.sibling(&format!("{}_{}", base.simple_name(), provider.element));
                    if taken.contains(&fallback) {
                        sink.error(errors::name_collision(
                            &fallback,
                            &provider.qualified_element().to_string(),
                            provider.location.as_ref(),
                        ));
                        continue;
                    }
                    fallback
                };

                match wrappers::emit(self, group.definition, provider, &wrapper) {
                    Ok(artifact) => out.artifacts.push(artifact),
                    Err(e) => {
                        let element = provider.qualified_element().to_string();
                        report_unemittable(sink, &element, &e, provider.location.as_ref());
                        continue;
                    }
                }
                out.entries
                    .push(RegistryEntry::new(provider.contract.clone(), wrapper.clone()));
                taken.insert(wrapper);
            }
        }

        if self.emit_index {
            let indexes = index::emit(&out.artifacts)?;
            out.artifacts.extend(indexes);
        }

        tracing::debug!(
            artifacts = out.artifacts.len(),
            entries = out.entries.len(),
            "generated unit"
        );
        Ok(out)
    }

    pub(crate) fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub(crate) fn runtime(&self) -> &syn::Path {
        &self.runtime
    }
}

fn report_unemittable(
    sink: &mut dyn DiagnosticSink,
    element: &str,
    error: &EmitError,
    location: Option<&crate::frontend::declarations::Location>,
) {
    sink.error(errors::malformed_declaration(element, &error.to_string(), location));
}

/// Identifier for the i-th parameter of an invoke signature.
pub(crate) fn arg_ident(index: usize) -> syn::Ident {
    quote::format_ident!("arg{}", index)
}
