//! Factory graph resolver: group providers by contract and enforce per-unit uniqueness.

use indexmap::IndexMap;
use inversion_core::CanonicalName;

use crate::frontend::diagnostics::{DiagnosticSink, errors};
use crate::frontend::model::{DeclarationModel, FactoryDefinition, ProviderDeclaration};

/// One contract with the providers this unit accepted for it.
#[derive(Debug, Clone)]
pub struct ContractGroup<'m> {
    pub definition: &'m FactoryDefinition,
    pub providers: Vec<&'m ProviderDeclaration>,
}

impl ContractGroup<'_> {
    pub fn instance_names(&self) -> impl Iterator<Item = &str> {
        self.providers.iter().map(|p| p.instance_name.as_str())
    }
}

/// Resolved contracts in declaration order.
#[derive(Debug, Clone, Default)]
pub struct FactoryGraph<'m> {
    groups: IndexMap<CanonicalName, ContractGroup<'m>>,
}

impl<'m> FactoryGraph<'m> {
    pub fn groups(&self) -> impl Iterator<Item = &ContractGroup<'m>> {
        self.groups.values()
    }

    pub fn group(&self, contract: &CanonicalName) -> Option<&ContractGroup<'m>> {
        self.groups.get(contract)
    }

    /// Every accepted provider, in group order.
    pub fn providers(&self) -> impl Iterator<Item = &'m ProviderDeclaration> + '_ {
        self.groups.values().flat_map(|g| g.providers.iter().copied())
    }

    /// Contracts declared by this unit.
    pub fn local_definitions(&self) -> impl Iterator<Item = &'m FactoryDefinition> + '_ {
        self.groups.values().map(|g| g.definition).filter(|d| d.is_local())
    }
}

/// Build the graph for a model, reporting per-unit conflicts.
///
/// Rejected providers are left out of their group; the first declaration wins.
#[tracing::instrument(skip_all, fields(unit = %model.unit))]
pub fn resolve<'m>(model: &'m DeclarationModel, sink: &mut dyn DiagnosticSink) -> FactoryGraph<'m> {
    let mut graph = FactoryGraph::default();
    for definition in &model.factories {
        graph.groups.insert(
            definition.name.clone(),
            ContractGroup {
                definition,
                providers: Vec::new(),
            },
        );
    }

    for provider in &model.providers {
        // The model only keeps providers whose contract it could resolve.
        let Some(definition) = model.contract(&provider.contract) else {
            continue;
        };
        let group = graph
            .groups
            .entry(definition.name.clone())
            .or_insert_with(|| ContractGroup {
                definition,
                providers: Vec::new(),
            });

        let element = provider.qualified_element().to_string();
        if definition.is_named {
            if group.instance_names().any(|n| n == provider.instance_name) {
                sink.error(errors::duplicate_provider_name(
                    &definition.name,
                    &provider.instance_name,
                    &element,
                    provider.location.as_ref(),
                ));
                continue;
            }
        } else if let Some(first) = group.providers.first() {
            sink.error(errors::ambiguous_provider(
                &definition.name,
                &element,
                &first.qualified_element().to_string(),
                provider.location.as_ref(),
            ));
            continue;
        }
        group.providers.push(provider);
    }

    tracing::debug!(contracts = graph.groups.len(), "factory graph resolved");
    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::declarations::{DeclarationKind, ProviderShape, RawDeclaration};
    use crate::frontend::diagnostics::{Diagnostics, ErrorKind};
    use crate::frontend::model::ModelBuilder;

    fn decl(kind: DeclarationKind, name: &str, result: &str, named: bool, instance: Option<&str>) -> RawDeclaration {
        RawDeclaration {
            kind,
            name: name.to_string(),
            namespace: "app".to_string(),
            result: Some(result.to_string()),
            returns: None,
            params: Vec::new(),
            receiver: None,
            named,
            instance_name: instance.map(str::to_string),
            shape: ProviderShape::Function,
            location: None,
        }
    }

    fn model(decls: &[RawDeclaration]) -> (DeclarationModel, Diagnostics) {
        let mut diags = Diagnostics::new();
        let model = ModelBuilder::new("app").build(decls, &mut diags);
        (model, diags)
    }

    #[test]
    fn test_empty_contract_still_has_group() {
        let (model, mut diags) = model(&[decl(DeclarationKind::Contract, "f", "app::Greeter", false, None)]);
        let graph = resolve(&model, &mut diags);
        let group = graph
            .group(&CanonicalName::parse("app::Greeter_Factory").unwrap())
            .unwrap();
        assert!(group.providers.is_empty());
        assert_eq!(graph.local_definitions().count(), 1);
    }

    #[test]
    fn test_second_provider_is_ambiguous() {
        let (model, mut diags) = model(&[
            decl(DeclarationKind::Contract, "f", "app::Greeter", false, None),
            decl(DeclarationKind::Provider, "first", "app::Greeter", false, None),
            decl(DeclarationKind::Provider, "second", "app::Greeter", false, None),
        ]);
        let graph = resolve(&model, &mut diags);
        assert_eq!(diags.count(ErrorKind::AmbiguousProvider), 1);
        let kept: Vec<_> = graph.providers().map(|p| p.element.as_str()).collect();
        assert_eq!(kept, vec!["first"]);
    }

    #[test]
    fn test_named_contract_requires_distinct_names() {
        let (model, mut diags) = model(&[
            decl(DeclarationKind::Contract, "f", "app::Plugin", true, None),
            decl(DeclarationKind::Provider, "pa", "app::Plugin", false, Some("a")),
            decl(DeclarationKind::Provider, "pb", "app::Plugin", false, Some("b")),
            decl(DeclarationKind::Provider, "pa2", "app::Plugin", false, Some("a")),
        ]);
        let graph = resolve(&model, &mut diags);
        assert_eq!(diags.count(ErrorKind::DuplicateProviderName), 1);
        let group = graph.groups().next().unwrap();
        assert_eq!(group.instance_names().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
