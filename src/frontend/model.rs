//! Declaration model builder: raw scanner records → contracts and providers.
//!
//! Contracts are named after their result type (`<Result>_Factory`), so a provider in one crate
//! resolves a contract declared in another crate purely by the type it produces. The upstream
//! half of that lookup comes from the visible registry ([`upstream_definitions`]).

use indexmap::IndexMap;
use inversion_core::{CanonicalName, keys, naming};

use crate::frontend::declarations::{DeclarationKind, Location, ProviderShape, RawDeclaration, RawParam};
use crate::frontend::diagnostics::{DiagnosticSink, errors};
use crate::registry::Registry;

/// Where a contract definition came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractOrigin {
    /// Declared by the unit being processed.
    Local,
    /// Published by an upstream unit through the registry.
    Upstream,
}

/// A factory contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoryDefinition {
    pub name: CanonicalName,
    pub result: CanonicalName,
    /// Return type expression of `invoke`.
    pub returns: String,
    /// Parameter type expressions, receiver excluded.
    pub params: Vec<String>,
    pub receiver: Option<String>,
    pub is_named: bool,
    pub location: Option<Location>,
    pub origin: ContractOrigin,
}

impl FactoryDefinition {
    /// Full call signature: receiver first, then the parameters.
    pub fn signature(&self) -> Vec<&str> {
        self.receiver
            .iter()
            .map(String::as_str)
            .chain(self.params.iter().map(String::as_str))
            .collect()
    }

    pub fn is_local(&self) -> bool {
        self.origin == ContractOrigin::Local
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: String,
    pub receiver: bool,
}

impl From<&RawParam> for Param {
    fn from(raw: &RawParam) -> Self {
        Param {
            name: raw.name.clone(),
            ty: raw.ty.clone(),
            receiver: raw.receiver,
        }
    }
}

/// How a wrapper builds the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceExpr {
    /// `path(args..)`
    Call { path: CanonicalName },
    /// `receiver.method(args..)`
    ReceiverCall { method: String },
    /// `<Type as Default>::default()`
    Construct { ty: CanonicalName },
}

/// One concrete provider of a contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDeclaration {
    pub contract: CanonicalName,
    pub result: CanonicalName,
    pub returns: String,
    /// Empty for the default provider of a contract that is not named.
    pub instance_name: String,
    pub params: Vec<Param>,
    pub source: SourceExpr,
    /// Simple name of the annotated element.
    pub element: String,
    /// Module the wrapper is generated into.
    pub namespace: CanonicalName,
    pub location: Option<Location>,
}

impl ProviderDeclaration {
    pub fn qualified_element(&self) -> CanonicalName {
        self.namespace.child(&self.element)
    }
}

/// The declaration that designates the validation checkpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationMarker {
    pub element: String,
    pub location: Option<Location>,
}

/// Everything one unit declares, plus the upstream contracts it can see.
#[derive(Debug, Clone, Default)]
pub struct DeclarationModel {
    pub unit: String,
    pub factories: Vec<FactoryDefinition>,
    pub upstream: Vec<FactoryDefinition>,
    pub providers: Vec<ProviderDeclaration>,
    pub marker: Option<ValidationMarker>,
}

impl DeclarationModel {
    /// Find a contract by name, local definitions first.
    pub fn contract(&self, name: &CanonicalName) -> Option<&FactoryDefinition> {
        self.factories
            .iter()
            .chain(self.upstream.iter())
            .find(|def| &def.name == name)
    }
}

/// Reconstruct the contracts published by upstream units from the visible registry.
///
/// Validator descriptor entries name the contracts; the named-contracts entry flags which of them
/// resolve to keyed collections. Parameter shapes are not published, so upstream definitions
/// carry none.
pub fn upstream_definitions(registry: &Registry) -> Vec<FactoryDefinition> {
    let named: Vec<&CanonicalName> = registry.providers(&keys::named_contracts_key()).collect();
    registry
        .providers(&keys::validators_key())
        .filter_map(naming::contract_of_validator)
        .filter_map(|contract| {
            let result = naming::result_of_factory(&contract)?;
            let is_named = named.contains(&&contract);
            Some(FactoryDefinition {
                name: contract,
                returns: result.to_string(),
                result,
                params: Vec::new(),
                receiver: None,
                is_named,
                location: None,
                origin: ContractOrigin::Upstream,
            })
        })
        .collect()
}

fn normalize_ty(ty: &str) -> String {
    ty.chars().filter(|c| !c.is_whitespace()).collect()
}

fn single_segment(name: &str) -> Option<CanonicalName> {
    CanonicalName::parse(name).ok().filter(|n| n.segments().len() == 1)
}

/// Builds a [`DeclarationModel`] for one unit.
pub struct ModelBuilder {
    unit: String,
    upstream: Vec<FactoryDefinition>,
}

impl ModelBuilder {
    pub fn new(unit: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            upstream: Vec::new(),
        }
    }

    pub fn with_upstream(mut self, upstream: Vec<FactoryDefinition>) -> Self {
        self.upstream = upstream;
        self
    }

    #[tracing::instrument(skip_all, fields(unit = %self.unit, decl_count = declarations.len()))]
    pub fn build(self, declarations: &[RawDeclaration], sink: &mut dyn DiagnosticSink) -> DeclarationModel {
        let mut model = DeclarationModel {
            unit: self.unit.clone(),
            upstream: self.upstream.clone(),
            ..DeclarationModel::default()
        };

        // Contracts first so providers may appear before their contract in the manifest.
        let mut local: IndexMap<CanonicalName, FactoryDefinition> = IndexMap::new();
        for decl in declarations.iter().filter(|d| d.kind == DeclarationKind::Contract) {
            if let Some(def) = self.contract(decl, sink) {
                if let Some(existing) = local.get(&def.name) {
                    if existing.is_named != def.is_named {
                        sink.error(errors::malformed_declaration(
                            &decl.qualified_name(),
                            &format!("contract '{}' is declared both named and not named", def.name),
                            decl.location.as_ref(),
                        ));
                    } else {
                        sink.warn(
                            format!("contract '{}' is declared more than once", def.name),
                            decl.location.as_ref(),
                        );
                    }
                    continue;
                }
                local.insert(def.name.clone(), def);
            }
        }
        model.factories = local.into_values().collect();

        for decl in declarations.iter().filter(|d| d.kind == DeclarationKind::Provider) {
            if let Some(provider) = self.provider(decl, &model, sink) {
                model.providers.push(provider);
            }
        }

        for decl in declarations
            .iter()
            .filter(|d| d.kind == DeclarationKind::ValidationMarker)
        {
            if model.marker.is_some() {
                sink.warn(
                    format!(
                        "additional validation marker '{}' ignored; validation runs once per crate",
                        decl.qualified_name()
                    ),
                    decl.location.as_ref(),
                );
                continue;
            }
            model.marker = Some(ValidationMarker {
                element: decl.qualified_name(),
                location: decl.location.clone(),
            });
        }

        tracing::debug!(
            contracts = model.factories.len(),
            providers = model.providers.len(),
            "declaration model built"
        );
        model
    }

    fn result_type(&self, decl: &RawDeclaration, sink: &mut dyn DiagnosticSink) -> Option<CanonicalName> {
        let Some(raw) = decl.result.as_deref() else {
            sink.error(errors::malformed_declaration(
                &decl.qualified_name(),
                "missing result type",
                decl.location.as_ref(),
            ));
            return None;
        };
        match CanonicalName::parse(raw) {
            Ok(name) if name.namespace().is_empty() => {
                sink.error(errors::malformed_declaration(
                    &decl.qualified_name(),
                    &format!("result type '{}' is not crate-qualified", name),
                    decl.location.as_ref(),
                ));
                None
            }
            Ok(name) => Some(name),
            Err(e) => {
                sink.error(errors::malformed_declaration(
                    &decl.qualified_name(),
                    &e.to_string(),
                    decl.location.as_ref(),
                ));
                None
            }
        }
    }

    fn contract(&self, decl: &RawDeclaration, sink: &mut dyn DiagnosticSink) -> Option<FactoryDefinition> {
        let result = self.result_type(decl, sink)?;
        if decl.instance_name.is_some() {
            sink.warn(
                format!("instance name on contract '{}' ignored", decl.qualified_name()),
                decl.location.as_ref(),
            );
        }
        Some(FactoryDefinition {
            name: naming::factory_name(&result),
            returns: decl.returns.clone().unwrap_or_else(|| result.to_string()),
            result,
            params: decl.params.iter().filter(|p| !p.receiver).map(|p| p.ty.clone()).collect(),
            receiver: decl.receiver.clone(),
            is_named: decl.named,
            location: decl.location.clone(),
            origin: ContractOrigin::Local,
        })
    }

    fn provider(
        &self,
        decl: &RawDeclaration,
        model: &DeclarationModel,
        sink: &mut dyn DiagnosticSink,
    ) -> Option<ProviderDeclaration> {
        let location = decl.location.as_ref();
        let element = decl.qualified_name();
        let result = self.result_type(decl, sink)?;

        let contract_name = naming::factory_name(&result);
        let Some(def) = model.contract(&contract_name) else {
            sink.error(errors::unresolved_contract(&result, &element, location));
            return None;
        };

        let instance_name = decl.instance_name.clone().unwrap_or_default();
        if def.is_named == instance_name.is_empty() {
            sink.error(errors::invalid_instance_name(&def.name, &element, def.is_named, location));
            return None;
        }

        let namespace_raw = if decl.namespace.is_empty() {
            self.unit.as_str()
        } else {
            decl.namespace.as_str()
        };
        let namespace = match CanonicalName::parse(namespace_raw) {
            Ok(ns) => ns,
            Err(e) => {
                sink.error(errors::malformed_declaration(&element, &e.to_string(), location));
                return None;
            }
        };
        if single_segment(&decl.name).is_none() {
            sink.error(errors::malformed_declaration(
                &element,
                "element name is not an identifier",
                location,
            ));
            return None;
        }

        if decl.params.iter().skip(1).any(|p| p.receiver) {
            sink.error(errors::malformed_declaration(
                &element,
                "only the first parameter can be the receiver",
                location,
            ));
            return None;
        }

        let mut params: Vec<Param> = decl.params.iter().map(Param::from).collect();
        let source = match decl.shape {
            ProviderShape::Type => {
                if !params.is_empty() {
                    sink.warn(
                        format!("parameters of type provider '{}' are ignored", element),
                        location,
                    );
                    params.clear();
                }
                SourceExpr::Construct {
                    ty: namespace.child(&decl.name),
                }
            }
            ProviderShape::Function => match params.first() {
                Some(first) if first.receiver => SourceExpr::ReceiverCall {
                    method: decl.name.clone(),
                },
                _ => SourceExpr::Call {
                    path: namespace.child(&decl.name),
                },
            },
        };

        if def.is_local() {
            let expected: Vec<String> = def.signature().into_iter().map(normalize_ty).collect();
            let found: Vec<String> = params.iter().map(|p| normalize_ty(&p.ty)).collect();
            if expected != found {
                sink.warn(
                    format!(
                        "provider '{}' takes ({}) but contract '{}' expects ({})",
                        element,
                        found.join(", "),
                        def.name,
                        expected.join(", ")
                    ),
                    location,
                );
            }
        } else if decl.returns.is_none() {
            // Upstream contracts only publish their result path, not the written return type.
            sink.warn(
                format!(
                    "provider '{}' of upstream contract '{}' declares no return type; assuming '{}'",
                    element, def.name, def.returns
                ),
                location,
            );
        }

        Some(ProviderDeclaration {
            contract: def.name.clone(),
            returns: decl.returns.clone().unwrap_or_else(|| def.returns.clone()),
            result,
            instance_name,
            params,
            source,
            element: decl.name.clone(),
            namespace,
            location: decl.location.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::diagnostics::{Diagnostics, ErrorKind};
    use crate::registry::RegistryEntry;

    fn contract(result: &str, named: bool) -> RawDeclaration {
        RawDeclaration {
            kind: DeclarationKind::Contract,
            name: "factory".to_string(),
            namespace: "app".to_string(),
            result: Some(result.to_string()),
            returns: None,
            params: Vec::new(),
            receiver: None,
            named,
            instance_name: None,
            shape: ProviderShape::Function,
            location: None,
        }
    }

    fn provider(name: &str, result: &str, instance: Option<&str>) -> RawDeclaration {
        RawDeclaration {
            kind: DeclarationKind::Provider,
            name: name.to_string(),
            namespace: "app::impls".to_string(),
            result: Some(result.to_string()),
            returns: None,
            params: Vec::new(),
            receiver: None,
            named: false,
            instance_name: instance.map(str::to_string),
            shape: ProviderShape::Function,
            location: None,
        }
    }

    fn build(decls: &[RawDeclaration]) -> (DeclarationModel, Diagnostics) {
        let mut diags = Diagnostics::new();
        let model = ModelBuilder::new("app").build(decls, &mut diags);
        (model, diags)
    }

    #[test]
    fn test_contract_named_after_result_type() {
        let (model, diags) = build(&[contract("app::greet::Greeter", false)]);
        assert!(!diags.has_errors());
        assert_eq!(model.factories[0].name.to_string(), "app::greet::Greeter_Factory");
        assert!(model.factories[0].is_local());
    }

    #[test]
    fn test_provider_resolves_local_contract_regardless_of_order() {
        let (model, diags) = build(&[
            provider("make_greeter", "app::greet::Greeter", None),
            contract("app::greet::Greeter", false),
        ]);
        assert!(!diags.has_errors());
        let p = &model.providers[0];
        assert_eq!(p.contract.to_string(), "app::greet::Greeter_Factory");
        assert_eq!(
            p.source,
            SourceExpr::Call {
                path: CanonicalName::parse("app::impls::make_greeter").unwrap()
            }
        );
    }

    #[test]
    fn test_unresolved_contract() {
        let (model, diags) = build(&[provider("make", "app::Missing", None)]);
        assert!(model.providers.is_empty());
        assert_eq!(diags.count(ErrorKind::UnresolvedContract), 1);
    }

    #[test]
    fn test_provider_resolves_upstream_contract() {
        let mut registry = Registry::new();
        registry.insert(RegistryEntry::new(
            keys::validators_key(),
            CanonicalName::parse("base::Greeter_FactoryValidator").unwrap(),
        ));
        let upstream = upstream_definitions(&registry);
        assert_eq!(upstream.len(), 1);
        assert_eq!(upstream[0].origin, ContractOrigin::Upstream);

        let mut diags = Diagnostics::new();
        let model = ModelBuilder::new("app")
            .with_upstream(upstream)
            .build(&[provider("make", "base::Greeter", None)], &mut diags);
        assert!(!diags.has_errors());
        assert_eq!(model.providers[0].contract.to_string(), "base::Greeter_Factory");
    }

    #[test]
    fn test_upstream_provider_without_return_type_warns() {
        let mut registry = Registry::new();
        registry.insert(RegistryEntry::new(
            keys::validators_key(),
            CanonicalName::parse("base::Greeter_FactoryValidator").unwrap(),
        ));

        let mut explicit = provider("boxed", "base::Greeter", None);
        explicit.returns = Some("Box<dyn base::Greeter>".to_string());
        let mut diags = Diagnostics::new();
        let model = ModelBuilder::new("app")
            .with_upstream(upstream_definitions(&registry))
            .build(&[explicit], &mut diags);
        assert!(diags.warnings().is_empty(), "{:?}", diags.warnings());
        assert_eq!(model.providers[0].returns, "Box<dyn base::Greeter>");

        let mut diags = Diagnostics::new();
        let model = ModelBuilder::new("app")
            .with_upstream(upstream_definitions(&registry))
            .build(&[provider("bare", "base::Greeter", None)], &mut diags);
        assert!(!diags.has_errors());
        assert_eq!(diags.warnings().len(), 1);
        assert!(diags.warnings()[0].message.contains("declares no return type"));
        assert_eq!(model.providers[0].returns, "base::Greeter");
    }

    #[test]
    fn test_upstream_named_flag() {
        let mut registry = Registry::new();
        let contract = CanonicalName::parse("base::Plugin_Factory").unwrap();
        registry.insert(RegistryEntry::new(keys::validators_key(), naming::validator_name(&contract)));
        registry.insert(RegistryEntry::new(keys::named_contracts_key(), contract.clone()));
        let upstream = upstream_definitions(&registry);
        assert!(upstream[0].is_named);
    }

    #[test]
    fn test_instance_name_invariant() {
        let (model, diags) = build(&[
            contract("app::Plugin", true),
            contract("app::Greeter", false),
            provider("unnamed_plugin", "app::Plugin", None),
            provider("named_greeter", "app::Greeter", Some("x")),
        ]);
        assert!(model.providers.is_empty());
        assert_eq!(diags.count(ErrorKind::InvalidInstanceName), 2);
    }

    #[test]
    fn test_receiver_and_type_shapes() {
        let mut with_receiver = provider("greeter", "app::Greeter", None);
        with_receiver.params = vec![RawParam {
            name: "container".to_string(),
            ty: "&app::Container".to_string(),
            receiver: true,
        }];
        let mut as_type = provider("PoliteGreeter", "app::Polite", None);
        as_type.shape = ProviderShape::Type;

        let mut greeter = contract("app::Greeter", false);
        greeter.receiver = Some("& app::Container".to_string());

        let (model, diags) = build(&[greeter, contract("app::Polite", false), with_receiver, as_type]);
        assert!(!diags.has_errors());
        assert!(diags.warnings().is_empty(), "{:?}", diags.warnings());
        assert_eq!(
            model.providers[0].source,
            SourceExpr::ReceiverCall {
                method: "greeter".to_string()
            }
        );
        assert_eq!(
            model.providers[1].source,
            SourceExpr::Construct {
                ty: CanonicalName::parse("app::impls::PoliteGreeter").unwrap()
            }
        );
    }

    #[test]
    fn test_signature_mismatch_warns() {
        let mut p = provider("make", "app::Greeter", None);
        p.params = vec![RawParam {
            name: "prefix".to_string(),
            ty: "String".to_string(),
            receiver: false,
        }];
        let (model, diags) = build(&[contract("app::Greeter", false), p]);
        assert_eq!(model.providers.len(), 1);
        assert_eq!(diags.warnings().len(), 1);
    }

    #[test]
    fn test_missing_result_is_malformed() {
        let mut c = contract("app::X", false);
        c.result = None;
        let (model, diags) = build(&[c]);
        assert!(model.factories.is_empty());
        assert_eq!(diags.count(ErrorKind::MalformedDeclaration), 1);
    }

    #[test]
    fn test_duplicate_contract_collapses_and_second_marker_warns() {
        let marker = RawDeclaration {
            kind: DeclarationKind::ValidationMarker,
            ..contract("app::X", false)
        };
        let (model, diags) = build(&[
            contract("app::X", false),
            contract("app::X", false),
            marker.clone(),
            marker,
        ]);
        assert_eq!(model.factories.len(), 1);
        assert!(model.marker.is_some());
        assert_eq!(diags.warnings().len(), 2);
        assert!(!diags.has_errors());
    }
}
