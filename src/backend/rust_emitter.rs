//! Token helpers shared by the artifact emitters.
//!
//! Scanner-provided names and type expressions are strings; everything that ends up in generated
//! code goes through `syn` here so malformed input becomes an [`EmitError`] instead of broken
//! output. Paths owned by the unit being processed are rewritten to `crate::…`, every other
//! multi-segment path gets a leading `::`.

use inversion_core::CanonicalName;
use proc_macro2::TokenStream;
use syn::visit_mut::{self, VisitMut};
use thiserror::Error;

/// Error during artifact emission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmitError {
    #[error("cannot parse {what} '{input}': {message}")]
    SynParse {
        what: &'static str,
        input: String,
        message: String,
    },
}

fn syn_error<'a>(what: &'static str, input: &'a str) -> impl FnOnce(syn::Error) -> EmitError + 'a {
    move |e| EmitError::SynParse {
        what,
        input: input.to_string(),
        message: e.to_string(),
    }
}

/// Resolves scanner paths relative to the unit being generated.
#[derive(Debug, Clone)]
pub struct PathResolver {
    unit: String,
}

impl PathResolver {
    pub fn new(unit: impl Into<String>) -> Self {
        Self { unit: unit.into() }
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// `app::greet::Greeter` → `crate::greet::Greeter` (inside `app`) or `::app::greet::Greeter`.
    pub fn path(&self, name: &CanonicalName) -> Result<syn::Path, EmitError> {
        let rendered = if name.root() == self.unit {
            std::iter::once("crate")
                .chain(name.segments()[1..].iter().map(String::as_str))
                .collect::<Vec<_>>()
                .join("::")
        } else {
            format!("::{}", name)
        };
        syn::parse_str(&rendered).map_err(syn_error("path", &rendered))
    }

    /// Parse a type expression and re-root the paths it mentions.
    pub fn ty(&self, input: &str) -> Result<syn::Type, EmitError> {
        let mut ty: syn::Type = syn::parse_str(input).map_err(syn_error("type", input))?;
        let mut reroot = Reroot { unit: &self.unit };
        reroot.visit_type_mut(&mut ty);
        Ok(ty)
    }
}

/// Visitor applying the `crate::` / `::` rewrite to every path in a type.
struct Reroot<'a> {
    unit: &'a str,
}

impl Reroot<'_> {
    fn reroot(&self, path: &mut syn::Path) {
        if path.leading_colon.is_some() || path.segments.len() < 2 {
            return;
        }
        let first = path.segments[0].ident.to_string();
        if first == self.unit {
            path.segments[0].ident = syn::Ident::new("crate", path.segments[0].ident.span());
        } else if !matches!(first.as_str(), "crate" | "self" | "super" | "Self") {
            path.leading_colon = Some(Default::default());
        }
    }
}

impl VisitMut for Reroot<'_> {
    fn visit_type_path_mut(&mut self, node: &mut syn::TypePath) {
        // `<T as Trait>::Assoc` keeps its written form.
        if node.qself.is_none() {
            self.reroot(&mut node.path);
        }
        visit_mut::visit_type_path_mut(self, node);
    }

    fn visit_trait_bound_mut(&mut self, node: &mut syn::TraitBound) {
        self.reroot(&mut node.path);
        visit_mut::visit_trait_bound_mut(self, node);
    }
}

/// Parse an identifier, rejecting keywords.
pub fn ident(input: &str) -> Result<syn::Ident, EmitError> {
    syn::parse_str(input).map_err(syn_error("identifier", input))
}

/// Parse a path written as Rust source (`::inversion_runtime`).
pub fn parse_path(input: &str) -> Result<syn::Path, EmitError> {
    syn::parse_str(input).map_err(syn_error("path", input))
}

/// Whether a type is spelled `Box<..>`; type providers get boxed into such return types.
pub fn is_boxed(ty: &syn::Type) -> bool {
    matches!(ty, syn::Type::Path(p) if p.path.segments.last().is_some_and(|s| s.ident == "Box"))
}

/// Parse, pretty-print and prepend the version banner.
pub fn format_file(tokens: TokenStream) -> Result<String, EmitError> {
    let rendered = tokens.to_string();
    let file: syn::File = syn::parse2(tokens).map_err(|e| EmitError::SynParse {
        what: "generated file",
        input: rendered,
        message: e.to_string(),
    })?;
    Ok(format!(
        "// Generated by inversion v{}\n\n{}",
        crate::version::INVERSION_VERSION,
        prettyplease::unparse(&file)
    ))
}
