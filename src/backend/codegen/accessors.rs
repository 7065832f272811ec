//! Accessor functions, the call sites application code uses instead of naming providers.

use inversion_core::naming;
use quote::quote;

use super::CodeGenerator;
use crate::backend::artifact::{Artifact, ArtifactKind};
use crate::backend::rust_emitter::{EmitError, format_file, ident};
use crate::frontend::model::FactoryDefinition;

pub(super) fn emit(generator: &CodeGenerator, definition: &FactoryDefinition) -> Result<Artifact, EmitError> {
    let rt = generator.runtime();
    let accessor = naming::accessor_name(&definition.result, definition.is_named);
    let name = ident(&accessor)?;
    let contract = generator.resolver().path(&definition.name)?;
    let key = definition.name.to_string();

    let tokens = if definition.is_named {
        let doc = format!(" Every `{}` provider visible at runtime, keyed by instance name.", definition.result);
        quote! {
            #[doc = #doc]
            pub fn #name() -> ::core::result::Result<
                #rt::indexmap::IndexMap<::std::string::String, ::std::boxed::Box<dyn #contract>>,
                #rt::LoadError,
            > {
                #rt::named_delegates::<dyn #contract>(&#rt::InventoryLoader, #key)
            }
        }
    } else {
        let doc = format!(" The `{}` provider visible at runtime.", definition.result);
        quote! {
            #[doc = #doc]
            pub fn #name() -> ::core::result::Result<::std::boxed::Box<dyn #contract>, #rt::LoadError> {
                #rt::delegate::<dyn #contract>(&#rt::InventoryLoader, #key)
            }
        }
    };

    Ok(Artifact {
        namespace: definition.name.namespace().to_vec(),
        name: accessor,
        kind: ArtifactKind::Function,
        body: format_file(tokens)?,
    })
}
