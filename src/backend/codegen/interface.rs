//! Contract traits.

use quote::quote;

use super::{CodeGenerator, arg_ident};
use crate::backend::artifact::{Artifact, ArtifactKind};
use crate::backend::rust_emitter::{EmitError, format_file, ident};
use crate::frontend::model::FactoryDefinition;

/// `pub trait <Result>_Factory: Send + Sync { fn invoke(&self, ..) -> Returns; }`
pub(super) fn emit(generator: &CodeGenerator, definition: &FactoryDefinition) -> Result<Artifact, EmitError> {
    let resolver = generator.resolver();
    let rt = generator.runtime();
    let name = ident(definition.name.simple_name())?;
    let returns = resolver.ty(&definition.returns)?;

    let mut params = Vec::new();
    if let Some(receiver) = &definition.receiver {
        let ty = resolver.ty(receiver)?;
        params.push(quote! { receiver: #ty });
    }
    for (i, param) in definition.params.iter().enumerate() {
        let ty = resolver.ty(param)?;
        let arg = arg_ident(i);
        params.push(quote! { #arg: #ty });
    }

    let supertraits = if definition.is_named {
        quote! { Send + Sync + #rt::NamedFactory }
    } else {
        quote! { Send + Sync }
    };
    let doc = format!(" Factory contract for `{}`.", definition.result);

    let tokens = quote! {
        #[doc = #doc]
        #[allow(non_camel_case_types)]
        pub trait #name: #supertraits {
            fn invoke(&self, #(#params),*) -> #returns;
        }
    };

    Ok(Artifact {
        namespace: definition.name.namespace().to_vec(),
        name: definition.name.simple_name().to_string(),
        kind: ArtifactKind::Interface,
        body: format_file(tokens)?,
    })
}
