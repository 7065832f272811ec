//! Provider wrappers.
//!
//! A wrapper is a unit struct implementing the contract trait by forwarding to the provider. It
//! registers itself at link time so the runtime loader finds it without any central list.

use inversion_core::CanonicalName;
use quote::quote;

use super::{CodeGenerator, arg_ident};
use crate::backend::artifact::{Artifact, ArtifactKind};
use crate::backend::rust_emitter::{EmitError, format_file, ident, is_boxed};
use crate::frontend::model::{FactoryDefinition, ProviderDeclaration, SourceExpr};

pub(super) fn emit(
    generator: &CodeGenerator,
    definition: &FactoryDefinition,
    provider: &ProviderDeclaration,
    wrapper: &CanonicalName,
) -> Result<Artifact, EmitError> {
    let resolver = generator.resolver();
    let rt = generator.runtime();
    let name = ident(wrapper.simple_name())?;
    let contract = resolver.path(&provider.contract)?;
    let returns = resolver.ty(&provider.returns)?;

    let receiver = quote::format_ident!("receiver");
    let mut params = Vec::new();
    let mut args = Vec::new();
    for (i, param) in provider.params.iter().enumerate() {
        let ty = resolver.ty(&param.ty)?;
        if param.receiver {
            params.push(quote! { #receiver: #ty });
            continue;
        }
        // Keep the provider's own parameter names when they are plain identifiers.
        let arg = ident(&param.name).unwrap_or_else(|_| arg_ident(i));
        params.push(quote! { #arg: #ty });
        args.push(arg);
    }

    let body = match &provider.source {
        SourceExpr::Call { path } => {
            let path = resolver.path(path)?;
            quote! { #path(#(#args),*) }
        }
        SourceExpr::ReceiverCall { method } => {
            let method = ident(method)?;
            quote! { #receiver.#method(#(#args),*) }
        }
        SourceExpr::Construct { ty } => {
            let ty = resolver.path(ty)?;
            let value = quote! { <#ty as ::core::default::Default>::default() };
            if is_boxed(&returns) {
                quote! { ::std::boxed::Box::new(#value) }
            } else {
                value
            }
        }
    };

    let named_impl = definition.is_named.then(|| {
        let instance = &provider.instance_name;
        quote! {
            impl #rt::NamedFactory for #name {
                fn name(&self) -> &'static str {
                    #instance
                }
            }
        }
    });

    let doc = format!(" Wraps `{}` as `{}`.", provider.qualified_element(), provider.contract);
    let contract_key = provider.contract.to_string();
    let provider_key = wrapper.to_string();
    let instance = &provider.instance_name;

    let tokens = quote! {
        #[doc = #doc]
        #[allow(non_camel_case_types)]
        pub struct #name;

        impl #contract for #name {
            fn invoke(&self, #(#params),*) -> #returns {
                #body
            }
        }

        #named_impl

        impl #name {
            #[doc(hidden)]
            pub fn __construct() -> ::std::boxed::Box<dyn ::core::any::Any + ::core::marker::Send + ::core::marker::Sync> {
                ::std::boxed::Box::new(::std::boxed::Box::new(#name) as ::std::boxed::Box<dyn #contract>)
            }
        }

        #rt::inventory::submit! {
            #rt::ProviderRegistration::new(#contract_key, #provider_key, #instance, #name::__construct)
        }
    };

    Ok(Artifact {
        namespace: wrapper.namespace().to_vec(),
        name: wrapper.simple_name().to_string(),
        kind: ArtifactKind::Class,
        body: format_file(tokens)?,
    })
}
