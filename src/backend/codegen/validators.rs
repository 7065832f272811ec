//! Validator descriptors: one per contract, so downstream crates and the runtime can enumerate
//! every contract that must be satisfied.

use inversion_core::naming;
use quote::quote;

use super::CodeGenerator;
use crate::backend::artifact::{Artifact, ArtifactKind};
use crate::backend::rust_emitter::{EmitError, format_file, ident};
use crate::frontend::model::FactoryDefinition;

pub(super) fn emit(generator: &CodeGenerator, definition: &FactoryDefinition) -> Result<Artifact, EmitError> {
    let rt = generator.runtime();
    let validator = naming::validator_name(&definition.name);
    let name = ident(validator.simple_name())?;
    let contract = definition.name.to_string();
    let wrapped = definition.result.to_string();

    let tokens = quote! {
        #[allow(non_camel_case_types)]
        pub struct #name;

        impl #rt::InversionValidator for #name {
            fn factory_name(&self) -> &'static str {
                #contract
            }

            fn wrapped_name(&self) -> &'static str {
                #wrapped
            }
        }

        #rt::inventory::submit! {
            #rt::ValidatorRegistration::new(#contract, #wrapped)
        }
    };

    Ok(Artifact {
        namespace: validator.namespace().to_vec(),
        name: validator.simple_name().to_string(),
        kind: ArtifactKind::Class,
        body: format_file(tokens)?,
    })
}
