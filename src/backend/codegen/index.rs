//! Per-namespace `mod.rs` files.
//!
//! Generated artifacts live in the module their namespace names, so a crate mounts them with one
//! `include!` of `<generated>/<namespace>/mod.rs` inside that module.

use indexmap::IndexMap;
use quote::quote;

use crate::backend::artifact::{Artifact, ArtifactKind};
use crate::backend::rust_emitter::{EmitError, format_file};

pub(super) fn emit(artifacts: &[Artifact]) -> Result<Vec<Artifact>, EmitError> {
    let mut by_namespace: IndexMap<&[String], Vec<String>> = IndexMap::new();
    for artifact in artifacts.iter().filter(|a| a.kind != ArtifactKind::Index) {
        by_namespace
            .entry(artifact.namespace.as_slice())
            .or_default()
            .push(artifact.file_name());
    }

    by_namespace
        .into_iter()
        .map(|(namespace, files)| {
            let tokens = quote! { #(include!(#files);)* };
            Ok(Artifact {
                namespace: namespace.to_vec(),
                name: "mod".to_string(),
                kind: ArtifactKind::Index,
                body: format_file(tokens)?,
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_one_index_per_namespace() {
        fn artifact(ns: &[&str], name: &str) -> Artifact {
            Artifact {
                namespace: ns.iter().map(|s| s.to_string()).collect(),
                name: name.to_string(),
                kind: ArtifactKind::Class,
                body: String::new(),
            }
        }
        let indexes = emit(&[
            artifact(&["app"], "A"),
            artifact(&["app", "x"], "B"),
            artifact(&["app"], "C"),
        ])
        .unwrap();
        assert_eq!(indexes.len(), 2);
        let body = &indexes[0].body;
        let (a, c) = (body.find("include!(\"A.rs\");").unwrap(), body.find("include!(\"C.rs\");").unwrap());
        assert!(a < c);
        assert!(!body.contains("B.rs"));
        assert_eq!(indexes[1].relative_path(), std::path::PathBuf::from("app/x/mod.rs"));
    }
}
