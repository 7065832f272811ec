//! Inversion backend
//!
//! Turns a resolved factory graph into Rust source artifacts.
//!
//! The pipeline is:
//! 1. `FactoryGraph` → `CodeGenerator` → `quote!` token streams
//! 2. Tokens → `syn::File` → `prettyplease` → artifact bodies
//! 3. Artifacts → `ArtifactWriter`
//!
//! ## Module Organization
//!
//! - `codegen/` - one emitter per artifact kind
//! - `rust_emitter.rs` - path/type parsing and formatting helpers
//! - `artifact.rs` - artifact records and writers

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]

pub mod artifact;
pub mod codegen;
pub mod rust_emitter;

pub use artifact::{Artifact, ArtifactKind, ArtifactWriter, FsArtifactWriter, MemoryArtifactWriter, WriteError};
pub use codegen::{CodeGenerator, GeneratedUnit};
pub use rust_emitter::EmitError;
