#![forbid(unsafe_code)]
//! Inversion: build-time factory wiring
//!
//! A scanner describes each crate's contracts, providers and validation marker in a unit
//! manifest. This crate turns that manifest into generated Rust (contract traits, provider
//! wrappers, accessors), publishes the crate's providers to a partitioned registry and checks,
//! at the crate carrying the validation marker, that every visible contract has a provider.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` and `backend` modules
//!   enforce `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **True invariants**: If a panic represents a processor bug (logic error), use `.expect("INVARIANT: reason")` with
//!   a clear explanation.

pub mod backend;
pub mod cli;
pub mod config;
pub mod frontend;
pub mod pipeline;
pub mod registry;
pub mod validate;
pub mod version;

pub use frontend::declarations;
pub use frontend::diagnostics;

pub use backend::{CodeGenerator, GeneratedUnit};
pub use config::ProcessorConfig;
pub use pipeline::{ProcessError, ProcessOutcome, Processor};
pub use registry::{Registry, RegistryEntry, RegistryStore};
pub use validate::{DependencyValidator, ValidationReport, ValidationResult};
