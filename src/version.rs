//! Inversion version information.
//!
//! This module exposes the processor version as a single constant so all subsystems
//! (CLI, generated-file banners) agree on the same value.
//!
//! ## Notes
//!
//! - The value is taken from Cargo metadata (`CARGO_PKG_VERSION`) at compile time.

/// The inversion version string (for example, `0.1.0-alpha.1`).
pub const INVERSION_VERSION: &str = env!("CARGO_PKG_VERSION");
