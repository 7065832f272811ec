//! Inversion frontend
//!
//! - `declarations`: raw scanner records (unit manifests)
//! - `model`: contracts and providers derived from those records
//! - `resolver`: providers grouped by contract, per-unit uniqueness checks
//! - `diagnostics`: error reporting

pub mod declarations;
pub mod diagnostics;
pub mod model;
pub mod resolver;
