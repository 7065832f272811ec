//! Provide the shared, pure naming vocabulary for the Inversion processor and runtime.
//!
//! Both sides of the wiring must agree on names: the processor derives contract, wrapper,
//! validator and accessor names at build time, and the runtime looks providers up by the very
//! same canonical contract names. Keeping the derivations here guarantees that independently
//! compiled crates map the same result type to the same contract.
//!
//! ## Notes
//!
//! - This is a "semantic core" crate: **no IO**, no global state, and no processor-specific types.
//! - Current scope: canonical names ([`CanonicalName`]), name derivations ([`naming`]) and the
//!   reserved registry keys ([`keys`]).

pub mod keys;
pub mod names;
pub mod naming;

pub use names::{CanonicalName, NameError};
