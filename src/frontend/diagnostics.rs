//! Diagnostics and error reporting for the processor.
//!
//! Every build-level problem is a [`CompileError`] pushed into a [`DiagnosticSink`]. Reporting
//! never stops the pipeline: all stages keep collecting so one run yields the full report.

use std::fmt::{self, Write as _};

use inversion_core::CanonicalName;
use thiserror::Error;

use crate::frontend::declarations::Location;

/// A build-time diagnostic with optional location information.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CompileError {
    pub message: String,
    pub location: Option<Location>,
    pub kind: ErrorKind,
    pub notes: Vec<String>,
    pub hints: Vec<String>,
}

impl CompileError {
    pub fn new(kind: ErrorKind, message: String, location: Option<&Location>) -> Self {
        Self {
            message,
            location: location.cloned(),
            kind,
            notes: Vec::new(),
            hints: Vec::new(),
        }
    }

    pub fn warning(message: String, location: Option<&Location>) -> Self {
        Self::new(ErrorKind::Warning, message, location)
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.kind != ErrorKind::Warning
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnresolvedContract,
    DuplicateProviderName,
    AmbiguousProvider,
    NameCollision,
    UnsatisfiedContract,
    InvalidInstanceName,
    MalformedDeclaration,
    Warning,
}

impl ErrorKind {
    /// Stable diagnostic code.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::UnresolvedContract => "unresolved-contract",
            ErrorKind::DuplicateProviderName => "duplicate-provider-name",
            ErrorKind::AmbiguousProvider => "ambiguous-provider",
            ErrorKind::NameCollision => "name-collision",
            ErrorKind::UnsatisfiedContract => "unsatisfied-contract",
            ErrorKind::InvalidInstanceName => "invalid-instance-name",
            ErrorKind::MalformedDeclaration => "malformed-declaration",
            ErrorKind::Warning => "warning",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Warning => write!(f, "warning"),
            other => write!(f, "error[{}]", other.code()),
        }
    }
}

impl miette::Diagnostic for CompileError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(format!("inversion::{}", self.kind.code())))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(if self.is_error() {
            miette::Severity::Error
        } else {
            miette::Severity::Warning
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let mut lines = Vec::new();
        if let Some(location) = &self.location {
            lines.push(format!("at {}", location));
        }
        lines.extend(self.notes.iter().map(|n| format!("note: {}", n)));
        lines.extend(self.hints.iter().map(|h| format!("hint: {}", h)));
        if lines.is_empty() {
            None
        } else {
            Some(Box::new(lines.join("\n")))
        }
    }
}

/// Format a diagnostic as plain text (no colors), one block per diagnostic.
pub fn format_error(error: &CompileError) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(out, "{}: {}", error.kind, error.message);
    if let Some(location) = &error.location {
        let _ = writeln!(out, "  --> {}", location);
    }
    for note in &error.notes {
        let _ = writeln!(out, "  = note: {}", note);
    }
    for hint in &error.hints {
        let _ = writeln!(out, "  = hint: {}", hint);
    }
    out
}

/// Where the pipeline reports problems.
pub trait DiagnosticSink {
    fn warn(&mut self, message: String, location: Option<&Location>);

    fn error(&mut self, error: CompileError);
}

/// Collecting sink; also mirrors every diagnostic to `tracing`.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    errors: Vec<CompileError>,
    warnings: Vec<CompileError>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> &[CompileError] {
        &self.errors
    }

    pub fn warnings(&self) -> &[CompileError] {
        &self.warnings
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Count errors of one kind.
    pub fn count(&self, kind: ErrorKind) -> usize {
        self.errors.iter().filter(|e| e.kind == kind).count()
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

impl DiagnosticSink for Diagnostics {
    fn warn(&mut self, message: String, location: Option<&Location>) {
        tracing::warn!(location = ?location.map(ToString::to_string), "{}", message);
        self.warnings.push(CompileError::warning(message, location));
    }

    fn error(&mut self, error: CompileError) {
        tracing::debug!(code = error.kind.code(), "{}", error.message);
        if error.is_error() {
            self.errors.push(error);
        } else {
            self.warnings.push(error);
        }
    }
}

// ============================================================================
// Error catalog
// ============================================================================

/// Constructors for every build-level error, so wording stays consistent.
pub mod errors {
    use super::*;

    pub fn unresolved_contract(result: &CanonicalName, provider: &str, location: Option<&Location>) -> CompileError {
        CompileError::new(
            ErrorKind::UnresolvedContract,
            format!("No contract produces '{}' (required by provider '{}')", result, provider),
            location,
        )
        .with_hint("Declare a contract for this type here or in a crate this one depends on")
    }

    pub fn duplicate_provider_name(
        contract: &CanonicalName,
        name: &str,
        provider: &str,
        location: Option<&Location>,
    ) -> CompileError {
        CompileError::new(
            ErrorKind::DuplicateProviderName,
            format!(
                "Provider '{}' reuses instance name '{}' for named contract '{}'",
                provider, name, contract
            ),
            location,
        )
        .with_hint("Instance names must be unique per contract")
    }

    pub fn ambiguous_provider(
        contract: &CanonicalName,
        provider: &str,
        first: &str,
        location: Option<&Location>,
    ) -> CompileError {
        CompileError::new(
            ErrorKind::AmbiguousProvider,
            format!(
                "Contract '{}' already has provider '{}'; '{}' is ambiguous",
                contract, first, provider
            ),
            location,
        )
        .with_note("A contract that is not named accepts exactly one provider per crate")
        .with_hint("Remove one provider or declare the contract as named")
    }

    pub fn name_collision(wrapper: &CanonicalName, provider: &str, location: Option<&Location>) -> CompileError {
        CompileError::new(
            ErrorKind::NameCollision,
            format!("Generated wrapper '{}' for provider '{}' collides with another wrapper", wrapper, provider),
            location,
        )
        .with_hint("Rename the provider or choose a distinct instance name")
    }

    pub fn unsatisfied_contract(
        contract: &CanonicalName,
        wrapped: &CanonicalName,
        location: Option<&Location>,
    ) -> CompileError {
        CompileError::new(
            ErrorKind::UnsatisfiedContract,
            format!("Implementation not found for {} (contract {})", wrapped, contract),
            location,
        )
        .with_hint("Add a provider in this crate or in any crate visible to this build")
    }

    pub fn invalid_instance_name(
        contract: &CanonicalName,
        provider: &str,
        named: bool,
        location: Option<&Location>,
    ) -> CompileError {
        let message = if named {
            format!(
                "Provider '{}' for named contract '{}' must declare a non-empty instance name",
                provider, contract
            )
        } else {
            format!(
                "Provider '{}' declares an instance name but contract '{}' is not named",
                provider, contract
            )
        };
        CompileError::new(ErrorKind::InvalidInstanceName, message, location)
    }

    pub fn malformed_declaration(element: &str, reason: &str, location: Option<&Location>) -> CompileError {
        CompileError::new(
            ErrorKind::MalformedDeclaration,
            format!("Malformed declaration '{}': {}", element, reason),
            location,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Diagnostic;

    fn loc() -> Location {
        Location {
            file: "src/lib.rs".to_string(),
            line: 4,
        }
    }

    #[test]
    fn test_format_error_plain_text() {
        let err = CompileError::new(ErrorKind::NameCollision, "boom".to_string(), Some(&loc()))
            .with_note("n")
            .with_hint("h");
        assert_eq!(
            format_error(&err),
            "error[name-collision]: boom\n  --> src/lib.rs:4\n  = note: n\n  = hint: h\n"
        );
    }

    #[test]
    fn test_sink_separates_warnings() {
        let mut diags = Diagnostics::new();
        diags.warn("careful".to_string(), None);
        diags.error(CompileError::new(ErrorKind::AmbiguousProvider, "x".to_string(), None));
        assert_eq!(diags.warnings().len(), 1);
        assert_eq!(diags.errors().len(), 1);
        assert_eq!(diags.count(ErrorKind::AmbiguousProvider), 1);
        assert!(diags.has_errors());
    }

    #[test]
    fn test_miette_code_and_help() {
        let err = CompileError::new(ErrorKind::UnsatisfiedContract, "m".to_string(), Some(&loc())).with_hint("fix");
        assert_eq!(err.code().unwrap().to_string(), "inversion::unsatisfied-contract");
        assert_eq!(err.help().unwrap().to_string(), "at src/lib.rs:4\nhint: fix");
        assert_eq!(err.severity(), Some(miette::Severity::Error));
    }
}
