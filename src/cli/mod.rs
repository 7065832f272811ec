//! CLI module for the inversion processor
//!
//! ## Commands
//!
//! - `process <manifest>` - Generate artifacts, write registry entries, validate
//! - `check <manifest>` - Everything `process` does, without writing anything
//! - `emit <manifest>` - Print generated artifacts to stdout
//! - `registry <roots..>` - List the merged registry of one or more partitions
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

use crate::version::INVERSION_VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    /// Build-level errors were reported.
    pub const FAILURE: ExitCode = ExitCode(1);
    /// Input, configuration or I/O problem; nothing was validated.
    pub const INFRA: ExitCode = ExitCode(2);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }

    /// Infrastructure failure (exit code 2).
    pub fn infra(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::INFRA)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Build-time factory wiring generator
#[derive(Parser, Debug)]
#[command(name = "inversion")]
#[command(version = INVERSION_VERSION)]
#[command(about = "Build-time factory wiring generator", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Print diagnostics as plain text instead of rich reports
    #[arg(long, global = true)]
    pub plain: bool,
}

/// Options shared by every command that processes a manifest.
#[derive(Args, Debug, Clone, Default)]
pub struct ProcessorArgs {
    /// Config file (default: inversion.toml next to the manifest, if present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory generated artifacts are written below
    #[arg(long, value_name = "DIR")]
    pub generated_dir: Option<PathBuf>,

    /// This crate's registry partition
    #[arg(long, value_name = "DIR")]
    pub registry_root: Option<PathBuf>,

    /// Registry partition of a crate this one can see (repeatable)
    #[arg(long = "registry-input", value_name = "DIR")]
    pub registry_inputs: Vec<PathBuf>,

    /// Path generated code uses for the runtime crate
    #[arg(long, value_name = "PATH")]
    pub runtime_path: Option<String>,

    /// Do not emit per-namespace mod.rs files
    #[arg(long)]
    pub no_index: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate artifacts, write registry entries and validate
    Process {
        /// Unit manifest produced by the scanner
        #[arg(value_name = "MANIFEST")]
        manifest: PathBuf,
        #[command(flatten)]
        options: ProcessorArgs,
    },

    /// Run the whole pipeline without writing anything
    Check {
        #[arg(value_name = "MANIFEST")]
        manifest: PathBuf,
        #[command(flatten)]
        options: ProcessorArgs,
    },

    /// Print generated artifacts to stdout
    Emit {
        #[arg(value_name = "MANIFEST")]
        manifest: PathBuf,
        /// Only print the artifact with this name
        #[arg(long, value_name = "NAME")]
        artifact: Option<String>,
        #[command(flatten)]
        options: ProcessorArgs,
    },

    /// List the merged registry of one or more partitions
    Registry {
        /// Only list providers of this contract
        #[arg(long, value_name = "NAME")]
        contract: Option<String>,
        /// Registry partition roots
        #[arg(value_name = "ROOTS", required = true)]
        roots: Vec<PathBuf>,
    },
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
pub fn execute(cli: Cli) -> CliResult<ExitCode> {
    let style = if cli.plain {
        commands::ReportStyle::Plain
    } else {
        commands::ReportStyle::Fancy
    };
    match cli.command {
        Command::Process { manifest, options } => commands::process_manifest(&manifest, &options, style),
        Command::Check { manifest, options } => commands::check_manifest(&manifest, &options, style),
        Command::Emit {
            manifest,
            artifact,
            options,
        } => commands::emit_manifest(&manifest, &options, artifact.as_deref(), style),
        Command::Registry { contract, roots } => commands::list_registry(&roots, contract.as_deref()),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_process_with_overrides() {
        let cli = Cli::try_parse_from([
            "inversion",
            "process",
            "unit.json",
            "--registry-root",
            "reg",
            "--registry-input",
            "a",
            "--registry-input",
            "b",
            "--no-index",
        ])
        .unwrap();
        if let Command::Process { manifest, options } = cli.command {
            assert_eq!(manifest, PathBuf::from("unit.json"));
            assert_eq!(options.registry_root, Some(PathBuf::from("reg")));
            assert_eq!(options.registry_inputs.len(), 2);
            assert!(options.no_index);
        } else {
            panic!("Expected Process command");
        }
    }

    #[test]
    fn test_cli_parse_check_plain() {
        let cli = Cli::try_parse_from(["inversion", "check", "unit.json", "--plain"]).unwrap();
        assert!(cli.plain);
        assert!(matches!(cli.command, Command::Check { .. }));
    }

    #[test]
    fn test_cli_parse_emit_artifact() {
        let cli = Cli::try_parse_from(["inversion", "emit", "unit.json", "--artifact", "Greeter_Factory"]).unwrap();
        if let Command::Emit { artifact, .. } = cli.command {
            assert_eq!(artifact.as_deref(), Some("Greeter_Factory"));
        } else {
            panic!("Expected Emit command");
        }
    }

    #[test]
    fn test_cli_parse_registry() {
        let cli = Cli::try_parse_from(["inversion", "registry", "--contract", "app::G_Factory", "a", "b"]).unwrap();
        if let Command::Registry { contract, roots } = cli.command {
            assert_eq!(contract.as_deref(), Some("app::G_Factory"));
            assert_eq!(roots.len(), 2);
        } else {
            panic!("Expected Registry command");
        }
    }

    #[test]
    fn test_cli_registry_requires_roots() {
        assert!(Cli::try_parse_from(["inversion", "registry"]).is_err());
    }
}
