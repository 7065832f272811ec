//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use inversion_core::CanonicalName;

use super::{CliError, CliResult, ExitCode, ProcessorArgs};
use crate::backend::FsArtifactWriter;
use crate::config::ProcessorConfig;
use crate::frontend::declarations::UnitManifest;
use crate::frontend::diagnostics::{CompileError, Diagnostics, format_error};
use crate::pipeline::{ProcessOutcome, Processor};
use crate::registry::{Registry, RegistryStore};

/// How diagnostics are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStyle {
    /// `miette` graphical reports.
    Fancy,
    /// [`format_error`] text.
    Plain,
}

// ============================================================================
// Setup shared by the manifest commands
// ============================================================================

/// Resolve config: file (explicit or discovered next to the manifest), then flags.
pub fn resolve_config(manifest: &Path, args: &ProcessorArgs) -> CliResult<ProcessorConfig> {
    let dir = manifest.parent().unwrap_or_else(|| Path::new("."));
    let mut config =
        ProcessorConfig::discover(args.config.as_deref(), dir).map_err(|e| CliError::infra(e.to_string()))?;

    if let Some(dir) = &args.generated_dir {
        config = config.with_generated_dir(dir);
    }
    if let Some(root) = &args.registry_root {
        config = config.with_registry_root(root);
    }
    for input in &args.registry_inputs {
        config = config.with_registry_input(input);
    }
    if let Some(path) = &args.runtime_path {
        config = config.with_runtime_path(path);
    }
    if args.no_index {
        config = config.with_index(false);
    }
    Ok(config)
}

fn load(manifest: &Path, args: &ProcessorArgs) -> CliResult<(UnitManifest, Processor<'static>)> {
    let unit = UnitManifest::load(manifest).map_err(|e| CliError::infra(e.to_string()))?;
    let config = resolve_config(manifest, args)?;
    tracing::debug!(unit = %unit.unit, config = ?config, "loaded manifest");
    Ok((unit, Processor::new(config)))
}

// ============================================================================
// Diagnostics output
// ============================================================================

fn render(diagnostic: &CompileError, style: ReportStyle) -> String {
    match style {
        ReportStyle::Plain => format_error(diagnostic),
        ReportStyle::Fancy => format!("{:?}", miette::Report::new(diagnostic.clone())),
    }
}

/// Render warnings then errors, followed by a one-line summary.
pub fn render_diagnostics(diagnostics: &Diagnostics, style: ReportStyle) -> String {
    let mut out = String::new();
    for diagnostic in diagnostics.warnings().iter().chain(diagnostics.errors()) {
        out.push_str(&render(diagnostic, style));
        if !out.ends_with('\n') {
            out.push('\n');
        }
    }
    let errors = diagnostics.errors().len();
    let warnings = diagnostics.warnings().len();
    if errors > 0 || warnings > 0 {
        let _ = writeln!(out, "{} error(s), {} warning(s)", errors, warnings);
    }
    out
}

fn finish(outcome: &ProcessOutcome, style: ReportStyle) -> ExitCode {
    let report = render_diagnostics(&outcome.diagnostics, style);
    if !report.is_empty() {
        eprint!("{}", report);
    }
    if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

// ============================================================================
// Commands
// ============================================================================

pub fn process_manifest(manifest: &Path, args: &ProcessorArgs, style: ReportStyle) -> CliResult<ExitCode> {
    let (unit, processor) = load(manifest, args)?;
    let mut writer = FsArtifactWriter::new(&processor.config().generated_dir);
    let outcome = processor
        .process(&unit, &mut writer)
        .map_err(|e| CliError::infra(e.to_string()))?;
    if let Some(report) = &outcome.validation {
        tracing::info!(
            checked = report.results.len(),
            unsatisfied = report.unsatisfied().count(),
            "validation finished"
        );
    }
    Ok(finish(&outcome, style))
}

pub fn check_manifest(manifest: &Path, args: &ProcessorArgs, style: ReportStyle) -> CliResult<ExitCode> {
    let (unit, processor) = load(manifest, args)?;
    let outcome = processor.check(&unit).map_err(|e| CliError::infra(e.to_string()))?;
    Ok(finish(&outcome, style))
}

pub fn emit_manifest(
    manifest: &Path,
    args: &ProcessorArgs,
    only: Option<&str>,
    style: ReportStyle,
) -> CliResult<ExitCode> {
    let (unit, processor) = load(manifest, args)?;
    let outcome = processor.check(&unit).map_err(|e| CliError::infra(e.to_string()))?;

    let mut printed = 0;
    for artifact in outcome.artifacts.iter().filter(|a| only.is_none_or(|name| a.name == name)) {
        println!("// ---- {}", artifact.relative_path().display());
        print!("{}", artifact.body);
        printed += 1;
    }
    if let (Some(name), 0) = (only, printed) {
        return Err(CliError::failure(format!("No artifact named '{}'", name)));
    }
    Ok(finish(&outcome, style))
}

/// Format a registry listing: one `contract` line per key, providers indented below.
pub fn render_registry(registry: &Registry, contract: Option<&CanonicalName>) -> String {
    let mut keys: Vec<&CanonicalName> = registry.keys().filter(|k| contract.is_none_or(|c| c == *k)).collect();
    keys.sort();
    let mut out = String::new();
    for key in keys {
        let _ = writeln!(out, "{}", key);
        let mut providers: Vec<&CanonicalName> = registry.providers(key).collect();
        providers.sort();
        for provider in providers {
            let _ = writeln!(out, "  {}", provider);
        }
    }
    out
}

pub fn list_registry(roots: &[PathBuf], contract: Option<&str>) -> CliResult<ExitCode> {
    let Some((own, inputs)) = roots.split_first() else {
        return Err(CliError::infra("No registry roots given"));
    };
    let filter = contract
        .map(CanonicalName::parse)
        .transpose()
        .map_err(|e| CliError::infra(format!("Invalid contract name: {}", e)))?;
    let registry = RegistryStore::new(own)
        .with_inputs(inputs.iter().cloned())
        .read_all()
        .map_err(|e| CliError::infra(e.to_string()))?;
    print!("{}", render_registry(&registry, filter.as_ref()));
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::frontend::diagnostics::{DiagnosticSink, ErrorKind};
    use crate::registry::RegistryEntry;

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("inversion.toml"),
            "registry_root = \"from-file\"\nemit_index = true\n",
        )
        .unwrap();
        let manifest = dir.path().join("unit.json");
        let args = ProcessorArgs {
            no_index: true,
            registry_inputs: vec![PathBuf::from("up")],
            ..ProcessorArgs::default()
        };
        let config = resolve_config(&manifest, &args).unwrap();
        assert_eq!(config.registry_root, dir.path().join("from-file"));
        assert_eq!(config.registry_inputs, vec![PathBuf::from("up")]);
        assert!(!config.emit_index);
    }

    #[test]
    fn test_render_diagnostics_summary() {
        let mut diags = Diagnostics::new();
        diags.warn("w".to_string(), None);
        diags.error(CompileError::new(ErrorKind::AmbiguousProvider, "e".to_string(), None));
        let out = render_diagnostics(&diags, ReportStyle::Plain);
        assert_eq!(out, "warning: w\nerror[ambiguous-provider]: e\n1 error(s), 1 warning(s)\n");
    }

    #[test]
    fn test_render_registry_filter() {
        let contract = CanonicalName::parse("app::G_Factory").unwrap();
        let registry: Registry = [
            RegistryEntry::new(contract.clone(), CanonicalName::parse("b::G_FactoryImpl").unwrap()),
            RegistryEntry::new(contract.clone(), CanonicalName::parse("a::G_FactoryImpl").unwrap()),
            RegistryEntry::new(
                CanonicalName::parse("app::H_Factory").unwrap(),
                CanonicalName::parse("app::H_FactoryImpl").unwrap(),
            ),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            render_registry(&registry, Some(&contract)),
            "app::G_Factory\n  a::G_FactoryImpl\n  b::G_FactoryImpl\n"
        );
    }

    #[test]
    fn test_missing_manifest_is_infra_error() {
        let err = check_manifest(
            Path::new("/nonexistent/unit.json"),
            &ProcessorArgs::default(),
            ReportStyle::Plain,
        )
        .unwrap_err();
        assert_eq!(err.exit_code, ExitCode::INFRA);
    }
}
