//! Snapshot tests for the plain-text diagnostics report
//!
//! The report is what users read in CI logs, so its exact wording is pinned here.

use std::path::Path;

use inversion::Processor;
use inversion::ProcessorConfig;
use inversion::cli::commands::{ReportStyle, render_diagnostics};
use inversion::declarations::UnitManifest;
use inversion_runtime::StaticLoader;
use tempfile::TempDir;

fn check_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name);
    let manifest = UnitManifest::load(&path).unwrap();
    let registry = TempDir::new().unwrap();
    let loader = StaticLoader::new();
    let outcome = Processor::new(ProcessorConfig::new().with_registry_root(registry.path()))
        .with_loader(&loader)
        .check(&manifest)
        .unwrap();
    render_diagnostics(&outcome.diagnostics, ReportStyle::Plain)
}

#[test]
fn broken_unit() {
    insta::assert_snapshot!(check_fixture("broken_unit.json"));
}

#[test]
fn clean_unit_reports_nothing() {
    assert_eq!(check_fixture("plugins.json"), "");
}
