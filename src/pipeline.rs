//! One unit, end to end.
//!
//! ```text
//! registry (upstream contracts) ─┐
//! manifest → ModelBuilder → resolve → CodeGenerator → ArtifactWriter
//!                                              └──→ RegistryStore::write → DependencyValidator
//! ```
//!
//! Build-level problems, including declarations whose names or types do not parse, land in
//! [`Diagnostics`] and never stop the run. Infrastructure failures (I/O, an unreadable manifest,
//! a bad runtime path in the config) are a [`ProcessError`] and abort the unit.

use inversion_runtime::{InventoryLoader, ServiceLoader};
use thiserror::Error;

use crate::backend::rust_emitter::{self, EmitError};
use crate::backend::{Artifact, ArtifactWriter, CodeGenerator, MemoryArtifactWriter, WriteError};
use crate::config::{ConfigError, ProcessorConfig};
use crate::frontend::declarations::{ManifestError, UnitManifest};
use crate::frontend::diagnostics::Diagnostics;
use crate::frontend::model::{self, ModelBuilder};
use crate::frontend::resolver;
use crate::registry::{Registry, RegistryEntry, RegistryError, RegistryStore};
use crate::validate::{DependencyValidator, ValidationReport};

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Emit(#[from] EmitError),
    #[error(transparent)]
    Write(#[from] WriteError),
}

/// What one run produced.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutcome {
    pub diagnostics: Diagnostics,
    pub artifacts: Vec<Artifact>,
    pub entries: Vec<RegistryEntry>,
    /// Present when the unit carries a validation marker.
    pub validation: Option<ValidationReport>,
}

impl ProcessOutcome {
    pub fn is_success(&self) -> bool {
        !self.diagnostics.has_errors()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Write artifacts and registry entries.
    Write,
    /// Generate and validate in memory only.
    DryRun,
}

/// Runs the pipeline for one unit.
pub struct Processor<'a> {
    config: ProcessorConfig,
    loader: &'a dyn ServiceLoader,
}

impl Processor<'static> {
    /// Processor consulting the link-time registrations of the running binary.
    pub fn new(config: ProcessorConfig) -> Self {
        Self {
            config,
            loader: &InventoryLoader,
        }
    }
}

impl<'a> Processor<'a> {
    pub fn with_loader<'b>(self, loader: &'b dyn ServiceLoader) -> Processor<'b> {
        Processor {
            config: self.config,
            loader,
        }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn store(&self) -> RegistryStore {
        RegistryStore::new(&self.config.registry_root).with_inputs(self.config.registry_inputs.iter().cloned())
    }

    /// Generate, write artifacts and registry entries, then validate if the unit asks for it.
    pub fn process(
        &self,
        manifest: &UnitManifest,
        writer: &mut dyn ArtifactWriter,
    ) -> Result<ProcessOutcome, ProcessError> {
        self.run(manifest, writer, Mode::Write)
    }

    /// Same as [`process`](Self::process) without touching the filesystem.
    pub fn check(&self, manifest: &UnitManifest) -> Result<ProcessOutcome, ProcessError> {
        self.run(manifest, &mut MemoryArtifactWriter::new(), Mode::DryRun)
    }

    #[tracing::instrument(skip_all, fields(unit = %manifest.unit, mode = ?mode))]
    fn run(
        &self,
        manifest: &UnitManifest,
        writer: &mut dyn ArtifactWriter,
        mode: Mode,
    ) -> Result<ProcessOutcome, ProcessError> {
        let mut diagnostics = Diagnostics::new();
        let store = self.store();

        let upstream = model::upstream_definitions(&store.read_all()?);
        tracing::debug!(upstream = upstream.len(), "upstream contracts discovered");

        let model = ModelBuilder::new(&manifest.unit)
            .with_upstream(upstream)
            .build(&manifest.declarations, &mut diagnostics);
        let graph = resolver::resolve(&model, &mut diagnostics);

        let generated = CodeGenerator::new(&manifest.unit)
            .with_runtime_path(rust_emitter::parse_path(&self.config.runtime_path)?)
            .with_index(self.config.emit_index)
            .generate(&graph, &mut diagnostics)?;

        let pending: Registry = generated.entries.iter().cloned().collect();
        if mode == Mode::Write {
            for artifact in &generated.artifacts {
                writer.write(artifact)?;
            }
            let written = store.write(&generated.entries)?;
            tracing::info!(
                artifacts = generated.artifacts.len(),
                resources = written.len(),
                "unit processed"
            );
        }

        let validation = match &model.marker {
            Some(marker) => {
                let mut validator = DependencyValidator::new(&store, self.loader);
                if mode == Mode::DryRun {
                    validator = validator.with_pending(&pending);
                }
                Some(validator.validate(&model.factories, marker, &mut diagnostics)?)
            }
            None => None,
        };

        Ok(ProcessOutcome {
            diagnostics,
            artifacts: generated.artifacts,
            entries: generated.entries,
            validation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::diagnostics::ErrorKind;
    use inversion_runtime::StaticLoader;
    use tempfile::TempDir;

    const UNIT: &str = r#"{
        "unit": "app",
        "declarations": [
            { "kind": "contract", "name": "factory", "namespace": "app", "result": "app::Greeter" },
            { "kind": "validation_marker", "name": "App", "namespace": "app" }
        ]
    }"#;

    fn config(dir: &TempDir) -> ProcessorConfig {
        ProcessorConfig::new()
            .with_generated_dir(dir.path().join("gen"))
            .with_registry_root(dir.path().join("reg"))
    }

    #[test]
    fn test_check_does_not_write() {
        let dir = TempDir::new().unwrap();
        let loader = StaticLoader::new();
        let processor = Processor::new(config(&dir)).with_loader(&loader);
        let manifest = UnitManifest::from_json("inline", UNIT).unwrap();
        let outcome = processor.check(&manifest).unwrap();
        assert!(!outcome.artifacts.is_empty());
        assert!(!dir.path().join("reg").exists());
        assert_eq!(outcome.diagnostics.count(ErrorKind::UnsatisfiedContract), 1);
    }

    #[test]
    fn test_process_writes_registry() {
        let dir = TempDir::new().unwrap();
        let loader = StaticLoader::new();
        let processor = Processor::new(config(&dir)).with_loader(&loader);
        let manifest = UnitManifest::from_json("inline", UNIT).unwrap();
        let mut writer = MemoryArtifactWriter::new();
        let outcome = processor.process(&manifest, &mut writer).unwrap();
        assert_eq!(writer.artifacts().len(), outcome.artifacts.len());
        assert!(outcome.validation.is_some());
        assert!(!outcome.is_success());
        let validators = processor
            .store()
            .read_visible(&inversion_core::keys::validators_key())
            .unwrap();
        assert_eq!(validators.len(), 1);
    }

    #[test]
    fn test_unparseable_provider_keeps_the_full_report() {
        let dir = TempDir::new().unwrap();
        let loader = StaticLoader::new();
        let processor = Processor::new(config(&dir)).with_loader(&loader);
        let manifest = UnitManifest::from_json(
            "inline",
            r#"{
            "unit": "app",
            "declarations": [
                { "kind": "contract", "name": "greeter", "namespace": "app", "result": "app::Greeter" },
                { "kind": "contract", "name": "clock", "namespace": "app", "result": "app::Clock" },
                { "kind": "provider", "name": "first", "namespace": "app", "result": "app::Greeter" },
                { "kind": "provider", "name": "second", "namespace": "app", "result": "app::Greeter" },
                { "kind": "provider", "name": "clock", "namespace": "app", "result": "app::Clock",
                  "params": [{ "name": "zone", "ty": "Vec<" }] },
                { "kind": "validation_marker", "name": "App", "namespace": "app" }
            ]
        }"#,
        )
        .unwrap();

        let outcome = processor.check(&manifest).unwrap();
        assert_eq!(outcome.diagnostics.count(ErrorKind::AmbiguousProvider), 1);
        assert_eq!(outcome.diagnostics.count(ErrorKind::MalformedDeclaration), 1);
        assert_eq!(outcome.diagnostics.count(ErrorKind::UnsatisfiedContract), 1);
        let report = outcome.validation.unwrap();
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.unsatisfied().next().unwrap().contract().to_string(), "app::Clock_Factory");
    }

    #[test]
    fn test_bad_runtime_path_is_fatal() {
        let dir = TempDir::new().unwrap();
        let loader = StaticLoader::new();
        let processor = Processor::new(config(&dir).with_runtime_path("not a path")).with_loader(&loader);
        let manifest = UnitManifest::from_json("inline", UNIT).unwrap();
        assert!(matches!(processor.check(&manifest), Err(ProcessError::Emit(_))));
    }
}
