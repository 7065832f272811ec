//! Processor configuration
//!
//! Defaults cover the common layout; an optional `inversion.toml` overrides them and command-line
//! flags override the file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::backend::codegen::DEFAULT_RUNTIME_PATH;

/// Config file looked up next to the manifest when none is given explicitly.
pub const CONFIG_FILE_NAME: &str = "inversion.toml";

/// Processor configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessorConfig {
    /// Directory generated artifacts are written below
    pub generated_dir: PathBuf,
    /// This crate's registry partition
    pub registry_root: PathBuf,
    /// Registry partitions of the crates this one can see
    pub registry_inputs: Vec<PathBuf>,
    /// Path generated code uses for the runtime crate
    pub runtime_path: String,
    /// Emit a `mod.rs` per namespace
    pub emit_index: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            generated_dir: PathBuf::from("target/inversion/generated"),
            registry_root: PathBuf::from("target/inversion/registry"),
            registry_inputs: Vec::new(),
            runtime_path: DEFAULT_RUNTIME_PATH.to_string(),
            emit_index: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ProcessorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config file. Relative paths inside it are resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(match path.parent() {
            Some(base) if !base.as_os_str().is_empty() => config.relative_to(base),
            _ => config,
        })
    }

    /// Load `path` if given, else `inversion.toml` in `dir` if present, else defaults.
    pub fn discover(path: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "using config file");
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    fn relative_to(mut self, base: &Path) -> Self {
        self.generated_dir = base.join(&self.generated_dir);
        self.registry_root = base.join(&self.registry_root);
        self.registry_inputs = self.registry_inputs.iter().map(|p| base.join(p)).collect();
        self
    }

    pub fn with_generated_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.generated_dir = dir.into();
        self
    }

    pub fn with_registry_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.registry_root = root.into();
        self
    }

    pub fn with_registry_input(mut self, root: impl Into<PathBuf>) -> Self {
        self.registry_inputs.push(root.into());
        self
    }

    pub fn with_runtime_path(mut self, path: impl Into<String>) -> Self {
        self.runtime_path = path.into();
        self
    }

    pub fn with_index(mut self, emit_index: bool) -> Self {
        self.emit_index = emit_index;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProcessorConfig::default();
        assert_eq!(config.runtime_path, "::inversion_runtime");
        assert!(config.emit_index);
        assert!(config.registry_inputs.is_empty());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ProcessorConfig::from_toml_str(
            r#"
            registry_inputs = ["../base/registry"]
            emit_index = false
            "#,
        )
        .unwrap();
        assert_eq!(config.registry_inputs, vec![PathBuf::from("../base/registry")]);
        assert!(!config.emit_index);
        assert_eq!(config.generated_dir, ProcessorConfig::default().generated_dir);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(ProcessorConfig::from_toml_str("colour = true").is_err());
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "registry_root = \"reg\"\n").unwrap();
        let config = ProcessorConfig::discover(None, dir.path()).unwrap();
        assert_eq!(config.registry_root, dir.path().join("reg"));
    }

    #[test]
    fn test_builders() {
        let config = ProcessorConfig::new()
            .with_registry_root("own")
            .with_registry_input("a")
            .with_registry_input("b")
            .with_index(false);
        assert_eq!(config.registry_root, PathBuf::from("own"));
        assert_eq!(config.registry_inputs.len(), 2);
        assert!(!config.emit_index);
    }
}
