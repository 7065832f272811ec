//! Generated artifacts and where they are written.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Contract trait.
    Interface,
    /// Wrapper or validator descriptor.
    Class,
    /// Accessor function.
    Function,
    /// Per-namespace `mod.rs`.
    Index,
}

/// One generated source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Module path the artifact belongs to, crate first.
    pub namespace: Vec<String>,
    pub name: String,
    pub kind: ArtifactKind,
    pub body: String,
}

impl Artifact {
    /// File name inside the namespace directory.
    pub fn file_name(&self) -> String {
        match self.kind {
            ArtifactKind::Index => "mod.rs".to_string(),
            _ => format!("{}.rs", self.name),
        }
    }

    /// `<namespace segments>/<file name>`.
    pub fn relative_path(&self) -> PathBuf {
        let mut path: PathBuf = self.namespace.iter().collect();
        path.push(self.file_name());
        path
    }
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("cannot write artifact '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Persists generated artifacts. Failures are fatal to the unit.
pub trait ArtifactWriter {
    fn write(&mut self, artifact: &Artifact) -> Result<(), WriteError>;
}

/// Writes `<root>/<namespace segments>/<name>.rs`, creating directories as needed.
#[derive(Debug, Clone)]
pub struct FsArtifactWriter {
    root: PathBuf,
    written: Vec<PathBuf>,
}

impl FsArtifactWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            written: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl ArtifactWriter for FsArtifactWriter {
    fn write(&mut self, artifact: &Artifact) -> Result<(), WriteError> {
        let path = self.root.join(artifact.relative_path());
        let io_err = |source| WriteError::Io {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(&path, &artifact.body).map_err(io_err)?;
        tracing::trace!(path = %path.display(), "wrote artifact");
        self.written.push(path);
        Ok(())
    }
}

/// Keeps artifacts in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryArtifactWriter {
    artifacts: Vec<Artifact>,
}

impl MemoryArtifactWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    pub fn into_artifacts(self) -> Vec<Artifact> {
        self.artifacts
    }

    /// Find an artifact by name (first match).
    pub fn get(&self, name: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.name == name)
    }
}

impl ArtifactWriter for MemoryArtifactWriter {
    fn write(&mut self, artifact: &Artifact) -> Result<(), WriteError> {
        self.artifacts.push(artifact.clone());
        Ok(())
    }
}
