//! Filesystem-backed registry partitions.
//!
//! Layout: `<root>/inversion/services/<contract resource name>`. A crate only ever writes below
//! its own root; every other root is read-only input. Concurrent builds of different crates
//! therefore never touch the same file.

use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use inversion_core::{CanonicalName, keys};
use thiserror::Error;

use super::resource;
use super::{Registry, RegistryEntry};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed registry resource '{path}' line {line}: {source}")]
    Malformed {
        path: PathBuf,
        line: usize,
        #[source]
        source: inversion_core::NameError,
    },
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> RegistryError + '_ {
    move |source| RegistryError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// The unit's own partition plus the partitions of every crate it can see.
#[derive(Debug, Clone)]
pub struct RegistryStore {
    own_root: PathBuf,
    inputs: Vec<PathBuf>,
}

impl RegistryStore {
    pub fn new(own_root: impl Into<PathBuf>) -> Self {
        Self {
            own_root: own_root.into(),
            inputs: Vec::new(),
        }
    }

    pub fn with_input(mut self, root: impl Into<PathBuf>) -> Self {
        self.inputs.push(root.into());
        self
    }

    pub fn with_inputs<I, P>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.inputs.extend(roots.into_iter().map(Into::into));
        self
    }

    pub fn own_root(&self) -> &Path {
        &self.own_root
    }

    pub fn inputs(&self) -> &[PathBuf] {
        &self.inputs
    }

    fn services_dir(root: &Path) -> PathBuf {
        root.join(keys::SERVICES_DIR)
    }

    /// Path of the resource for `contract` below `root`.
    pub fn resource_path(root: &Path, contract: &CanonicalName) -> PathBuf {
        Self::services_dir(root).join(contract.resource_name())
    }

    fn roots(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.own_root.as_path()).chain(self.inputs.iter().map(PathBuf::as_path))
    }

    fn read_resource(path: &Path) -> Result<Option<indexmap::IndexSet<CanonicalName>>, RegistryError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(path)(e)),
        };
        resource::parse(&text)
            .map(Some)
            .map_err(|bad| RegistryError::Malformed {
                path: path.to_path_buf(),
                line: bad.line,
                source: bad.source,
            })
    }

    /// Persist `entries` into the own partition.
    ///
    /// Each contract's resource is merged with what this crate wrote before (existing lines
    /// first, new ones appended, duplicates dropped) and replaced atomically. Returns the paths
    /// that were written.
    #[tracing::instrument(skip_all, fields(root = %self.own_root.display(), entry_count = entries.len()))]
    pub fn write(&self, entries: &[RegistryEntry]) -> Result<Vec<PathBuf>, RegistryError> {
        let grouped: Registry = entries.iter().cloned().collect();
        let dir = Self::services_dir(&self.own_root);
        if !grouped.is_empty() {
            fs::create_dir_all(&dir).map_err(io_error(&dir))?;
        }

        let mut written = Vec::new();
        for (contract, providers) in grouped.groups() {
            let path = Self::resource_path(&self.own_root, contract);
            let mut merged = Self::read_resource(&path)?.unwrap_or_default();
            let before = merged.len();
            merged.extend(providers.iter().cloned());
            if merged.len() == before && path.exists() {
                tracing::trace!(contract = %contract, "registry resource unchanged");
                continue;
            }

            let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(io_error(&dir))?;
            tmp.write_all(resource::render(&merged).as_bytes())
                .map_err(io_error(&path))?;
            tmp.persist(&path).map_err(|e| io_error(&path)(e.error))?;
            tracing::debug!(contract = %contract, providers = merged.len(), "wrote registry resource");
            written.push(path);
        }
        Ok(written)
    }

    /// Every provider of `contract` visible from this unit: own partition plus every input.
    ///
    /// Missing roots and resources count as empty. The result does not depend on input order.
    pub fn read_visible(&self, contract: &CanonicalName) -> Result<BTreeSet<CanonicalName>, RegistryError> {
        let mut out = BTreeSet::new();
        for root in self.roots() {
            if let Some(providers) = Self::read_resource(&Self::resource_path(root, contract))? {
                out.extend(providers);
            }
        }
        Ok(out)
    }

    /// Merge every visible resource into one registry.
    #[tracing::instrument(skip_all, fields(roots = self.inputs.len() + 1))]
    pub fn read_all(&self) -> Result<Registry, RegistryError> {
        let mut registry = Registry::new();
        for root in self.roots() {
            let dir = Self::services_dir(root);
            let listing = match fs::read_dir(&dir) {
                Ok(listing) => listing,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(io_error(&dir)(e)),
            };
            let mut files: Vec<PathBuf> = Vec::new();
            for item in listing {
                let item = item.map_err(io_error(&dir))?;
                files.push(item.path());
            }
            // Directory iteration order is platform dependent.
            files.sort();

            for path in files {
                let Some(contract) = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .and_then(|n| CanonicalName::parse(n).ok())
                else {
                    tracing::debug!(path = %path.display(), "skipping non-resource file");
                    continue;
                };
                if let Some(providers) = Self::read_resource(&path)? {
                    registry.touch(contract.clone());
                    for provider in providers {
                        registry.insert(RegistryEntry::new(contract.clone(), provider));
                    }
                }
            }
        }
        Ok(registry)
    }
}
