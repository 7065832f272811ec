//! Raw declarations as produced by the source scanner.
//!
//! The scanner walks a crate's sources, finds contract/provider/validation-marker annotations and
//! writes one [`UnitManifest`] per crate. These records are plain data: canonical names and type
//! expressions as strings, no live type information.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Everything the scanner found in one compilation unit (crate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitManifest {
    /// Crate name; paths rooted here are emitted as `crate::...`.
    pub unit: String,
    #[serde(default)]
    pub declarations: Vec<RawDeclaration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    Contract,
    Provider,
    ValidationMarker,
}

/// How a provider produces its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderShape {
    /// A free function (or a method called on its receiver parameter).
    #[default]
    Function,
    /// An implementing type, constructed through `Default`.
    Type,
}

/// A single annotated element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDeclaration {
    pub kind: DeclarationKind,
    /// Simple name of the annotated element (function, type or binding).
    pub name: String,
    /// Module path of the annotated element, crate first (`app::greet`).
    #[serde(default)]
    pub namespace: String,
    /// Canonical name of the produced type. Required for contracts and providers.
    #[serde(default)]
    pub result: Option<String>,
    /// Return type expression of the factory (`Box<dyn app::greet::Greeter>`). Defaults to the
    /// result type path.
    #[serde(default)]
    pub returns: Option<String>,
    #[serde(default)]
    pub params: Vec<RawParam>,
    /// Type expression of the receiver for contracts defined on a type.
    #[serde(default)]
    pub receiver: Option<String>,
    /// Contract yields a keyed collection of providers.
    #[serde(default)]
    pub named: bool,
    #[serde(default)]
    pub instance_name: Option<String>,
    #[serde(default)]
    pub shape: ProviderShape,
    #[serde(default)]
    pub location: Option<Location>,
}

impl RawDeclaration {
    /// `namespace::name`, as written by the scanner.
    pub fn qualified_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}::{}", self.namespace, self.name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawParam {
    pub name: String,
    /// Rust type expression (`String`, `&app::Config`, `std::sync::Arc<Db>`).
    pub ty: String,
    /// Marks the parameter a provider method is called on.
    #[serde(default)]
    pub receiver: bool,
}

/// Where a declaration lives in the scanned sources.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    #[serde(default)]
    pub line: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            write!(f, "{}", self.file)
        } else {
            write!(f, "{}:{}", self.file, self.line)
        }
    }
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("cannot read manifest '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid manifest '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl UnitManifest {
    pub fn from_json(path: &str, json: &str) -> Result<Self, ManifestError> {
        serde_json::from_str(json).map_err(|source| ManifestError::Parse {
            path: path.to_string(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let display = path.display().to_string();
        let json = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: display.clone(),
            source,
        })?;
        Self::from_json(&display, &json)
    }
}
