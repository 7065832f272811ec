//! Canonical, crate-qualified names for types, contracts and providers.
//!
//! A canonical name is a `::`-separated path whose first segment is the crate that owns the item
//! (`app::greet::Greeter`). Dotted input (`app.greet.Greeter`) is accepted as well, because that is
//! the form registry resources are stored under.

use std::fmt;
use std::str::FromStr;

/// A validated, crate-qualified path such as `app::greet::Greeter`.
///
/// ## Examples
/// ```rust
/// use inversion_core::CanonicalName;
///
/// let name = CanonicalName::parse("app::greet::Greeter").unwrap();
/// assert_eq!(name.simple_name(), "Greeter");
/// assert_eq!(name.namespace(), ["app".to_string(), "greet".to_string()]);
/// assert_eq!(name.resource_name(), "app.greet.Greeter");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalName {
    segments: Vec<String>,
}

/// Reason a string could not be parsed as a [`CanonicalName`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    Empty,
    InvalidSegment { input: String, segment: String },
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameError::Empty => write!(f, "empty canonical name"),
            NameError::InvalidSegment { input, segment } => {
                write!(f, "invalid segment '{}' in canonical name '{}'", segment, input)
            }
        }
    }
}

impl std::error::Error for NameError {}

fn is_valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => chars.all(|c| c.is_alphanumeric() || c == '_'),
        _ => false,
    }
}

impl CanonicalName {
    /// Parse a `::`- or `.`-separated path.
    ///
    /// ## Errors
    /// - [`NameError::Empty`] for blank input.
    /// - [`NameError::InvalidSegment`] when a segment is empty or not identifier-like.
    pub fn parse(input: &str) -> Result<Self, NameError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(NameError::Empty);
        }
        let raw: Vec<&str> = if trimmed.contains("::") {
            trimmed.split("::").collect()
        } else {
            trimmed.split('.').collect()
        };
        Self::from_segments(raw).map_err(|err| match err {
            NameError::InvalidSegment { segment, .. } => NameError::InvalidSegment {
                input: trimmed.to_string(),
                segment,
            },
            other => other,
        })
    }

    /// Build a name from already-split segments.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, NameError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = Vec::new();
        for segment in segments {
            let segment = segment.as_ref().trim();
            if !is_valid_segment(segment) {
                return Err(NameError::InvalidSegment {
                    input: String::new(),
                    segment: segment.to_string(),
                });
            }
            out.push(segment.to_string());
        }
        if out.is_empty() {
            return Err(NameError::Empty);
        }
        Ok(Self { segments: out })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The last path segment (`Greeter` for `app::greet::Greeter`).
    pub fn simple_name(&self) -> &str {
        // `segments` is never empty; see `from_segments`.
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Every segment but the last. Empty for single-segment names.
    pub fn namespace(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }

    /// The owning crate (first segment).
    pub fn root(&self) -> &str {
        &self.segments[0]
    }

    /// Append a segment (`app::greet` + `Greeter`).
    pub fn child(&self, name: &str) -> CanonicalName {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        CanonicalName { segments }
    }

    /// Replace the last segment, keeping the namespace.
    pub fn sibling(&self, name: &str) -> CanonicalName {
        let mut segments = self.namespace().to_vec();
        segments.push(name.to_string());
        CanonicalName { segments }
    }

    /// The dotted, filesystem-safe form used for registry resource file names.
    pub fn resource_name(&self) -> String {
        self.segments.join(".")
    }
}

impl fmt::Display for CanonicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("::"))
    }
}

impl FromStr for CanonicalName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CanonicalName::parse(s)
    }
}
