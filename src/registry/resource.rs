//! Registry resource text format.
//!
//! One provider canonical name per line. Lines starting with `#` and blank lines are ignored.

use indexmap::IndexSet;
use inversion_core::{CanonicalName, NameError};

/// A line that is neither blank, a comment, nor a canonical name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLine {
    /// 1-based.
    pub line: usize,
    pub source: NameError,
}

/// Parse resource text, keeping first-seen order and dropping duplicates.
pub fn parse(text: &str) -> Result<IndexSet<CanonicalName>, MalformedLine> {
    let mut providers = IndexSet::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let name = CanonicalName::parse(line).map_err(|source| MalformedLine { line: idx + 1, source })?;
        providers.insert(name);
    }
    Ok(providers)
}

/// Render providers one per line, in the given order.
pub fn render<'a>(providers: impl IntoIterator<Item = &'a CanonicalName>) -> String {
    let mut out = String::new();
    for provider in providers {
        out.push_str(&provider.to_string());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let text = "# written by app\n\napp::G_FactoryImpl\n  other::G_FactoryImpl  \napp::G_FactoryImpl\n";
        let parsed = parse(text).unwrap();
        let names: Vec<String> = parsed.iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["app::G_FactoryImpl", "other::G_FactoryImpl"]);
    }

    #[test]
    fn test_parse_accepts_dotted_names() {
        let parsed = parse("app.impls.G_FactoryImpl\n").unwrap();
        assert_eq!(parsed[0].to_string(), "app::impls::G_FactoryImpl");
    }

    #[test]
    fn test_parse_reports_line_number() {
        let err = parse("app::A\nnot a name\n").unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_render() {
        let a = CanonicalName::parse("app::A").unwrap();
        let b = CanonicalName::parse("app::B").unwrap();
        assert_eq!(render([&a, &b]), "app::A\napp::B\n");
    }
}
