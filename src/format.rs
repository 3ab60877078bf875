//! Source formatting for emitted fragments.
//!
//! Each fragment is formatted on its own. A fragment the formatter cannot
//! parse is a fatal error carrying the fragment text.

use std::io::Write;
use std::process::{Command, Stdio};

use crate::error::GenerateError;

/// Formats one emitted fragment.
pub trait Formatter {
    /// Return the formatted form of `fragment`.
    fn format(&self, fragment: &str) -> Result<String, GenerateError>;
}

/// In-process formatting with `syn` and `prettyplease`.
///
/// `prettyplease` works on the syntax tree, which has no room for plain
/// comments, so a leading banner of `//` lines (and the blank lines between
/// them) is carried over verbatim. Doc comments survive as attributes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrettyPlease;

impl Formatter for PrettyPlease {
    fn format(&self, fragment: &str) -> Result<String, GenerateError> {
        let (banner, body) = split_banner(fragment);
        let file = syn::parse_file(body).map_err(|err| GenerateError::Format {
            fragment: fragment.to_string(),
            message: err.to_string(),
        })?;

        let mut out = String::with_capacity(fragment.len());
        let banner = banner.trim();
        if !banner.is_empty() {
            out.push_str(banner);
            out.push_str("\n\n");
        }
        out.push_str(&prettyplease::unparse(&file));
        Ok(out)
    }
}

/// Formatting through an external `rustfmt` binary.
#[derive(Debug, Clone)]
pub struct Rustfmt {
    program: String,
    edition: String,
}

impl Default for Rustfmt {
    fn default() -> Self {
        Self {
            program: "rustfmt".to_string(),
            edition: "2021".to_string(),
        }
    }
}

impl Rustfmt {
    /// Use the `rustfmt` found on `PATH`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific `rustfmt` executable.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Set the edition passed to `rustfmt`.
    pub fn with_edition(mut self, edition: impl Into<String>) -> Self {
        self.edition = edition.into();
        self
    }
}

impl Formatter for Rustfmt {
    fn format(&self, fragment: &str) -> Result<String, GenerateError> {
        let format_error = |message: String| GenerateError::Format {
            fragment: fragment.to_string(),
            message,
        };

        let mut child = Command::new(&self.program)
            .args(["--edition", &self.edition, "--emit", "stdout", "--quiet"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| format_error(format!("failed to run {}: {}", self.program, err)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(fragment.as_bytes())
                .map_err(|err| format_error(err.to_string()))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|err| format_error(err.to_string()))?;
        if !output.status.success() {
            return Err(format_error(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        String::from_utf8(output.stdout).map_err(|err| format_error(err.to_string()))
    }
}

/// Leaves fragments untouched. Useful when inspecting raw template output.
#[derive(Debug, Clone, Copy, Default)]
pub struct Verbatim;

impl Formatter for Verbatim {
    fn format(&self, fragment: &str) -> Result<String, GenerateError> {
        Ok(fragment.to_string())
    }
}

/// The built-in formatters, selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatterKind {
    /// [`PrettyPlease`]
    #[default]
    PrettyPlease,
    /// [`Rustfmt`]
    Rustfmt,
    /// [`Verbatim`]
    Verbatim,
}

impl FormatterKind {
    /// Instantiate the formatter.
    pub fn formatter(self) -> Box<dyn Formatter> {
        match self {
            Self::PrettyPlease => Box::new(PrettyPlease),
            Self::Rustfmt => Box::new(Rustfmt::new()),
            Self::Verbatim => Box::new(Verbatim),
        }
    }
}

/// Format every fragment in place.
pub fn format_fragments(
    formatter: &dyn Formatter,
    fragments: &mut [String],
) -> Result<(), GenerateError> {
    for fragment in fragments.iter_mut() {
        *fragment = formatter.format(fragment)?;
    }
    Ok(())
}

/// Split off leading blank lines and plain `//` comments. Doc comments
/// (`//!`, `///`) stay in the body.
fn split_banner(source: &str) -> (&str, &str) {
    let mut end = 0;
    for line in source.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let is_banner = trimmed.trim().is_empty()
            || (trimmed.starts_with("//")
                && !trimmed.starts_with("///")
                && !trimmed.starts_with("//!"));
        if !is_banner {
            break;
        }
        end += line.len();
    }
    source.split_at(end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prettyplease_normalises_layout() {
        let formatted = PrettyPlease
            .format("pub struct   Widget{pub Name:String,\n\n pub Size : Option<i64>}")
            .unwrap();
        assert_eq!(
            formatted,
            "pub struct Widget {\n    pub Name: String,\n    pub Size: Option<i64>,\n}\n"
        );
    }

    #[test]
    fn test_prettyplease_keeps_banner() {
        let source = "// Code generated. DO NOT EDIT.\n\n// second line\n\n//! Package docs.\n\nfn   f() {}\n";
        let formatted = PrettyPlease.format(source).unwrap();
        assert!(formatted.starts_with("// Code generated. DO NOT EDIT.\n\n// second line\n\n"));
        assert!(formatted.contains("//! Package docs."));
        assert!(formatted.contains("fn f() {}"));
    }

    #[test]
    fn test_prettyplease_rejects_invalid_source() {
        let err = PrettyPlease.format("pub struct {").unwrap_err();
        match err {
            GenerateError::Format { fragment, .. } => assert_eq!(fragment, "pub struct {"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_prettyplease_drops_leading_blank_lines() {
        let formatted = PrettyPlease.format("\n\nfn f() {}\n").unwrap();
        assert_eq!(formatted, "fn f() {}\n");
    }

    #[test]
    fn test_split_banner() {
        assert_eq!(split_banner("// a\n\nfn f() {}"), ("// a\n\n", "fn f() {}"));
        assert_eq!(split_banner("/// doc\nfn f() {}"), ("", "/// doc\nfn f() {}"));
        assert_eq!(split_banner("fn f() {}"), ("", "fn f() {}"));
    }

    #[test]
    fn test_verbatim() {
        assert_eq!(Verbatim.format("fn   f(){}").unwrap(), "fn   f(){}");
    }

    #[test]
    fn test_missing_rustfmt_is_a_format_error() {
        let formatter = Rustfmt::new().with_program("/nonexistent/rustfmt");
        let err = formatter.format("fn f() {}").unwrap_err();
        assert!(matches!(err, GenerateError::Format { .. }));
    }

    #[test]
    fn test_format_fragments() {
        let mut fragments = vec!["fn a(){}".to_string(), "fn b(){}".to_string()];
        format_fragments(&PrettyPlease, &mut fragments).unwrap();
        assert_eq!(fragments, vec!["fn a() {}\n", "fn b() {}\n"]);
    }
}
