//! Error types for the bridge generator.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while generating a bridge package.
///
/// Every error is terminal: the generator has no recovery path and any
/// partially written output should be discarded.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// An attribute has a shape the type mapper cannot express.
    #[error("Unsupported schema at {path}: {detail}")]
    UnsupportedSchema {
        /// Dotted path of the offending attribute (`resource.attr.nested`).
        path: String,
        /// Description of the offending value.
        detail: String,
    },

    /// A top-level aggregate name is already taken by another resource, a
    /// handler, or a type the emitted package uses.
    #[error("Duplicate aggregate type: {0}")]
    DuplicateAggregate(String),

    /// Two attributes of one schema map to the same field name.
    #[error("Duplicate field {field} in aggregate {aggregate}")]
    DuplicateField {
        /// The aggregate being emitted.
        aggregate: String,
        /// The colliding field name.
        field: String,
    },

    /// A code template failed to render.
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    /// The formatter rejected an emitted fragment.
    #[error("Unexpected error formatting source: {message}\n{fragment}")]
    Format {
        /// The fragment that failed to format.
        fragment: String,
        /// The formatter's diagnostic.
        message: String,
    },

    /// Directory creation or file write failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The path being created or written.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A schema document could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The input document was well-formed but unusable.
    #[error("Invalid input: {0}")]
    Input(String),
}

impl GenerateError {
    /// Create an unsupported-schema error for the attribute at `path`.
    pub fn unsupported(path: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::UnsupportedSchema {
            path: path.into(),
            detail: detail.into(),
        }
    }

    /// Create an I/O error bound to `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Get the error message as a string.
    ///
    /// For variants that wrap another error this is a short summary; use the
    /// `Display` or `Debug` output for the full detail.
    pub fn message(&self) -> &str {
        match self {
            Self::UnsupportedSchema { detail, .. } => detail,
            Self::DuplicateAggregate(name) => name,
            Self::DuplicateField { field, .. } => field,
            Self::Template(_err) => "template error (see Debug output)",
            Self::Format { message, .. } => message,
            Self::Io { .. } => "I/O error (see Debug output)",
            Self::Serialization(_err) => "serialization error (see Debug output)",
            Self::Input(msg) => msg,
        }
    }
}
