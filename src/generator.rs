//! The generation pipeline.
//!
//! [`generate`] walks a provider's resources in lexicographic order, emits one
//! aggregate per resource (plus any nested aggregates), a registration
//! builder and CRUD handler for each, then prepends the package prefix,
//! formats every fragment, and writes the result.
//!
//! # Example
//!
//! ```
//! use hemmer_bridge_gen::render;
//! use hemmer_bridge_gen::schema::{Attribute, Provider, Resource};
//!
//! let provider = Provider::new().with_resource(
//!     "widget",
//!     Resource::new()
//!         .with_attribute("name", Attribute::required_string())
//!         .with_attribute("size", Attribute::optional_int()),
//! );
//!
//! let source = render(&provider, "Example").unwrap();
//! assert!(source.contains("pub struct Widget {"));
//! assert!(source.contains("pub Size: Option<i64>,"));
//! ```

use std::path::Path;

use tracing::{info, instrument};

use crate::error::GenerateError;
use crate::format::{format_fragments, Formatter, FormatterKind};
use crate::generation::{Generation, DEFAULT_BRIDGE_CRATE};
use crate::output::{join_fragments, write_source_file};
use crate::schema::Provider;

/// Options for a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Namespace every aggregate and handler is registered under.
    pub namespace: String,
    /// Path of the crate the emitted code imports the bridge runtime from.
    /// Default: `hemmer_bridge`.
    pub bridge_crate: String,
    /// Formatter applied to every fragment. Default: prettyplease.
    pub formatter: FormatterKind,
}

impl GenerateOptions {
    /// Create options for `namespace` with default values.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            bridge_crate: DEFAULT_BRIDGE_CRATE.to_string(),
            formatter: FormatterKind::default(),
        }
    }

    /// Set the bridge runtime crate path.
    pub fn with_bridge_crate(mut self, bridge_crate: impl Into<String>) -> Self {
        self.bridge_crate = bridge_crate.into();
        self
    }

    /// Set the formatter.
    pub fn with_formatter(mut self, formatter: FormatterKind) -> Self {
        self.formatter = formatter;
        self
    }
}

/// Generate the bridge package for `provider` and write it to `output_path`.
///
/// Missing parent directories are created and an existing file is truncated.
pub fn generate(
    provider: &Provider,
    namespace: &str,
    output_path: impl AsRef<Path>,
) -> Result<(), GenerateError> {
    generate_with_options(provider, &GenerateOptions::new(namespace), output_path)
}

/// Generate with custom options.
///
/// See [`generate`] for details.
#[instrument(skip_all, fields(namespace = %options.namespace, path = %output_path.as_ref().display()))]
pub fn generate_with_options(
    provider: &Provider,
    options: &GenerateOptions,
    output_path: impl AsRef<Path>,
) -> Result<(), GenerateError> {
    let formatter = options.formatter.formatter();
    let fragments = emit_and_format(provider, options, formatter.as_ref())?;
    write_source_file(output_path.as_ref(), &fragments)?;
    info!(fragments = fragments.len(), "Bridge package written");
    Ok(())
}

/// Run the pipeline without writing, returning the generated source.
pub fn render(provider: &Provider, namespace: &str) -> Result<String, GenerateError> {
    render_with_options(provider, &GenerateOptions::new(namespace))
}

/// Render with custom options.
pub fn render_with_options(
    provider: &Provider,
    options: &GenerateOptions,
) -> Result<String, GenerateError> {
    let formatter = options.formatter.formatter();
    render_with_formatter(provider, options, formatter.as_ref())
}

/// Render with a caller-supplied formatter. `options.formatter` is ignored.
pub fn render_with_formatter(
    provider: &Provider,
    options: &GenerateOptions,
    formatter: &dyn Formatter,
) -> Result<String, GenerateError> {
    let fragments = emit_and_format(provider, options, formatter)?;
    Ok(join_fragments(&fragments))
}

fn emit_and_format(
    provider: &Provider,
    options: &GenerateOptions,
    formatter: &dyn Formatter,
) -> Result<Vec<String>, GenerateError> {
    let mut generation = Generation::with_bridge_crate(&options.namespace, &options.bridge_crate)?;
    generation.emit_provider(provider)?;

    let mut fragments = generation.into_fragments();
    format_fragments(formatter, &mut fragments)?;
    Ok(fragments)
}
