//! Hemmer Bridge Generator
//!
//! This crate turns a Terraform-style provider schema into the source of a
//! bridge package: one typed aggregate per resource (plus any nested
//! aggregates), a registration builder and CRUD handler for each, and an
//! `Initialize` function that registers them all under one namespace.
//!
//! # Overview
//!
//! The crate provides:
//!
//! - **Schema types**: [`Provider`], [`Resource`](schema::Resource) and
//!   [`Attribute`](schema::Attribute), loadable from JSON
//! - **Terraform import**: conversion from `terraform providers schema -json`
//! - **Validation**: up-front diagnostics for schemas the generator cannot emit
//! - **Generation**: a per-run [`Generation`] context that mints unique type
//!   names and emits source fragments
//! - **Formatting**: pluggable [`Formatter`]s (prettyplease, rustfmt, verbatim)
//! - **Logging**: Integration with `tracing` for structured logging
//!
//! # Quick Start
//!
//! ```
//! use hemmer_bridge_gen::{generate, validate_result};
//! use hemmer_bridge_gen::schema::{Attribute, Provider, Resource};
//!
//! let provider = Provider::new().with_resource(
//!     "thing",
//!     Resource::new().with_attribute(
//!         "items",
//!         Attribute::list_of_resource(
//!             Resource::new()
//!                 .with_attribute("id", Attribute::required_string())
//!                 .with_attribute("price", Attribute::optional_float().with_force_new()),
//!         ),
//!     ),
//! );
//! assert!(validate_result(&provider).is_ok());
//!
//! let dir = tempfile::tempdir().unwrap();
//! let path = dir.path().join("generated.rs");
//! generate(&provider, "Example", &path).unwrap();
//!
//! let source = std::fs::read_to_string(&path).unwrap();
//! assert!(source.contains("pub struct Thing_items_1 {"));
//! ```
//!
//! # Emitted Package
//!
//! The generated file contains, in order:
//!
//! - A banner and the package prefix (imports, provider configuration and
//!   `Initialize`)
//! - For each resource, sorted by name: its aggregate, the nested aggregates
//!   minted while mapping its fields, then `<Aggregate>_rtb` and
//!   `<Aggregate>Handler`
//!
//! Nested aggregates are named `<Parent>_<attribute>_<n>`, where `n` counts
//! up across the whole run.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod format;
pub mod generation;
pub mod generator;
pub mod logging;
pub mod naming;
pub mod output;
pub mod schema;
pub mod terraform;
pub mod testing;
pub mod types;
pub mod validation;

mod emit;
mod mapper;
mod templates;

// Re-export main types at crate root
pub use error::GenerateError;
pub use format::{Formatter, FormatterKind, PrettyPlease, Rustfmt, Verbatim};
pub use generation::{Generation, DEFAULT_BRIDGE_CRATE, PACKAGE};
pub use generator::{
    generate, generate_with_options, render, render_with_formatter, render_with_options,
    GenerateOptions,
};
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use schema::Provider;
pub use types::{AggregateType, Classification, ResourceBinding, TypeExpr};
pub use validation::{is_valid, validate, validate_result};

// Re-export commonly used external types
pub use serde_json;
pub use tracing;
