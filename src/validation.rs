//! Provider schema validation.
//!
//! This module checks a [`Provider`] for shapes the generator cannot turn
//! into valid source before any code is emitted. It reports every problem it
//! finds rather than stopping at the first one.
//!
//! # Example
//!
//! ```
//! use hemmer_bridge_gen::schema::{Attribute, Provider, Resource};
//! use hemmer_bridge_gen::validation::validate;
//!
//! let provider = Provider::new().with_resource(
//!     "widget",
//!     Resource::new()
//!         .with_attribute("name", Attribute::required_string())
//!         .with_attribute("Name", Attribute::optional_string()),
//! );
//!
//! let diagnostics = validate(&provider);
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].attribute, Some("widget.name".to_string()));
//! ```

use std::collections::HashMap;

use crate::naming::{capitalize, handler_name, is_identifier, is_reserved_type_name};
use crate::schema::{Attribute, AttributeKind, Diagnostic, Elem, Provider, Resource};
use crate::types::identity_field;

/// Validate a provider schema.
///
/// Returns diagnostics in a stable order (sorted resource, then attribute
/// names). An empty list means the provider can be generated.
///
/// # Validation Rules
///
/// - Resource and attribute names must be identifiers
/// - Names must stay unique after capitalisation
/// - Top-level attributes must not shadow the identity field
/// - Aggregates must not reuse a handler or an imported type name
/// - Lists and sets must declare an element
/// - Attribute kinds must be known
/// - An element on a non-sequence kind is ignored (warning)
/// - A map's declared value type is collapsed to string (warning)
pub fn validate(provider: &Provider) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut aggregates: HashMap<String, &str> = HashMap::new();

    for native_type in provider.sorted_names() {
        if !is_identifier(native_type) {
            diagnostics.push(
                Diagnostic::error(format!("Invalid resource name '{}'", native_type))
                    .with_detail("Resource names must be identifiers")
                    .with_attribute(native_type),
            );
        }
        let aggregate = capitalize(native_type);
        if is_reserved_type_name(&aggregate) {
            diagnostics.push(
                Diagnostic::error(format!("Reserved aggregate type '{}'", aggregate))
                    .with_detail("The name clashes with a type the generated package uses")
                    .with_attribute(native_type),
            );
        }
        if let Some(first) = aggregates.insert(aggregate.clone(), native_type) {
            diagnostics.push(
                Diagnostic::error(format!("Duplicate aggregate type '{}'", aggregate))
                    .with_detail(format!("'{}' and '{}' collide", first, native_type))
                    .with_attribute(native_type),
            );
        }
        let resource = &provider.resources[native_type];
        let identity = identity_field(&aggregate);
        if let Some(attr) = resource
            .sorted_names()
            .into_iter()
            .find(|name| capitalize(name) == identity)
        {
            diagnostics.push(
                Diagnostic::error(format!("Attribute '{}' shadows the identity field", attr))
                    .with_detail(format!("'{}' is reserved on top-level aggregates", identity))
                    .with_attribute(join_path(native_type, attr)),
            );
        }
        validate_resource(resource, native_type, &mut diagnostics);
    }

    for native_type in provider.sorted_names() {
        let handler = handler_name(&capitalize(native_type));
        if let Some(other) = aggregates.get(&handler) {
            diagnostics.push(
                Diagnostic::error(format!("Aggregate type '{}' shadows a handler", handler))
                    .with_detail(format!("'{}' is the handler of '{}'", handler, native_type))
                    .with_attribute(*other),
            );
        }
    }

    diagnostics
}

/// Validate a provider, returning Ok if it has no errors or Err with all
/// diagnostics otherwise. Warnings alone do not fail.
pub fn validate_result(provider: &Provider) -> Result<Vec<Diagnostic>, Vec<Diagnostic>> {
    let diagnostics = validate(provider);
    if diagnostics.iter().any(Diagnostic::is_error) {
        Err(diagnostics)
    } else {
        Ok(diagnostics)
    }
}

/// Check if a provider can be generated without errors.
pub fn is_valid(provider: &Provider) -> bool {
    !validate(provider).iter().any(Diagnostic::is_error)
}

fn validate_resource(resource: &Resource, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    let mut fields: HashMap<String, &str> = HashMap::new();

    for name in resource.sorted_names() {
        let attr_path = join_path(path, name);
        if !is_identifier(name) {
            diagnostics.push(
                Diagnostic::error(format!("Invalid attribute name '{}'", name))
                    .with_detail("Attribute names must be identifiers")
                    .with_attribute(&attr_path),
            );
        }
        if let Some(first) = fields.insert(capitalize(name), name) {
            diagnostics.push(
                Diagnostic::error(format!("Duplicate field '{}'", capitalize(name)))
                    .with_detail(format!("'{}' and '{}' collide", first, name))
                    .with_attribute(&attr_path),
            );
        }
        validate_attribute(&resource.schema[name], &attr_path, diagnostics);
    }
}

fn validate_attribute(attr: &Attribute, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    match attr.kind {
        AttributeKind::Bool | AttributeKind::Int | AttributeKind::Float | AttributeKind::String => {
            if attr.elem.is_some() {
                diagnostics.push(ignored_elem(path));
            }
        },
        AttributeKind::Map => match &attr.elem {
            Some(Elem::Attribute(value)) if value.kind == AttributeKind::String => {},
            Some(_) => {
                diagnostics.push(
                    Diagnostic::warning(format!("Map value type of '{}' is collapsed", path))
                        .with_detail("Map values are always emitted as strings")
                        .with_attribute(path),
                );
            },
            None => {},
        },
        AttributeKind::List | AttributeKind::Set => match &attr.elem {
            Some(Elem::Attribute(elem)) => validate_attribute(elem, path, diagnostics),
            Some(Elem::Resource(nested)) => validate_resource(nested, path, diagnostics),
            None => {
                diagnostics.push(
                    Diagnostic::error(format!("Sequence '{}' has no element", path))
                        .with_detail("Lists and sets must declare an attribute or resource element")
                        .with_attribute(path),
                );
            },
        },
        AttributeKind::Invalid => {
            diagnostics.push(
                Diagnostic::error(format!("Unknown kind for '{}'", path))
                    .with_attribute(path),
            );
        },
    }
}

fn ignored_elem(path: &str) -> Diagnostic {
    Diagnostic::warning(format!("Element of '{}' is ignored", path))
        .with_detail("Only lists and sets use an element schema")
        .with_attribute(path)
}

fn join_path(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", base, name)
    }
}
