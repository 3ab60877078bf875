//! Generated type model.
//!
//! The type mapper produces [`TypeExpr`] values and the aggregate emitter
//! collects them into [`AggregateType`] definitions. Their `Display` output
//! is the Rust text written into the bridge package.

use serde::Serialize;
use std::fmt;

/// A type expression in the emitted source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    /// `bool`
    Bool,
    /// `i64`
    Int,
    /// `f64`
    Float,
    /// `String`
    String,
    /// `HashMap<String, String>`, whatever the declared value type.
    StringMap,
    /// `Vec<T>`
    Sequence(Box<TypeExpr>),
    /// `Option<T>`
    Optional(Box<TypeExpr>),
    /// A generated aggregate, referenced by name.
    Named(String),
}

impl TypeExpr {
    /// Wrap a type in a sequence.
    pub fn sequence(inner: TypeExpr) -> Self {
        Self::Sequence(Box::new(inner))
    }

    /// Wrap a type in the optional marker.
    pub fn optional(inner: TypeExpr) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// Whether the outermost layer is the optional marker.
    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("i64"),
            Self::Float => f.write_str("f64"),
            Self::String => f.write_str("String"),
            Self::StringMap => f.write_str("HashMap<String, String>"),
            Self::Sequence(inner) => write!(f, "Vec<{}>", inner),
            Self::Optional(inner) => write!(f, "Option<{}>", inner),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// One field of a generated aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// The field identifier (the attribute name, capitalised).
    pub name: String,
    /// The native attribute name, used when marshaling.
    pub attribute: String,
    /// The field's type.
    pub ty: TypeExpr,
    /// Documentation carried over from the attribute schema.
    pub description: Option<String>,
}

/// A generated named record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateType {
    /// The generated type name.
    pub name: String,
    /// Whether the hidden identity field is injected.
    pub identity: bool,
    /// Fields in lexicographic attribute order.
    pub fields: Vec<Field>,
    /// Documentation carried over from the resource schema.
    pub description: Option<String>,
}

impl AggregateType {
    /// Name of the injected identity field.
    pub fn identity_field(&self) -> String {
        identity_field(&self.name)
    }
}

/// Name of the identity field injected into the aggregate `aggregate`.
pub fn identity_field(aggregate: &str) -> String {
    format!("{}_id", aggregate)
}

/// Attribute classification returned by the aggregate emitter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Classification {
    /// Attributes whose value the provider may supply (not required).
    pub provided: Vec<String>,
    /// Attributes that force replacement when changed.
    pub immutable: Vec<String>,
}

/// A top-level resource as registered in the bridge package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceBinding {
    /// The provider-declared resource name.
    pub native_type: String,
    /// The aggregate generated for it.
    pub aggregate: String,
    /// Provided attributes, starting with `<native_type>_id`.
    pub provided: Vec<String>,
    /// Immutable attributes.
    pub immutable: Vec<String>,
}

/// Template data for the package prefix.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct PrefixData {
    pub package: String,
    pub bridge_crate: String,
    pub namespace_literal: String,
    pub registrations: Vec<Registration>,
}

/// One `Initialize` registration.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct Registration {
    pub struct_type: String,
    pub handler_literal: String,
}

/// Template data for an aggregate definition.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct StructData {
    pub struct_type: String,
    pub identity_field: Option<String>,
    pub doc_lines: Vec<String>,
    pub fields: Vec<FieldData>,
}

/// Template data for one aggregate field.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct FieldData {
    pub field_name: String,
    pub field_type: String,
    pub attribute_literal: String,
    pub doc_lines: Vec<String>,
}

/// Template data for a registration builder and its handler.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ResourceData {
    pub struct_type: String,
    pub native_literal: String,
    pub identity_field: String,
    pub provided_attributes: Vec<String>,
    pub immutable_attributes: Vec<String>,
}

/// Render `value` as a Rust string literal, quotes included.
pub(crate) fn string_literal(value: &str) -> String {
    format!("{:?}", value)
}

/// Render a description as `#[doc]` literals, one per line.
pub(crate) fn doc_lines(description: Option<&str>) -> Vec<String> {
    description
        .map(|text| {
            text.lines()
                .map(|line| string_literal(&format!(" {}", line.trim_end())))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_expr_display() {
        assert_eq!(TypeExpr::Bool.to_string(), "bool");
        assert_eq!(TypeExpr::Int.to_string(), "i64");
        assert_eq!(TypeExpr::Float.to_string(), "f64");
        assert_eq!(TypeExpr::String.to_string(), "String");
        assert_eq!(TypeExpr::StringMap.to_string(), "HashMap<String, String>");

        let nested = TypeExpr::optional(TypeExpr::sequence(TypeExpr::Named(
            "Thing_items_1".to_string(),
        )));
        assert_eq!(nested.to_string(), "Option<Vec<Thing_items_1>>");
        assert!(nested.is_optional());
        assert!(!TypeExpr::sequence(TypeExpr::Int).is_optional());
    }

    #[test]
    fn test_identity_field() {
        let aggregate = AggregateType {
            name: "Widget".to_string(),
            identity: true,
            fields: Vec::new(),
            description: None,
        };
        assert_eq!(aggregate.identity_field(), "Widget_id");
    }

    #[test]
    fn test_string_literal_escapes() {
        assert_eq!(string_literal("widget"), "\"widget\"");
        assert_eq!(string_literal("a\"b"), "\"a\\\"b\"");
        assert_eq!(string_literal("line\nbreak"), "\"line\\nbreak\"");
    }

    #[test]
    fn test_doc_lines() {
        assert!(doc_lines(None).is_empty());
        assert_eq!(
            doc_lines(Some("First line.\nSecond line.  ")),
            vec!["\" First line.\"", "\" Second line.\""]
        );
    }
}
