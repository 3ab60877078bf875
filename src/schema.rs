//! Schema types for describing provider and resource structure.
//!
//! These mirror the resource model of a Terraform-style provider: a provider
//! is a set of named resource types, each described by a map of attribute
//! schemas. Attributes of a sequence kind carry an element that is either
//! another attribute schema or a nested resource.
//!
//! Attribute maps are unordered. The generator sorts names before emitting
//! anything, so insertion order never affects output.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::GenerateError;

/// The kind of an attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    /// A boolean value.
    Bool,
    /// An integer.
    Int,
    /// A floating point number.
    Float,
    /// A string value.
    String,
    /// A map from string keys to values.
    Map,
    /// An ordered sequence of elements.
    List,
    /// An unordered sequence of unique elements.
    Set,
    /// Any kind this crate does not recognise.
    #[serde(other)]
    Invalid,
}

impl AttributeKind {
    /// Whether values of this kind are sequences with an element schema.
    pub fn is_sequence(self) -> bool {
        matches!(self, Self::List | Self::Set)
    }

    /// Whether this kind maps to a primitive type.
    pub fn is_primitive(self) -> bool {
        matches!(self, Self::Bool | Self::Int | Self::Float | Self::String)
    }
}

/// The element of a list or set attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Elem {
    /// A homogeneous sequence of values described by an attribute schema.
    Attribute(Box<Attribute>),
    /// A sequence of nested records.
    Resource(Resource),
}

/// Describes a single attribute in a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// The kind of the attribute.
    #[serde(rename = "type")]
    pub kind: AttributeKind,
    /// The attribute must be supplied in configuration.
    #[serde(default)]
    pub required: bool,
    /// If set, changing this attribute forces resource replacement.
    #[serde(default)]
    pub force_new: bool,
    /// Element schema, meaningful only for list and set kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elem: Option<Elem>,
    /// Human-readable description of the attribute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Attribute {
    /// Create an optional attribute of the given kind.
    pub fn new(kind: AttributeKind) -> Self {
        Self {
            kind,
            required: false,
            force_new: false,
            elem: None,
            description: None,
        }
    }

    /// Create a required string attribute.
    pub fn required_string() -> Self {
        Self::new(AttributeKind::String).required()
    }

    /// Create an optional string attribute.
    pub fn optional_string() -> Self {
        Self::new(AttributeKind::String)
    }

    /// Create a required int attribute.
    pub fn required_int() -> Self {
        Self::new(AttributeKind::Int).required()
    }

    /// Create an optional int attribute.
    pub fn optional_int() -> Self {
        Self::new(AttributeKind::Int)
    }

    /// Create a required float attribute.
    pub fn required_float() -> Self {
        Self::new(AttributeKind::Float).required()
    }

    /// Create an optional float attribute.
    pub fn optional_float() -> Self {
        Self::new(AttributeKind::Float)
    }

    /// Create a required bool attribute.
    pub fn required_bool() -> Self {
        Self::new(AttributeKind::Bool).required()
    }

    /// Create an optional bool attribute.
    pub fn optional_bool() -> Self {
        Self::new(AttributeKind::Bool)
    }

    /// Create an optional map attribute.
    pub fn optional_map() -> Self {
        Self::new(AttributeKind::Map)
    }

    /// Create an optional list whose elements are described by `elem`.
    pub fn list_of(elem: Attribute) -> Self {
        Self::new(AttributeKind::List).with_elem(Elem::Attribute(Box::new(elem)))
    }

    /// Create an optional set whose elements are described by `elem`.
    pub fn set_of(elem: Attribute) -> Self {
        Self::new(AttributeKind::Set).with_elem(Elem::Attribute(Box::new(elem)))
    }

    /// Create an optional list of nested records.
    pub fn list_of_resource(resource: Resource) -> Self {
        Self::new(AttributeKind::List).with_elem(Elem::Resource(resource))
    }

    /// Create an optional set of nested records.
    pub fn set_of_resource(resource: Resource) -> Self {
        Self::new(AttributeKind::Set).with_elem(Elem::Resource(resource))
    }

    /// Mark this attribute as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark this attribute as forcing resource replacement when changed.
    pub fn with_force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    /// Set the element schema.
    pub fn with_elem(mut self, elem: Elem) -> Self {
        self.elem = Some(elem);
        self
    }

    /// Set the description for this attribute.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Schema for a resource or a nested record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Resource {
    /// Attributes keyed by name. Names are unique and case-sensitive.
    #[serde(default)]
    pub schema: HashMap<String, Attribute>,
    /// Human-readable description of the resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Resource {
    /// Create a new resource with no attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute to this resource.
    pub fn with_attribute(mut self, name: impl Into<String>, attr: Attribute) -> Self {
        self.schema.insert(name.into(), attr);
        self
    }

    /// Set the description for this resource.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attribute names in lexicographic order.
    pub fn sorted_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schema.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// A provider: resource schemas keyed by native type name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Provider {
    /// Schemas for each resource type.
    #[serde(default)]
    pub resources: HashMap<String, Resource>,
}

impl Provider {
    /// Create a new provider with no resources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource schema.
    pub fn with_resource(mut self, name: impl Into<String>, resource: Resource) -> Self {
        self.resources.insert(name.into(), resource);
        self
    }

    /// Native resource names in lexicographic order.
    pub fn sorted_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.resources.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Decode a provider from its native JSON form.
    pub fn from_json(json: &str) -> Result<Self, GenerateError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a provider from a file holding its native JSON form.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GenerateError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|err| GenerateError::io(path, err))?;
        Self::from_json(&json)
    }
}

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// An error that prevents generation.
    Error,
    /// A warning that doesn't prevent generation but should be addressed.
    Warning,
}

/// A diagnostic message about a provider schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity of the diagnostic.
    pub severity: DiagnosticSeverity,
    /// A short summary of the issue.
    pub summary: String,
    /// A detailed description of the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// The attribute path where the issue occurred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(summary: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            summary: summary.into(),
            detail: None,
            attribute: None,
        }
    }

    /// Create a warning diagnostic.
    pub fn warning(summary: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            summary: summary.into(),
            detail: None,
            attribute: None,
        }
    }

    /// Add detail to this diagnostic.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Set the attribute path for this diagnostic.
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// Whether this diagnostic is an error.
    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}
