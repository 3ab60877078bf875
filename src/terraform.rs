//! Import of `terraform providers schema -json` output.
//!
//! Terraform describes each resource as a block of attributes (typed with
//! cty type expressions) and nested block types. They map onto the native
//! schema as follows:
//!
//! | Terraform                          | native                      |
//! |------------------------------------|-----------------------------|
//! | `"string"` / `"bool"` / `"number"` | string / bool / float       |
//! | `["list", T]` / `["set", T]`       | list / set of `T`           |
//! | `["map", T]`                       | map                         |
//! | `["object", {..}]`                 | list of a nested resource   |
//! | block, nesting `single/group/list` | list of a nested resource   |
//! | block, nesting `set`               | set of a nested resource    |
//!
//! A block is required when `min_items > 0`. Terraform does not expose
//! `ForceNew`, so imported attributes are never immutable. `dynamic`,
//! tuples, and map-nested blocks have no native counterpart and are
//! rejected.
//!
//! # Example
//!
//! ```
//! use hemmer_bridge_gen::terraform;
//!
//! let json = r#"{
//!     "format_version": "1.0",
//!     "provider_schemas": {
//!         "registry.terraform.io/acme/widgets": {
//!             "resource_schemas": {
//!                 "widget": {
//!                     "version": 0,
//!                     "block": {
//!                         "attributes": {
//!                             "name": {"type": "string", "required": true},
//!                             "size": {"type": "number", "optional": true}
//!                         }
//!                     }
//!                 }
//!             }
//!         }
//!     }
//! }"#;
//!
//! let provider = terraform::from_json(json, None).unwrap();
//! assert!(provider.resources["widget"].schema["name"].required);
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::GenerateError;
use crate::schema::{Attribute, AttributeKind, Elem, Provider, Resource};

#[derive(Debug, Deserialize)]
struct ProviderSchemas {
    #[serde(default)]
    provider_schemas: BTreeMap<String, ProviderSchema>,
}

#[derive(Debug, Deserialize)]
struct ProviderSchema {
    #[serde(default)]
    resource_schemas: BTreeMap<String, Schema>,
}

#[derive(Debug, Deserialize)]
struct Schema {
    block: Block,
}

#[derive(Debug, Default, Deserialize)]
struct Block {
    #[serde(default)]
    attributes: BTreeMap<String, BlockAttribute>,
    #[serde(default)]
    block_types: BTreeMap<String, BlockType>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BlockAttribute {
    #[serde(rename = "type", default)]
    ty: Option<Value>,
    #[serde(default)]
    nested_type: Option<NestedType>,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NestedType {
    #[serde(default)]
    attributes: BTreeMap<String, BlockAttribute>,
    nesting_mode: String,
}

#[derive(Debug, Deserialize)]
struct BlockType {
    nesting_mode: String,
    #[serde(default)]
    block: Block,
    #[serde(default)]
    min_items: u64,
}

/// Parse a Terraform schema document and convert one of its providers.
///
/// `provider` selects a provider by source address, either in full
/// (`registry.terraform.io/hashicorp/aws`) or by its trailing segments
/// (`hashicorp/aws`, `aws`). It may be omitted when the document holds a
/// single provider.
pub fn from_json(json: &str, provider: Option<&str>) -> Result<Provider, GenerateError> {
    let schemas: ProviderSchemas = serde_json::from_str(json)?;
    let (address, schema) = select(&schemas, provider)?;
    info!(
        provider = %address,
        resources = schema.resource_schemas.len(),
        "Importing Terraform provider schema"
    );
    convert_provider(schema)
}

/// Read and convert a Terraform schema document from disk.
pub fn from_file(path: impl AsRef<Path>, provider: Option<&str>) -> Result<Provider, GenerateError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|err| GenerateError::io(path, err))?;
    from_json(&json, provider)
}

/// Source addresses of every provider in a Terraform schema document,
/// sorted.
pub fn provider_addresses(json: &str) -> Result<Vec<String>, GenerateError> {
    let schemas: ProviderSchemas = serde_json::from_str(json)?;
    Ok(schemas.provider_schemas.into_keys().collect())
}

fn select<'a>(
    schemas: &'a ProviderSchemas,
    provider: Option<&str>,
) -> Result<(&'a str, &'a ProviderSchema), GenerateError> {
    let addresses = || {
        schemas
            .provider_schemas
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut candidates: Vec<(&String, &ProviderSchema)> = match provider {
        Some(wanted) => schemas
            .provider_schemas
            .iter()
            .filter(|(address, _)| {
                address.as_str() == wanted || address.ends_with(&format!("/{}", wanted))
            })
            .collect(),
        None => schemas.provider_schemas.iter().collect(),
    };

    match (candidates.len(), provider) {
        (1, _) => {
            let (address, schema) = candidates.remove(0);
            Ok((address.as_str(), schema))
        },
        (0, Some(wanted)) => Err(GenerateError::Input(format!(
            "Provider '{}' not found; available: [{}]",
            wanted,
            addresses()
        ))),
        (0, None) => Err(GenerateError::Input(
            "Schema document contains no providers".to_string(),
        )),
        (_, _) => Err(GenerateError::Input(format!(
            "Several providers match; select one of: [{}]",
            candidates
                .iter()
                .map(|(address, _)| address.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ))),
    }
}

fn convert_provider(schema: &ProviderSchema) -> Result<Provider, GenerateError> {
    let mut provider = Provider::new();
    for (native_type, resource) in &schema.resource_schemas {
        debug!(native_type = %native_type, "Converting resource schema");
        let converted = convert_block(&resource.block, native_type)?;
        provider = provider.with_resource(native_type, converted);
    }
    Ok(provider)
}

fn convert_block(block: &Block, path: &str) -> Result<Resource, GenerateError> {
    let mut resource = Resource::new();
    resource.description = block.description.clone();

    for (name, attr) in &block.attributes {
        let attr_path = format!("{}.{}", path, name);
        resource = resource.with_attribute(name, convert_attribute(attr, &attr_path)?);
    }

    for (name, block_type) in &block.block_types {
        let attr_path = format!("{}.{}", path, name);
        let nested = convert_block(&block_type.block, &attr_path)?;
        let mut attr = match block_type.nesting_mode.as_str() {
            "single" | "group" | "list" => Attribute::list_of_resource(nested),
            "set" => Attribute::set_of_resource(nested),
            other => {
                return Err(GenerateError::unsupported(
                    attr_path,
                    format!("Unsupported block nesting mode '{}'", other),
                ));
            },
        };
        attr.required = block_type.min_items > 0;
        attr.description = block_type.block.description.clone();
        resource = resource.with_attribute(name, attr);
    }

    Ok(resource)
}

fn convert_attribute(attr: &BlockAttribute, path: &str) -> Result<Attribute, GenerateError> {
    let mut converted = match (&attr.ty, &attr.nested_type) {
        (Some(ty), _) => cty_type(ty, path)?,
        (None, Some(nested)) => nested_attribute(nested, path)?,
        (None, None) => {
            return Err(GenerateError::unsupported(
                path,
                "Attribute declares neither a type nor a nested type",
            ));
        },
    };
    converted.required = attr.required;
    converted.description = attr.description.clone();
    Ok(converted)
}

fn nested_attribute(nested: &NestedType, path: &str) -> Result<Attribute, GenerateError> {
    let mut resource = Resource::new();
    for (name, attr) in &nested.attributes {
        let attr_path = format!("{}.{}", path, name);
        resource = resource.with_attribute(name, convert_attribute(attr, &attr_path)?);
    }

    match nested.nesting_mode.as_str() {
        "single" | "list" => Ok(Attribute::list_of_resource(resource)),
        "set" => Ok(Attribute::set_of_resource(resource)),
        other => Err(GenerateError::unsupported(
            path,
            format!("Unsupported nested attribute mode '{}'", other),
        )),
    }
}

/// Convert a cty type expression. The result is optional; callers set
/// `required` from the surrounding declaration.
fn cty_type(ty: &Value, path: &str) -> Result<Attribute, GenerateError> {
    let unsupported = || GenerateError::unsupported(path, format!("Unsupported cty type {}", ty));

    match ty {
        Value::String(name) => match name.as_str() {
            "string" => Ok(Attribute::new(AttributeKind::String)),
            "bool" => Ok(Attribute::new(AttributeKind::Bool)),
            "number" => Ok(Attribute::new(AttributeKind::Float)),
            _ => Err(unsupported()),
        },
        Value::Array(parts) => match (parts.first().and_then(Value::as_str), parts.get(1)) {
            (Some("list"), Some(elem)) => {
                Ok(Attribute::new(AttributeKind::List).with_elem(cty_elem(elem, path)?))
            },
            (Some("set"), Some(elem)) => {
                Ok(Attribute::new(AttributeKind::Set).with_elem(cty_elem(elem, path)?))
            },
            (Some("map"), Some(value)) => Ok(Attribute::new(AttributeKind::Map)
                .with_elem(Elem::Attribute(Box::new(cty_type(value, path)?)))),
            (Some("object"), Some(Value::Object(_))) => {
                Ok(Attribute::new(AttributeKind::List).with_elem(cty_elem(ty, path)?))
            },
            _ => Err(unsupported()),
        },
        _ => Err(unsupported()),
    }
}

/// Element of a list or set. Objects become nested resources.
fn cty_elem(ty: &Value, path: &str) -> Result<Elem, GenerateError> {
    match ty.as_array().map(Vec::as_slice) {
        Some([kind, Value::Object(fields), rest @ ..]) if kind == "object" => {
            let optional: Vec<&str> = rest
                .first()
                .and_then(Value::as_array)
                .map(|names| names.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();

            let mut resource = Resource::new();
            let mut names: Vec<&String> = fields.keys().collect();
            names.sort();
            for name in names {
                let attr_path = format!("{}.{}", path, name);
                let mut attr = cty_type(&fields[name], &attr_path)?;
                attr.required = !optional.contains(&name.as_str());
                resource = resource.with_attribute(name, attr);
            }
            Ok(Elem::Resource(resource))
        },
        _ => Ok(Elem::Attribute(Box::new(cty_type(ty, path)?))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate;

    const DOCUMENT: &str = r#"{
        "format_version": "1.0",
        "provider_schemas": {
            "registry.terraform.io/acme/network": {
                "provider": {"version": 0, "block": {}},
                "resource_schemas": {
                    "firewall": {
                        "version": 1,
                        "block": {
                            "description": "A firewall.",
                            "attributes": {
                                "id": {"type": "string", "computed": true},
                                "name": {"type": "string", "required": true, "description": "Display name."},
                                "labels": {"type": ["map", "string"], "optional": true},
                                "ports": {"type": ["list", "number"], "optional": true},
                                "target": {
                                    "type": ["object", {"host": "string", "weight": "number"}, ["weight"]],
                                    "optional": true
                                }
                            },
                            "block_types": {
                                "rule": {
                                    "nesting_mode": "set",
                                    "min_items": 1,
                                    "block": {
                                        "attributes": {
                                            "cidr": {"type": "string", "required": true},
                                            "enabled": {"type": "bool", "optional": true}
                                        }
                                    }
                                },
                                "timeouts": {
                                    "nesting_mode": "single",
                                    "block": {
                                        "attributes": {
                                            "create": {"type": "string", "optional": true}
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "registry.terraform.io/acme/storage": {
                "resource_schemas": {}
            }
        }
    }"#;

    fn firewall() -> Resource {
        let provider = from_json(DOCUMENT, Some("acme/network")).unwrap();
        provider.resources["firewall"].clone()
    }

    #[test]
    fn test_attribute_types() {
        let firewall = firewall();
        assert_eq!(firewall.description.as_deref(), Some("A firewall."));

        let name = &firewall.schema["name"];
        assert_eq!(name.kind, AttributeKind::String);
        assert!(name.required);
        assert_eq!(name.description.as_deref(), Some("Display name."));

        let id = &firewall.schema["id"];
        assert!(!id.required);
        assert!(!id.force_new);

        assert_eq!(firewall.schema["labels"].kind, AttributeKind::Map);

        let ports = &firewall.schema["ports"];
        assert_eq!(ports.kind, AttributeKind::List);
        match &ports.elem {
            Some(Elem::Attribute(elem)) => assert_eq!(elem.kind, AttributeKind::Float),
            other => panic!("unexpected element: {other:?}"),
        }
    }

    #[test]
    fn test_object_becomes_nested_resource() {
        let target = &firewall().schema["target"];
        assert_eq!(target.kind, AttributeKind::List);
        assert!(!target.required);
        match &target.elem {
            Some(Elem::Resource(nested)) => {
                assert!(nested.schema["host"].required);
                assert!(!nested.schema["weight"].required);
                assert_eq!(nested.schema["weight"].kind, AttributeKind::Float);
            },
            other => panic!("unexpected element: {other:?}"),
        }
    }

    #[test]
    fn test_block_types() {
        let firewall = firewall();

        let rule = &firewall.schema["rule"];
        assert_eq!(rule.kind, AttributeKind::Set);
        assert!(rule.required);
        assert!(matches!(rule.elem, Some(Elem::Resource(_))));

        let timeouts = &firewall.schema["timeouts"];
        assert_eq!(timeouts.kind, AttributeKind::List);
        assert!(!timeouts.required);
    }

    #[test]
    fn test_imported_schema_is_valid() {
        let provider = from_json(DOCUMENT, Some("network")).unwrap();
        assert!(validate(&provider).is_empty());
    }

    #[test]
    fn test_provider_selection() {
        let err = from_json(DOCUMENT, None).unwrap_err();
        assert!(err.message().contains("registry.terraform.io/acme/network"));

        let err = from_json(DOCUMENT, Some("acme/compute")).unwrap_err();
        assert!(matches!(err, GenerateError::Input(_)));

        let storage = from_json(DOCUMENT, Some("registry.terraform.io/acme/storage")).unwrap();
        assert!(storage.resources.is_empty());

        assert_eq!(
            provider_addresses(DOCUMENT).unwrap(),
            vec![
                "registry.terraform.io/acme/network",
                "registry.terraform.io/acme/storage",
            ]
        );
    }

    #[test]
    fn test_single_provider_needs_no_selection() {
        let json = r#"{"provider_schemas": {"registry.terraform.io/acme/solo": {}}}"#;
        assert!(from_json(json, None).unwrap().resources.is_empty());
    }

    #[test]
    fn test_unsupported_types() {
        let document = |attr: &str| {
            format!(
                r#"{{"provider_schemas": {{"p": {{"resource_schemas": {{"r": {{"block": {{"attributes": {{"a": {}}}}}}}}}}}}}}}"#,
                attr
            )
        };

        for attr in [
            r#"{"type": "dynamic"}"#,
            r#"{"type": ["tuple", ["string", "bool"]]}"#,
            r#"{"type": ["list", "dynamic"]}"#,
            r#"{"optional": true}"#,
        ] {
            let err = from_json(&document(attr), None).unwrap_err();
            match err {
                GenerateError::UnsupportedSchema { path, .. } => assert_eq!(path, "r.a"),
                other => panic!("unexpected error for {attr}: {other:?}"),
            }
        }
    }

    #[test]
    fn test_map_nested_block_is_unsupported() {
        let json = r#"{"provider_schemas": {"p": {"resource_schemas": {"r": {"block": {
            "block_types": {"b": {"nesting_mode": "map", "block": {}}}
        }}}}}}"#;
        let err = from_json(json, None).unwrap_err();
        assert!(matches!(err, GenerateError::UnsupportedSchema { .. }));
    }

    #[test]
    fn test_malformed_document() {
        let err = from_json("{not json", None).unwrap_err();
        assert!(matches!(err, GenerateError::Serialization(_)));
    }
}
