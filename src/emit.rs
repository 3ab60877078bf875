//! Aggregate, resource, and prefix emitters.

use std::collections::HashSet;

use tracing::debug;

use crate::error::GenerateError;
use crate::generation::{Generation, PACKAGE};
use crate::naming::{capitalize, handler_name, top_level_name};
use crate::schema::Resource;
use crate::templates::{AGGREGATE, PREFIX, RESOURCE};
use crate::types::{
    doc_lines, identity_field, string_literal, AggregateType, Classification, Field, FieldData,
    PrefixData, Registration, ResourceBinding, ResourceData, StructData,
};

impl Generation {
    /// Emit the aggregate `name` for `resource` and classify its attributes.
    ///
    /// The aggregate's fragment is placed before any nested aggregate minted
    /// while mapping its fields.
    pub(crate) fn emit_aggregate(
        &mut self,
        name: &str,
        resource: &Resource,
        inject_identity: bool,
    ) -> Result<Classification, GenerateError> {
        debug!(aggregate = %name, identity = inject_identity, "Emitting aggregate");

        let fragment_slot = self.fragments.len();
        self.fragments.push(String::new());
        let aggregate_slot = self.aggregates.len();
        self.aggregates.push(AggregateType {
            name: name.to_string(),
            identity: inject_identity,
            fields: Vec::new(),
            description: resource.description.clone(),
        });

        let mut taken = HashSet::new();
        if inject_identity {
            taken.insert(identity_field(name));
        }

        let mut classification = Classification::default();
        let mut fields = Vec::with_capacity(resource.schema.len());
        for attr_name in resource.sorted_names() {
            let attr = &resource.schema[attr_name];
            if attr.force_new {
                classification.immutable.push(attr_name.to_string());
            }
            if !attr.required {
                classification.provided.push(attr_name.to_string());
            }

            let field_name = capitalize(attr_name);
            if !taken.insert(field_name.clone()) {
                return Err(GenerateError::DuplicateField {
                    aggregate: name.to_string(),
                    field: field_name,
                });
            }
            fields.push(Field {
                name: field_name,
                attribute: attr_name.to_string(),
                ty: self.field_type(name, attr_name, attr)?,
                description: attr.description.clone(),
            });
        }

        let aggregate = &mut self.aggregates[aggregate_slot];
        aggregate.fields = fields;
        let data = struct_data(aggregate);
        self.fragments[fragment_slot] = self.templates.render(AGGREGATE, &data)?;

        Ok(classification)
    }

    /// Emit the top-level aggregate for `native_type` followed by its
    /// registration builder and handler.
    pub(crate) fn emit_resource(
        &mut self,
        native_type: &str,
        resource: &Resource,
    ) -> Result<(), GenerateError> {
        let struct_type = top_level_name(native_type);
        let classification = self.emit_aggregate(&struct_type, resource, true)?;
        self.struct_types.push(struct_type.clone());

        let mut provided = Vec::with_capacity(classification.provided.len() + 1);
        provided.push(identity_field(native_type));
        provided.extend(classification.provided);

        let data = ResourceData {
            struct_type: struct_type.clone(),
            native_literal: string_literal(native_type),
            identity_field: identity_field(&struct_type),
            provided_attributes: provided.iter().map(|a| string_literal(a)).collect(),
            immutable_attributes: classification
                .immutable
                .iter()
                .map(|a| string_literal(a))
                .collect(),
        };
        let fragment = self.templates.render(RESOURCE, &data)?;
        self.fragments.push(fragment);

        debug!(
            native_type,
            aggregate = %struct_type,
            provided = provided.len(),
            immutable = classification.immutable.len(),
            "Emitted resource"
        );
        self.bindings.push(ResourceBinding {
            native_type: native_type.to_string(),
            aggregate: struct_type,
            provided,
            immutable: classification.immutable,
        });
        Ok(())
    }

    /// Render the package prefix and place it ahead of every other fragment.
    pub(crate) fn emit_prefix(&mut self) -> Result<(), GenerateError> {
        let data = PrefixData {
            package: PACKAGE.to_string(),
            bridge_crate: self.bridge_crate.clone(),
            namespace_literal: string_literal(&self.namespace),
            registrations: self
                .struct_types
                .iter()
                .map(|struct_type| Registration {
                    struct_type: struct_type.clone(),
                    handler_literal: string_literal(&format!(
                        "{}::{}",
                        self.namespace,
                        handler_name(struct_type)
                    )),
                })
                .collect(),
        };
        let prefix = self.templates.render(PREFIX, &data)?;
        self.fragments.insert(0, prefix);
        Ok(())
    }
}

fn struct_data(aggregate: &AggregateType) -> StructData {
    StructData {
        struct_type: aggregate.name.clone(),
        identity_field: aggregate.identity.then(|| aggregate.identity_field()),
        doc_lines: doc_lines(aggregate.description.as_deref()),
        fields: aggregate
            .fields
            .iter()
            .map(|field| FieldData {
                field_name: field.name.clone(),
                field_type: field.ty.to_string(),
                attribute_literal: string_literal(&field.attribute),
                doc_lines: doc_lines(field.description.as_deref()),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Attribute, Provider};
    use crate::types::TypeExpr;

    fn thing() -> Resource {
        Resource::new().with_attribute(
            "items",
            Attribute::list_of_resource(
                Resource::new()
                    .with_attribute("id", Attribute::required_string())
                    .with_attribute("price", Attribute::optional_float().with_force_new()),
            ),
        )
    }

    #[test]
    fn test_classification() {
        let mut g = Generation::new("Example").unwrap();
        let resource = Resource::new()
            .with_attribute("zone", Attribute::optional_string().with_force_new())
            .with_attribute("name", Attribute::required_string().with_force_new())
            .with_attribute("size", Attribute::optional_int());

        let classification = g.emit_aggregate("Widget", &resource, true).unwrap();
        assert_eq!(classification.provided, vec!["size", "zone"]);
        assert_eq!(classification.immutable, vec!["name", "zone"]);
    }

    #[test]
    fn test_fields_are_sorted_and_capitalised() {
        let mut g = Generation::new("Example").unwrap();
        let resource = Resource::new()
            .with_attribute("tags", Attribute::optional_map())
            .with_attribute("size", Attribute::optional_int())
            .with_attribute("name", Attribute::required_string());

        g.emit_aggregate("Widget", &resource, true).unwrap();
        let widget = g.aggregate("Widget").unwrap();
        let fields: Vec<(&str, String)> = widget
            .fields
            .iter()
            .map(|f| (f.name.as_str(), f.ty.to_string()))
            .collect();
        assert_eq!(
            fields,
            vec![
                ("Name", "String".to_string()),
                ("Size", "Option<i64>".to_string()),
                ("Tags", "Option<HashMap<String, String>>".to_string()),
            ]
        );
        assert!(widget.identity);
    }

    #[test]
    fn test_parent_precedes_nested_aggregates() {
        let mut g = Generation::new("Example").unwrap();
        g.emit_aggregate("Thing", &thing(), true).unwrap();

        assert_eq!(g.fragments().len(), 2);
        assert!(g.fragments()[0].contains("pub struct Thing {"));
        assert!(g.fragments()[1].contains("pub struct Thing_items_1 {"));

        let nested = g.aggregate("Thing_items_1").unwrap();
        assert!(!nested.identity);
        assert_eq!(
            nested.fields[1].ty,
            TypeExpr::optional(TypeExpr::Float)
        );
    }

    #[test]
    fn test_deep_nesting_follows_mint_order() {
        let deep = Resource::new()
            .with_attribute(
                "a",
                Attribute::list_of_resource(Resource::new().with_attribute(
                    "inner",
                    Attribute::set_of_resource(
                        Resource::new().with_attribute("x", Attribute::required_int()),
                    ),
                )),
            )
            .with_attribute(
                "b",
                Attribute::list_of_resource(
                    Resource::new().with_attribute("y", Attribute::required_bool()),
                ),
            );

        let mut g = Generation::new("Example").unwrap();
        g.emit_aggregate("Deep", &deep, true).unwrap();
        let names: Vec<&str> = g.aggregates().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Deep", "Deep_a_1", "Deep_a_1_inner_2", "Deep_b_3"]
        );
        assert!(g.fragments()[2].contains("pub struct Deep_a_1_inner_2 {"));
    }

    #[test]
    fn test_duplicate_field_names() {
        let mut g = Generation::new("Example").unwrap();
        let resource = Resource::new()
            .with_attribute("Name", Attribute::optional_string())
            .with_attribute("name", Attribute::optional_string());

        let err = g.emit_aggregate("Widget", &resource, false).unwrap_err();
        assert!(matches!(
            err,
            GenerateError::DuplicateField { ref field, .. } if field == "Name"
        ));
    }

    #[test]
    fn test_attribute_shadowing_identity_field() {
        let mut g = Generation::new("Example").unwrap();
        let resource = Resource::new().with_attribute("widget_id", Attribute::optional_string());

        assert!(g.emit_aggregate("Widget", &resource, true).is_err());

        // nested aggregates have no identity field to collide with
        let mut g = Generation::new("Example").unwrap();
        assert!(g.emit_aggregate("Widget", &resource, false).is_ok());
    }

    #[test]
    fn test_emit_resource_records_binding() {
        let mut g = Generation::new("Example").unwrap();
        let resource = Resource::new()
            .with_attribute("name", Attribute::required_string())
            .with_attribute("size", Attribute::optional_int().with_force_new());

        g.emit_resource("widget", &resource).unwrap();
        assert_eq!(g.struct_types(), ["Widget"]);
        assert_eq!(g.fragments().len(), 2);
        assert!(g.fragments()[1].contains("pub struct WidgetHandler"));

        let binding = &g.bindings()[0];
        assert_eq!(binding.native_type, "widget");
        assert_eq!(binding.aggregate, "Widget");
        assert_eq!(binding.provided, vec!["widget_id", "size"]);
        assert_eq!(binding.immutable, vec!["size"]);
    }

    #[test]
    fn test_prefix_is_prepended() {
        let provider = Provider::new().with_resource("thing", thing());
        let mut g = Generation::new("Example").unwrap();
        g.emit_provider(&provider).unwrap();

        let fragments = g.fragments();
        assert_eq!(fragments.len(), 4);
        assert!(fragments[0].contains("pub fn Initialize("));
        assert!(fragments[0].contains("\"Example::ThingHandler\""));
        assert!(fragments[1].contains("pub struct Thing {"));
        assert!(fragments[2].contains("pub struct Thing_items_1 {"));
        assert!(fragments[3].contains("pub fn Thing_rtb("));
    }
}
