//! Source templates for the emitted bridge package.
//!
//! Templates only produce text; layout is normalised afterwards by the
//! formatter, so whitespace here is not significant. Every value spliced into
//! a string literal is pre-escaped by the caller (`*_literal` fields).

use serde::Serialize;
use tera::{Context, Tera};

use crate::error::GenerateError;

pub(crate) const PREFIX: &str = "prefix.rs";
pub(crate) const AGGREGATE: &str = "aggregate.rs";
pub(crate) const RESOURCE: &str = "resource.rs";

const PREFIX_TEMPLATE: &str = r#"// Code generated by hemmer-bridge-gen. DO NOT EDIT.

// This code is generated on a per-provider basis from the provider's resource
// schemas. Regenerate it whenever those schemas change.

//! Package `{{ package }}`: typed bridge entities and their CRUD handlers.

#![allow(non_snake_case, non_camel_case_types, dead_code, unused_imports, unused_variables, clippy::all)]

use std::collections::HashMap;
use std::sync::{Arc, Once, OnceLock};

use serde::{Deserialize, Serialize};
use tracing::info;

use {{ bridge_crate }}::{self as bridge, service, Provider, ResourceConfig};

static CONFIGURE: Once = Once::new();

/// Provider configuration applied the first time any handler runs.
pub static CONFIG: OnceLock<ResourceConfig> = OnceLock::new();

fn configure_provider(p: &Provider) {
    CONFIGURE.call_once(|| {
        let config = CONFIG.get_or_init(ResourceConfig::default);
        if let Err(err) = p.configure(config) {
            panic!("failed to configure provider: {}", err);
        }
    });
}

/// Registers every bridged resource type and its handler.
pub fn Initialize(sb: &mut service::Builder, p: &Arc<Provider>) {
{% for r in registrations %}
    let resource = sb.build_resource::<{{ r.struct_type }}>({{ r.struct_type }}_rtb);
    let evs = sb.register_types({{ namespace_literal }}, resource);
    sb.register_handler({{ r.handler_literal }}, {{ r.struct_type }}Handler { provider: Arc::clone(p) }, &evs[0]);
{% endfor %}
}
"#;

const AGGREGATE_TEMPLATE: &str = r#"
{% for line in doc_lines %}#[doc = {{ line }}]
{% endfor %}#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct {{ struct_type }} {
{% if identity_field %}
    #[serde(skip)]
    pub {{ identity_field }}: Option<String>,
{% endif %}
{% for f in fields %}
{% for line in f.doc_lines %}    #[doc = {{ line }}]
{% endfor %}    #[serde(rename = {{ f.attribute_literal }})]
    pub {{ f.field_name }}: {{ f.field_type }},
{% endfor %}
}
"#;

const RESOURCE_TEMPLATE: &str = r#"
/// Declares which `{{ struct_type }}` attributes the provider supplies and which force replacement.
pub fn {{ struct_type }}_rtb(rtb: &mut service::ResourceTypeBuilder) {
    rtb.provided_attributes(&[
{% for a in provided_attributes %}        {{ a }},
{% endfor %}    ]);
    rtb.immutable_attributes(&[
{% for a in immutable_attributes %}        {{ a }},
{% endfor %}    ]);
}

/// Bridges `{{ struct_type }}` to the provider resource it was generated from.
pub struct {{ struct_type }}Handler {
    provider: Arc<Provider>,
}

impl {{ struct_type }}Handler {
    /// Creates the resource and reads back its actual state.
    pub fn create(&self, desired: &{{ struct_type }}) -> Result<({{ struct_type }}, String), bridge::Error> {
        info!(desired = ?desired, "Create {{ struct_type }}");
        configure_provider(&self.provider);
        let rc = ResourceConfig::new(bridge::marshal(desired)?);
        let id = bridge::create(&self.provider, {{ native_literal }}, &rc)?;
        let actual = self.read(&id)?;
        Ok((actual, id))
    }

    /// Applies the desired state and returns the resulting state.
    pub fn update(&self, external_id: &str, desired: &{{ struct_type }}) -> Result<{{ struct_type }}, bridge::Error> {
        info!(desired = ?desired, "Update {{ struct_type }}");
        configure_provider(&self.provider);
        let rc = ResourceConfig::new(bridge::marshal(desired)?);
        let actual = bridge::update(&self.provider, {{ native_literal }}, external_id, &rc)?;
        let mut x = {{ struct_type }} { {{ identity_field }}: Some(external_id.to_string()), ..Default::default() };
        bridge::unmarshal(&actual, &mut x)?;
        info!(actual = ?x, "Update Actual State {{ struct_type }}");
        Ok(x)
    }

    /// Reads the current state of the resource identified by `external_id`.
    pub fn read(&self, external_id: &str) -> Result<{{ struct_type }}, bridge::Error> {
        info!(external_id, "Read {{ struct_type }}");
        configure_provider(&self.provider);
        let (id, actual) = bridge::read(&self.provider, {{ native_literal }}, external_id)?;
        let mut x = {{ struct_type }} { {{ identity_field }}: Some(id), ..Default::default() };
        bridge::unmarshal(&actual, &mut x)?;
        info!(actual = ?x, "Read Actual State {{ struct_type }}");
        Ok(x)
    }

    /// Releases the resource identified by `external_id`.
    pub fn delete(&self, external_id: &str) -> Result<(), bridge::Error> {
        info!(external_id, "Delete {{ struct_type }}");
        configure_provider(&self.provider);
        bridge::delete(&self.provider, {{ native_literal }}, external_id)
    }
}
"#;

/// The compiled template set for one generation run.
#[derive(Debug)]
pub(crate) struct Templates {
    tera: Tera,
}

impl Templates {
    /// Compile the built-in templates.
    pub(crate) fn new() -> Result<Self, GenerateError> {
        let mut tera = Tera::default();
        tera.autoescape_on(Vec::new());
        tera.add_raw_templates(vec![
            (PREFIX, PREFIX_TEMPLATE),
            (AGGREGATE, AGGREGATE_TEMPLATE),
            (RESOURCE, RESOURCE_TEMPLATE),
        ])?;
        Ok(Self { tera })
    }

    /// Render the template `name` with `data`.
    pub(crate) fn render(&self, name: &str, data: &impl Serialize) -> Result<String, GenerateError> {
        let context = Context::from_serialize(data)?;
        Ok(self.tera.render(name, &context)?)
    }
}
