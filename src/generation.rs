//! Per-run generation state.
//!
//! A [`Generation`] owns everything one run mutates: the name-minting
//! counter, the ordered list of emitted source fragments, and the top-level
//! aggregates destined for the package prefix. Runs never share state, so
//! independent generations may proceed concurrently.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::error::GenerateError;
use crate::naming::{handler_name, is_reserved_type_name, nested_name, top_level_name};
use crate::schema::Provider;
use crate::templates::Templates;
use crate::types::{AggregateType, ResourceBinding};

/// Package name declared by the emitted file.
pub const PACKAGE: &str = "generated";

/// Default path of the crate providing the bridge runtime.
pub const DEFAULT_BRIDGE_CRATE: &str = "hemmer_bridge";

/// State of a single generation run.
#[derive(Debug)]
pub struct Generation {
    pub(crate) namespace: String,
    pub(crate) bridge_crate: String,
    salt: u64,
    pub(crate) fragments: Vec<String>,
    pub(crate) struct_types: Vec<String>,
    reserved: HashSet<String>,
    pub(crate) aggregates: Vec<AggregateType>,
    pub(crate) bindings: Vec<ResourceBinding>,
    pub(crate) templates: Templates,
}

impl Generation {
    /// Start a run for `namespace`, importing the bridge runtime from
    /// [`DEFAULT_BRIDGE_CRATE`].
    pub fn new(namespace: impl Into<String>) -> Result<Self, GenerateError> {
        Self::with_bridge_crate(namespace, DEFAULT_BRIDGE_CRATE)
    }

    /// Start a run for `namespace`, importing the bridge runtime from
    /// `bridge_crate`.
    pub fn with_bridge_crate(
        namespace: impl Into<String>,
        bridge_crate: impl Into<String>,
    ) -> Result<Self, GenerateError> {
        Ok(Self {
            namespace: namespace.into(),
            bridge_crate: bridge_crate.into(),
            salt: 0,
            fragments: Vec::new(),
            struct_types: Vec::new(),
            reserved: HashSet::new(),
            aggregates: Vec::new(),
            bindings: Vec::new(),
            templates: Templates::new()?,
        })
    }

    /// Emit every resource of `provider` in lexicographic order, then the
    /// package prefix.
    pub fn emit_provider(&mut self, provider: &Provider) -> Result<(), GenerateError> {
        let native_types = provider.sorted_names();
        info!(
            namespace = %self.namespace,
            resources = native_types.len(),
            "Generating bridge package"
        );

        for native_type in &native_types {
            let name = top_level_name(native_type);
            let handler = handler_name(&name);
            if is_reserved_type_name(&name) || !self.reserved.insert(name.clone()) {
                return Err(GenerateError::DuplicateAggregate(name));
            }
            if !self.reserved.insert(handler.clone()) {
                return Err(GenerateError::DuplicateAggregate(handler));
            }
        }

        for native_type in native_types {
            self.emit_resource(native_type, &provider.resources[native_type])?;
        }
        self.emit_prefix()
    }

    /// Mint a fresh name for an anonymous nested aggregate.
    ///
    /// Candidates that equal a top-level aggregate name are skipped, so the
    /// counter may advance more than once per call.
    pub(crate) fn mint(&mut self, parent: &str, attribute: &str) -> String {
        loop {
            self.salt += 1;
            let name = nested_name(parent, attribute, self.salt);
            if !self.reserved.contains(&name) {
                debug!(aggregate = %name, "Minted nested aggregate name");
                return name;
            }
        }
    }

    /// The namespace aggregates are registered under.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Emitted source fragments, in output order.
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Consume the run, returning its fragments.
    pub fn into_fragments(self) -> Vec<String> {
        self.fragments
    }

    /// Top-level aggregate names, in registration order.
    pub fn struct_types(&self) -> &[String] {
        &self.struct_types
    }

    /// Every emitted aggregate, in output order.
    pub fn aggregates(&self) -> &[AggregateType] {
        &self.aggregates
    }

    /// Look up an emitted aggregate by name.
    pub fn aggregate(&self, name: &str) -> Option<&AggregateType> {
        self.aggregates.iter().find(|a| a.name == name)
    }

    /// Registration data of every top-level resource, in output order.
    pub fn bindings(&self) -> &[ResourceBinding] {
        &self.bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Attribute, Resource};

    #[test]
    fn test_new_generation_is_empty() {
        let generation = Generation::new("Example").unwrap();
        assert_eq!(generation.namespace(), "Example");
        assert!(generation.fragments().is_empty());
        assert!(generation.struct_types().is_empty());
        assert!(generation.aggregates().is_empty());
    }

    #[test]
    fn test_mint_is_monotonic() {
        let mut generation = Generation::new("Example").unwrap();
        assert_eq!(generation.mint("Thing", "items"), "Thing_items_1");
        assert_eq!(generation.mint("Thing", "tags"), "Thing_tags_2");
        assert_eq!(generation.mint("Other", "items"), "Other_items_3");
    }

    #[test]
    fn test_mint_skips_reserved_names() {
        let mut generation = Generation::new("Example").unwrap();
        generation.reserved.insert("Thing_items_1".to_string());
        assert_eq!(generation.mint("Thing", "items"), "Thing_items_2");
    }

    #[test]
    fn test_duplicate_top_level_names() {
        let provider = Provider::new()
            .with_resource("Widget", Resource::new())
            .with_resource("widget", Resource::new());

        let mut generation = Generation::new("Example").unwrap();
        let err = generation.emit_provider(&provider).unwrap_err();
        assert!(matches!(err, GenerateError::DuplicateAggregate(name) if name == "Widget"));
    }

    #[test]
    fn test_reserved_type_names_are_rejected() {
        let provider = Provider::new().with_resource("provider", Resource::new());
        let mut generation = Generation::new("Example").unwrap();
        let err = generation.emit_provider(&provider).unwrap_err();
        assert!(matches!(err, GenerateError::DuplicateAggregate(name) if name == "Provider"));
    }

    #[test]
    fn test_aggregate_shadowing_handler() {
        let provider = Provider::new()
            .with_resource("widget", Resource::new())
            .with_resource("widgetHandler", Resource::new());

        let mut generation = Generation::new("Example").unwrap();
        let err = generation.emit_provider(&provider).unwrap_err();
        assert!(matches!(err, GenerateError::DuplicateAggregate(name) if name == "WidgetHandler"));
    }

    #[test]
    fn test_nested_name_never_shadows_resource() {
        let nested = Resource::new().with_attribute("id", Attribute::required_string());
        let provider = Provider::new()
            .with_resource(
                "thing",
                Resource::new().with_attribute("items", Attribute::list_of_resource(nested)),
            )
            .with_resource("thing_items_1", Resource::new());

        let mut generation = Generation::new("Example").unwrap();
        generation.emit_provider(&provider).unwrap();

        let names: Vec<&str> = generation
            .aggregates()
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["Thing", "Thing_items_2", "Thing_items_1"]);
    }
}
