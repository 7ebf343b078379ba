// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Variant catalog and the registry of named component instances.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, info};

use super::{
    annotations, axes,
    base::{Component, ListKind, Role, Variant},
    dashboards, links, panels, projects,
    projects::Project,
    rows, targets, templates
};
use crate::{error::Error, naming::ComponentType};

/// Table of the component variants known to a registry.
///
/// The built-in catalog covers every dashboard building block; additional
/// variants can be registered before the catalog is handed to
/// [`ComponentRegistry::with_catalog`].
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    variants: Vec<Variant>
}

impl Catalog {
    /// Catalog of every built-in variant.
    pub fn builtin() -> Self {
        let variants = [
            projects::variants(),
            dashboards::variants(),
            rows::variants(),
            panels::variants(),
            targets::variants(),
            templates::variants(),
            annotations::variants(),
            links::variants(),
            axes::variants()
        ]
        .into_iter()
        .flatten()
        .collect();
        Self {
            variants
        }
    }

    /// Adds a variant to the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateComponentType`] when another variant already
    /// derives the same type tag.
    pub fn register(&mut self, variant: Variant) -> Result<(), Error> {
        if let Some(existing) = self.get(variant.component_type().as_str()) {
            return Err(Error::DuplicateComponentType {
                component_type: variant.component_type().to_string(),
                first:          existing.name().to_owned(),
                second:         variant.name().to_owned()
            });
        }
        self.variants.push(variant);
        Ok(())
    }

    /// Variant registered under `component_type`.
    pub fn get(&self, component_type: &str) -> Option<&Variant> {
        self.variants
            .iter()
            .find(|variant| variant.component_type().as_str() == component_type)
    }

    /// Variants in registration order.
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }
}

/// Top-level YAML mapping decoded into its type tag, name and payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    component_type: String,
    name:           Option<String>,
    payload:        Value
}

impl Fragment {
    /// Decodes a raw fragment.
    ///
    /// The type tag is the first key other than `name`. Mappings without
    /// one decode to `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WrongComponentAttributeCount`] for mappings with more
    /// than two keys and [`Error::Validation`] for non-mapping fragments or
    /// names that are neither strings nor scalars.
    pub fn decode(value: Value) -> Result<Option<Self>, Error> {
        let mut entries = match value {
            Value::Object(entries) => entries,
            other => {
                return Err(Error::validation(format!(
                    "component definition must be a mapping, found {other}"
                )));
            }
        };
        if entries.len() > 2 {
            return Err(Error::WrongComponentAttributeCount {
                count: entries.len()
            });
        }
        let Some(component_type) = entries.keys().find(|key| key.as_str() != "name").cloned() else {
            return Ok(None);
        };
        let name = match entries.remove("name") {
            None | Some(Value::Null) => None,
            Some(Value::String(name)) => Some(name),
            Some(scalar @ (Value::Bool(_) | Value::Number(_))) => Some(scalar.to_string()),
            Some(other) => {
                return Err(Error::validation(format!(
                    "component name must be a string, found {other}"
                )));
            }
        };
        let payload = entries.remove(&component_type).unwrap_or(Value::Null);
        Ok(Some(Self {
            component_type,
            name,
            payload
        }))
    }

    /// Type tag of the fragment.
    pub fn component_type(&self) -> &str {
        &self.component_type
    }

    /// Instance name, when present.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Configuration payload stored under the type tag.
    pub fn payload(&self) -> &Value {
        &self.payload
    }
}

#[derive(Debug, Default)]
struct Instances {
    entries: Vec<Component>,
    by_name: HashMap<String, usize>
}

/// Registry of variants and of named component instances.
///
/// Instances are keyed by type tag and name and kept in load order.
#[derive(Debug)]
pub struct ComponentRegistry {
    catalog:    Catalog,
    item_types: HashMap<ListKind, Vec<ComponentType>>,
    components: HashMap<ComponentType, Instances>
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentRegistry {
    /// Registry over the built-in catalog.
    pub fn new() -> Self {
        Self::with_catalog(Catalog::builtin())
    }

    /// Registry over a custom catalog.
    pub fn with_catalog(catalog: Catalog) -> Self {
        let mut item_types: HashMap<ListKind, Vec<ComponentType>> = HashMap::new();
        let mut components = HashMap::new();
        for variant in catalog.variants() {
            info!("Loading component type {}", variant.name());
            if let Role::Item(kind) = variant.role() {
                item_types
                    .entry(kind)
                    .or_default()
                    .push(variant.component_type().clone());
            }
            components.insert(variant.component_type().clone(), Instances::default());
        }
        Self {
            catalog,
            item_types,
            components
        }
    }

    /// Registers one raw fragment.
    ///
    /// Fragments of unknown types and fragments without a name are logged
    /// and skipped.
    ///
    /// # Errors
    ///
    /// Returns the decoding errors of [`Fragment::decode`] and
    /// [`Error::DuplicateKey`] when the type already holds an instance of the
    /// same name.
    pub fn add(&mut self, fragment: Value) -> Result<(), Error> {
        let Some(fragment) = Fragment::decode(fragment)? else {
            info!("Skipping component without a component type");
            return Ok(());
        };
        let Some(variant) = self.catalog.get(fragment.component_type()) else {
            info!(
                "No variant registered for component type '{}', skipping",
                fragment.component_type()
            );
            return Ok(());
        };
        let component_type = variant.component_type().clone();
        let Fragment {
            name,
            payload,
            ..
        } = fragment;
        let Some(name) = name else {
            info!("Component '{}' does not have 'name' attribute, skipping", component_type);
            return Ok(());
        };
        debug!("Adding component '{}' with name '{}'", component_type, name);
        let instances = self.components.entry(component_type.clone()).or_default();
        if instances.by_name.contains_key(&name) {
            return Err(Error::DuplicateKey {
                component_type: component_type.to_string(),
                name
            });
        }
        instances.by_name.insert(name.clone(), instances.entries.len());
        instances
            .entries
            .push(Component::new(component_type, Some(name), payload));
        Ok(())
    }

    /// Builds an unregistered component of `component_type`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnregisteredComponent`] for unknown types.
    pub fn create_component(
        &self,
        component_type: &str,
        payload: Value,
        name: Option<String>
    ) -> Result<Component, Error> {
        let variant = self.variant(component_type)?;
        Ok(Component::new(variant.component_type().clone(), name, payload))
    }

    /// Named instance of `component_type`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnregisteredComponent`] when either the type or the
    /// name is unknown.
    pub fn get_component(&self, component_type: &str, name: &str) -> Result<&Component, Error> {
        let instances = self.instances(component_type)?;
        instances
            .by_name
            .get(name)
            .map(|&index| &instances.entries[index])
            .ok_or_else(|| {
                Error::unregistered(format!(
                    "No component '{component_type}' with name '{name}' found!"
                ))
            })
    }

    /// Every registered instance of `component_type`, in load order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnregisteredComponent`] for unknown types.
    pub fn components(&self, component_type: &str) -> Result<&[Component], Error> {
        self.instances(component_type)
            .map(|instances| instances.entries.as_slice())
    }

    /// Every registered project, in load order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidComponent`] for projects whose dashboard list
    /// is malformed.
    pub fn projects(&self) -> Result<Vec<Project<'_>>, Error> {
        self.components(projects::PROJECT)?
            .iter()
            .map(Project::new)
            .collect()
    }

    /// Variant registered under `component_type`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnregisteredComponent`] for unknown types.
    pub fn variant(&self, component_type: &str) -> Result<&Variant, Error> {
        self.catalog.get(component_type).ok_or_else(|| {
            Error::unregistered(format!("No component of type '{component_type}' found!"))
        })
    }

    /// Tags of the variants usable as items of `kind` lists.
    pub fn item_types(&self, kind: ListKind) -> &[ComponentType] {
        self.item_types
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether `component_type` is an item variant of `kind` lists.
    pub fn is_item_type(&self, kind: ListKind, component_type: &str) -> bool {
        self.item_types(kind)
            .iter()
            .any(|item_type| item_type.as_str() == component_type)
    }

    fn instances(&self, component_type: &str) -> Result<&Instances, Error> {
        self.components.get(component_type).ok_or_else(|| {
            Error::unregistered(format!("No component of type '{component_type}' found!"))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use serde_json::json;

    use super::{Catalog, ComponentRegistry, Fragment};
    use crate::{
        Error,
        components::base::{Role, Variant}
    };

    fn registry_with_test_base() -> ComponentRegistry {
        let mut catalog = Catalog::builtin();
        catalog
            .register(Variant::plain("TestBase", Role::Standalone))
            .expect("test-base is a fresh tag");
        ComponentRegistry::with_catalog(catalog)
    }

    #[test]
    fn builtin_tags_are_distinct() {
        let catalog = Catalog::builtin();
        let tags: HashSet<_> = catalog
            .variants()
            .iter()
            .map(|variant| variant.component_type().clone())
            .collect();
        assert_eq!(tags.len(), catalog.variants().len());
    }

    #[test]
    fn builtin_catalog_knows_core_variants() {
        let catalog = Catalog::builtin();
        for tag in [
            "project",
            "dashboard",
            "rows",
            "row",
            "panels",
            "graph",
            "single-stat",
            "text",
            "targets",
            "graphite-target",
            "templates",
            "query",
            "yaxes",
            "yaxis"
        ] {
            assert!(catalog.get(tag).is_some(), "missing variant {tag}");
        }
    }

    #[test]
    fn register_rejects_colliding_tags() {
        let mut catalog = Catalog::builtin();
        let error = catalog
            .register(Variant::plain("Graph", Role::Standalone))
            .unwrap_err();
        match error {
            Error::DuplicateComponentType {
                ref component_type, ..
            } => assert_eq!(component_type, "graph"),
            other => panic!("expected duplicate component type, got {other:?}")
        }
    }

    #[test]
    fn add_then_get_component() {
        let mut registry = registry_with_test_base();
        registry
            .add(json!({"name": "x", "test-base": {}}))
            .expect("first add succeeds");
        let component = registry
            .get_component("test-base", "x")
            .expect("component is stored");
        assert_eq!(component.name(), Some("x"));
        assert_eq!(component.data(), &json!({}));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = registry_with_test_base();
        registry
            .add(json!({"name": "x", "test-base": {}}))
            .expect("first add succeeds");
        let error = registry
            .add(json!({"name": "x", "test-base": {}}))
            .unwrap_err();
        assert!(matches!(error, Error::DuplicateKey { .. }));
    }

    #[test]
    fn three_keys_are_rejected() {
        let mut registry = registry_with_test_base();
        let error = registry
            .add(json!({"name": "x", "test-base": {}, "extra": 1}))
            .unwrap_err();
        match error {
            Error::WrongComponentAttributeCount {
                count
            } => assert_eq!(count, 3),
            other => panic!("expected attribute count error, got {other:?}")
        }
    }

    #[test]
    fn unknown_types_and_nameless_fragments_are_skipped() {
        let mut registry = registry_with_test_base();
        registry
            .add(json!({"name": "x", "unknown-type": {}}))
            .expect("unknown types are skipped");
        registry
            .add(json!({"test-base": {}}))
            .expect("nameless fragments are skipped");
        assert!(
            registry
                .components("test-base")
                .expect("type is known")
                .is_empty()
        );
    }

    #[test]
    fn lookups_of_unknown_names_fail() {
        let registry = registry_with_test_base();
        let error = registry.get_component("test-base", "missing").unwrap_err();
        assert_eq!(error.to_string(), "No component 'test-base' with name 'missing' found!");
        assert!(registry.get_component("nope", "missing").is_err());
    }

    #[test]
    fn fragment_decoding_stringifies_scalar_names() {
        let fragment = Fragment::decode(json!({"name": 42, "text": null}))
            .expect("fragment decodes")
            .expect("fragment has a type");
        assert_eq!(fragment.name(), Some("42"));
        assert_eq!(fragment.component_type(), "text");
        assert!(fragment.payload().is_null());
    }

    #[test]
    fn fragment_decoding_uses_first_non_name_key() {
        let fragment = Fragment::decode(json!({"graph": {"title": "t"}, "name": "g"}))
            .expect("fragment decodes")
            .expect("fragment has a type");
        assert_eq!(fragment.component_type(), "graph");
        assert_eq!(fragment.name(), Some("g"));
    }

    #[test]
    fn fragment_without_type_decodes_to_none() {
        assert!(
            Fragment::decode(json!({"name": "lonely"}))
                .expect("fragment decodes")
                .is_none()
        );
    }

    #[test]
    fn non_mapping_fragments_are_invalid() {
        let error = Fragment::decode(json!(["a"])).unwrap_err();
        assert!(matches!(error, Error::Validation { .. }));
    }

    #[test]
    fn instances_keep_load_order() {
        let mut registry = ComponentRegistry::new();
        for name in ["b", "a", "c"] {
            registry
                .add(json!({"name": name, "text": {}}))
                .expect("text registers");
        }
        let names: Vec<_> = registry
            .components("text")
            .expect("text is known")
            .iter()
            .filter_map(|component| component.name())
            .collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }
}
