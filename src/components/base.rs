// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Component instances and the JSON generator contract.
//!
//! A [`Component`] is the typed, named payload of one fragment. Rendering
//! expands the payload against a [`Context`] and hands the result to the
//! [`JsonGenerator`] registered for the component's type, wrapped in a
//! [`Scope`] that gives access to helper lookups and to the registry for
//! child components.

use std::{fmt, sync::Arc};

use serde_json::{Map, Value};

use super::registry::ComponentRegistry;
use crate::{context::Context, error::Error, naming::ComponentType};

/// Lists a variant can appear in as an inline or named item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    /// Items of `annotations`.
    Annotations,
    /// Items of `links`.
    Links,
    /// Items of `panels`.
    Panels,
    /// Items of `rows`.
    Rows,
    /// Items of `targets`.
    Targets,
    /// Items of `templates`.
    Templates,
    /// Items of `yaxes`.
    Yaxes
}

/// Position of a variant in the component model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Top-level or container variant.
    Standalone,
    /// Variant usable as an item of the given list.
    Item(ListKind)
}

/// Variant-specific rendering of expanded component data.
pub trait JsonGenerator: fmt::Debug + Send + Sync {
    /// Renders the already expanded data available through `scope`.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when required fields are missing or child
    /// components cannot be resolved.
    fn gen_json_from_data(&self, scope: &Scope<'_>) -> Result<Value, Error>;
}

/// Catalog entry describing one component variant.
#[derive(Debug, Clone)]
pub struct Variant {
    name:           String,
    component_type: ComponentType,
    role:           Role,
    generator:      Option<Arc<dyn JsonGenerator>>
}

impl Variant {
    /// Describes a JSON generating variant.
    ///
    /// The type tag is derived from `name`.
    pub fn new<N, G>(name: N, role: Role, generator: G) -> Self
    where
        N: Into<String>,
        G: JsonGenerator + 'static
    {
        let name = name.into();
        Self {
            component_type: ComponentType::from_variant_name(&name),
            name,
            role,
            generator: Some(Arc::new(generator))
        }
    }

    /// Describes a variant that only carries data, such as projects.
    pub fn plain<N>(name: N, role: Role) -> Self
    where
        N: Into<String>
    {
        let name = name.into();
        Self {
            component_type: ComponentType::from_variant_name(&name),
            name,
            role,
            generator: None
        }
    }

    /// Camel-case name the tag was derived from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tag selecting the variant in fragments.
    pub fn component_type(&self) -> &ComponentType {
        &self.component_type
    }

    /// Position of the variant in the component model.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Generator rendering the variant, if it renders JSON at all.
    pub fn json_generator(&self) -> Option<&dyn JsonGenerator> {
        self.generator.as_deref()
    }
}

/// One component built from a fragment or an inline definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    component_type: ComponentType,
    name:           Option<String>,
    data:           Value
}

impl Component {
    pub(crate) fn new(component_type: ComponentType, name: Option<String>, data: Value) -> Self {
        let data = if data.is_null() { Value::Object(Map::new()) } else { data };
        Self {
            component_type,
            name,
            data
        }
    }

    /// Name of the component; inline components are anonymous.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Type tag of the component.
    pub fn component_type(&self) -> &ComponentType {
        &self.component_type
    }

    /// Raw, unexpanded configuration.
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Renders the component for `context`.
    ///
    /// The configuration is placeholder-expanded first; the variant then
    /// renders the expanded data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidComponent`] for variants that do not render
    /// JSON and propagates every generator failure.
    pub fn gen_json(&self, context: &Context, registry: &ComponentRegistry) -> Result<Value, Error> {
        let variant = registry.variant(self.component_type.as_str())?;
        let generator = variant.json_generator().ok_or_else(|| {
            Error::invalid_component(self.component_type.as_str(), "component does not render JSON")
        })?;
        let data = context.expand_placeholders(&self.data);
        generator.gen_json_from_data(&Scope {
            component: self,
            data: &data,
            context,
            registry
        })
    }
}

/// Literal default of a copied field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
    /// JSON `null`.
    Null,
    /// JSON boolean.
    Bool(bool),
    /// JSON integer.
    Int(i64),
    /// JSON string.
    Str(&'static str)
}

impl Literal {
    fn to_value(self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(flag) => Value::Bool(flag),
            Self::Int(number) => Value::from(number),
            Self::Str(text) => Value::from(text)
        }
    }
}

/// Field copied verbatim from component data into the rendered object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CopyField {
    key:     &'static str,
    default: Option<Literal>
}

impl CopyField {
    /// Copies `key` when present.
    pub const fn new(key: &'static str) -> Self {
        Self {
            key,
            default: None
        }
    }

    /// Copies `key`, emitting `default` when it is absent.
    pub const fn with_default(key: &'static str, default: Literal) -> Self {
        Self {
            key,
            default: Some(default)
        }
    }
}

/// Copies the whitelisted `fields` of `data` into a fresh JSON object.
pub fn copy_fields(data: &Value, fields: &[CopyField]) -> Map<String, Value> {
    let mut json = Map::new();
    for field in fields {
        match data.get(field.key) {
            Some(value) => {
                json.insert(field.key.to_owned(), value.clone());
            }
            None => {
                if let Some(default) = field.default {
                    json.insert(field.key.to_owned(), default.to_value());
                }
            }
        }
    }
    json
}

/// Rendering state handed to a [`JsonGenerator`].
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    component: &'a Component,
    data:      &'a Value,
    context:   &'a Context,
    registry:  &'a ComponentRegistry
}

impl<'a> Scope<'a> {
    /// Component being rendered.
    pub fn component(&self) -> &'a Component {
        self.component
    }

    /// Type tag of the component being rendered.
    pub fn component_type(&self) -> &'a str {
        self.component.component_type.as_str()
    }

    /// Expanded component data.
    pub fn data(&self) -> &'a Value {
        self.data
    }

    /// Context the data was expanded with.
    pub fn context(&self) -> &'a Context {
        self.context
    }

    /// Registry resolving child components.
    pub fn registry(&self) -> &'a ComponentRegistry {
        self.registry
    }

    /// Field of the expanded data; `None` when absent or when the data is
    /// not a mapping.
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.data.get(key)
    }

    /// Whether the expanded data carries `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Field of the expanded data, or `default` when absent.
    pub fn value_or(&self, key: &str, default: Value) -> Value {
        self.get(key).cloned().unwrap_or(default)
    }

    /// Field of the expanded data the variant cannot render without.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] when the field is absent.
    pub fn require(&self, key: &str) -> Result<&'a Value, Error> {
        self.get(key).ok_or_else(|| Error::missing_field(self.component_type(), key))
    }

    /// Starts the rendered object from the whitelisted `fields`.
    pub fn object(&self, fields: &[CopyField]) -> Map<String, Value> {
        copy_fields(self.data, fields)
    }

    /// Component name expanded against the rendering context.
    pub fn name(&self) -> Option<String> {
        self.component.name().map(|name| self.context.expand_to_string(name))
    }

    /// Renders the child component stored under the `component_type` key of
    /// the expanded data, if present.
    ///
    /// # Errors
    ///
    /// Propagates registry and generator failures of the child.
    pub fn child_json(&self, component_type: &str) -> Result<Option<Value>, Error> {
        match self.get(component_type) {
            Some(payload) => self.render(component_type, payload.clone()).map(Some),
            None => Ok(None)
        }
    }

    /// Builds an anonymous component of `component_type` from `payload` and
    /// renders it.
    ///
    /// The payload has already been expanded as part of this component, so
    /// the child renders with an empty context.
    ///
    /// # Errors
    ///
    /// Propagates registry and generator failures of the child.
    pub fn render(&self, component_type: &str, payload: Value) -> Result<Value, Error> {
        self.registry
            .create_component(component_type, payload, None)?
            .gen_json(&Context::default(), self.registry)
    }
}

/// Renders a value as text the way generators join it into strings.
pub(crate) fn text_of(value: &Value) -> String {
    crate::context::render_text(value).into_owned()
}
