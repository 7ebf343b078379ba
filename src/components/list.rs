// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Rendering of component lists mixing references, inline definitions and
//! templated invocations.
//!
//! Every list item takes one of three forms:
//!
//! * a bare string naming a registered component;
//! * a mapping keyed by an item tag of the list, an inline anonymous
//!   component rendered on the spot;
//! * a mapping keyed by any other string, a templated invocation of the
//!   named component once per context derived from the mapping value.
//!
//! Item order is preserved. Results that are themselves lists are spliced
//! into the output, any other result is appended as one element.

use serde_json::Value;
use tracing::debug;

use super::{
    base::{Component, JsonGenerator, ListKind, Scope},
    registry::ComponentRegistry
};
use crate::{
    context::{Context, placeholders},
    error::Error
};

/// Generic list variant (`rows`, `panels`, `annotations`, ...).
#[derive(Debug, Clone, Copy)]
pub struct ListOf(pub ListKind);

impl JsonGenerator for ListOf {
    fn gen_json_from_data(&self, scope: &Scope<'_>) -> Result<Value, Error> {
        let list = ListGenerator::new(scope, self.0);
        let items = list.items(scope.data())?;
        list.gen_items(items).map(Value::Array)
    }
}

/// Resolves the items of one list component.
#[derive(Debug, Clone, Copy)]
pub struct ListGenerator<'a> {
    registry:  &'a ComponentRegistry,
    list_type: &'a str,
    kind:      ListKind
}

impl<'a> ListGenerator<'a> {
    /// Creates a generator for the list component rendered in `scope`.
    pub fn new(scope: &Scope<'a>, kind: ListKind) -> Self {
        Self {
            registry: scope.registry(),
            list_type: scope.component_type(),
            kind
        }
    }

    /// Items of the expanded list data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidComponent`] when the data is not a list.
    pub fn items<'d>(&self, data: &'d Value) -> Result<&'d [Value], Error> {
        match data {
            Value::Array(items) => Ok(items),
            Value::Object(entries) if entries.is_empty() => Ok(&[]),
            other => Err(Error::invalid_component(
                self.list_type,
                format!("expected a list of items, found {other}")
            ))
        }
    }

    /// Renders every item in order into one flat list.
    ///
    /// # Errors
    ///
    /// Propagates lookup and rendering failures of the items.
    pub fn gen_items(&self, items: &[Value]) -> Result<Vec<Value>, Error> {
        let mut rendered = Vec::with_capacity(items.len());
        for item in items {
            self.gen_item(item, &mut rendered)?;
        }
        Ok(rendered)
    }

    /// Renders one item, appending its output to `out`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnregisteredComponent`] for references that resolve
    /// to nothing and [`Error::InvalidComponent`] for scalar items other
    /// than strings.
    pub fn gen_item(&self, item: &Value, out: &mut Vec<Value>) -> Result<(), Error> {
        match item {
            Value::String(name) => {
                let component = self.lookup(name)?;
                append(out, component.gen_json(&Context::default(), self.registry)?);
            }
            Value::Object(entries) => {
                for (key, data) in entries {
                    if self.is_item_type(key) {
                        let inline = self.registry.create_component(key, data.clone(), None)?;
                        append(out, inline.gen_json(&Context::default(), self.registry)?);
                        continue;
                    }
                    let component = self.lookup(key)?;
                    let mut keys = placeholders(key);
                    keys.push(key.clone());
                    for context in Context::create_context(data, &keys) {
                        debug!(
                            "Rendering '{}' of {} with context {:?}",
                            key,
                            self.list_type,
                            context.bindings()
                        );
                        append(out, component.gen_json(&context, self.registry)?);
                    }
                }
            }
            other => {
                return Err(Error::invalid_component(
                    self.list_type,
                    format!("unsupported list item {other}")
                ));
            }
        }
        Ok(())
    }

    /// Whether `item` would render without a lookup failure.
    pub fn resolves(&self, item: &Value) -> bool {
        match item {
            Value::String(name) => self.lookup(name).is_ok(),
            Value::Object(entries) => entries
                .keys()
                .all(|key| self.is_item_type(key) || self.lookup(key).is_ok()),
            _ => false
        }
    }

    fn is_item_type(&self, component_type: &str) -> bool {
        self.registry.is_item_type(self.kind, component_type)
    }

    fn lookup(&self, name: &str) -> Result<&'a Component, Error> {
        if let Ok(component) = self.registry.get_component(self.list_type, name) {
            return Ok(component);
        }
        self.registry
            .item_types(self.kind)
            .iter()
            .find_map(|component_type| self.registry.get_component(component_type.as_str(), name).ok())
            .ok_or_else(|| {
                Error::unregistered(format!(
                    "No component '{}' with name '{name}' found!",
                    self.list_type
                ))
            })
    }
}

fn append(out: &mut Vec<Value>, rendered: Value) {
    match rendered {
        Value::Array(items) => out.extend(items),
        other => out.push(other)
    }
}
