// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Template variable list and template variants.
//!
//! `query` templates either describe one named query variable or split a
//! graphite path such as `servers.$dc.$host.cpu` into one variable per
//! `$segment`, each querying the path up to that segment. Custom and
//! interval templates enumerate their options.

use serde_json::{Map, Value, json};

use super::{
    base::{CopyField, JsonGenerator, ListKind, Role, Scope, Variant, copy_fields, text_of},
    list::ListOf
};
use crate::error::Error;

const SHARED_FIELDS: &[CopyField] = &[
    CopyField::new("regex"),
    CopyField::new("multi"),
    CopyField::new("includeAll"),
    CopyField::new("hide"),
    CopyField::new("allFormat"),
    CopyField::new("allValue")
];

const ALL_VALUE: &str = "$__all";
const AUTO_VALUE: &str = "$__auto_interval";

pub(crate) fn variants() -> Vec<Variant> {
    vec![
        Variant::new("Templates", Role::Standalone, ListOf(ListKind::Templates)),
        Variant::new("Query", Role::Item(ListKind::Templates), Query),
        Variant::new(
            "CustomTemplate",
            Role::Item(ListKind::Templates),
            Enumerated {
                template_type: "custom",
                refresh:       0
            }
        ),
        Variant::new(
            "IntervalTemplate",
            Role::Item(ListKind::Templates),
            Enumerated {
                template_type: "interval",
                refresh:       2
            }
        ),
        Variant::new("DatasourceTemplate", Role::Item(ListKind::Templates), DatasourceTemplate)
    ]
}

#[derive(Debug)]
struct Query;

impl JsonGenerator for Query {
    fn gen_json_from_data(&self, scope: &Scope<'_>) -> Result<Value, Error> {
        let Some(query) = scope.get("query").filter(|query| !is_blank(query)) else {
            return Ok(json!([]));
        };

        if let Some(name) = scope.get("name") {
            let mut json = Map::new();
            json.insert("type".to_owned(), Value::from("query"));
            json.insert("name".to_owned(), name.clone());
            json.insert("query".to_owned(), query.clone());
            let refresh = match scope.get("refresh") {
                Some(refresh) => refresh.clone(),
                None if scope.contains("options") => Value::from(0),
                None => Value::from(1)
            };
            json.insert("refresh".to_owned(), refresh);
            for key in ["datasource", "sort"] {
                if let Some(value) = scope.get(key) {
                    json.insert(key.to_owned(), value.clone());
                }
            }
            copy_selection(&mut json, scope.data());
            return Ok(json!([json]));
        }

        let Value::String(path) = query else {
            return Err(Error::invalid_component(
                scope.component_type(),
                format!("graphite path query must be a string, found {query}")
            ));
        };
        let refresh_only_first = scope
            .get("refresh-only-first")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let mut variables = Vec::new();
        let mut processed: Vec<&str> = Vec::new();
        for segment in path.split('.') {
            if let Some(variable) = segment.strip_prefix('$') {
                let refresh = !refresh_only_first || variables.is_empty();
                let mut json = Map::new();
                json.insert("type".to_owned(), Value::from("query"));
                json.insert("refresh_on_load".to_owned(), Value::Bool(refresh));
                json.insert("name".to_owned(), Value::from(variable));
                json.insert("refresh".to_owned(), Value::from(u8::from(refresh)));
                if let Some(datasource) = scope.get("datasource") {
                    json.insert("datasource".to_owned(), datasource.clone());
                }
                let mut metric = String::from("*");
                if let Some(config) = scope.get(variable) {
                    if let Some(configured) = config.get("metric") {
                        metric = text_of(configured);
                    }
                    copy_selection(&mut json, config);
                }
                let mut parts = processed.clone();
                parts.push(&metric);
                json.insert("query".to_owned(), Value::from(parts.join(".")));
                variables.push(Value::Object(json));
            }
            processed.push(segment);
        }
        Ok(Value::Array(variables))
    }
}

/// Whether a query value selects nothing: null, false, zero or empty.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(entries) => entries.is_empty()
    }
}

/// Copies `current`, `options` and the selection flags of `source`.
fn copy_selection(json: &mut Map<String, Value>, source: &Value) {
    if let Some(current) = source.get("current") {
        json.insert("current".to_owned(), json!({"text": current, "value": current}));
    }
    if let Some(options) = source.get("options") {
        json.insert("options".to_owned(), Value::Array(options_of(options)));
    }
    json.extend(copy_fields(source, SHARED_FIELDS));
}

fn options_of(options: &Value) -> Vec<Value> {
    match options {
        Value::Array(options) => options
            .iter()
            .map(|option| json!({"text": option, "value": option}))
            .collect(),
        option => vec![json!({"text": option, "value": option})]
    }
}

/// Template enumerating its options (`custom` and `interval`).
#[derive(Debug)]
struct Enumerated {
    template_type: &'static str,
    refresh:       u8
}

impl JsonGenerator for Enumerated {
    fn gen_json_from_data(&self, scope: &Scope<'_>) -> Result<Value, Error> {
        let name = scope.require("name")?;
        let options = match scope.require("options")? {
            Value::Array(options) => options.as_slice(),
            other => {
                return Err(Error::invalid_component(
                    scope.component_type(),
                    format!("options must be a list, found {other}")
                ));
            }
        };

        let mut json = scope.object(SHARED_FIELDS);
        json.insert("type".to_owned(), Value::from(self.template_type));
        json.insert("refresh_on_load".to_owned(), Value::Bool(false));
        json.insert("datasource".to_owned(), Value::Null);
        json.insert("name".to_owned(), name.clone());
        let query: Vec<String> = options.iter().map(text_of).collect();
        json.insert("query".to_owned(), Value::from(query.join(",")));
        json.insert("refresh".to_owned(), Value::from(self.refresh));

        if let Some(current) = scope.get("current") {
            let value = if current.as_str() == Some("All") { Value::from(ALL_VALUE) } else { current.clone() };
            json.insert("current".to_owned(), json!({"text": current, "value": value}));
        }

        let mut rendered: Vec<Value> = options
            .iter()
            .map(|option| json!({"text": option, "value": option}))
            .collect();
        if scope.get("includeAll").and_then(Value::as_bool) == Some(true) {
            rendered.insert(0, json!({"selected": true, "text": "All", "value": ALL_VALUE}));
        }

        if self.template_type == "interval"
            && let Some(auto) = scope.get("auto")
        {
            let count = auto.get("count").cloned().unwrap_or_else(|| Value::from(30));
            let min = auto.get("min").cloned().unwrap_or_else(|| Value::from("10s"));
            json.insert("auto".to_owned(), Value::Bool(true));
            json.insert("auto_count".to_owned(), count);
            json.insert("auto_min".to_owned(), min);
            let auto_option = json!({"text": "auto", "value": AUTO_VALUE});
            rendered.push(auto_option.clone());
            if scope.get("current").and_then(Value::as_str) == Some("auto") {
                json.insert("current".to_owned(), auto_option);
            }
        }

        json.insert("options".to_owned(), Value::Array(rendered));
        Ok(Value::Object(json))
    }
}

#[derive(Debug)]
struct DatasourceTemplate;

impl JsonGenerator for DatasourceTemplate {
    fn gen_json_from_data(&self, scope: &Scope<'_>) -> Result<Value, Error> {
        let mut json = Map::new();
        json.insert("type".to_owned(), Value::from("datasource"));
        json.insert("name".to_owned(), scope.value_or("name", Value::from("datasource")));
        json.insert("query".to_owned(), scope.require("query")?.clone());
        if let Some(current) = scope.get("current") {
            json.insert("current".to_owned(), json!({"text": current, "value": current}));
        }
        if let Some(regex) = scope.get("regex") {
            json.insert("regex".to_owned(), regex.clone());
        }
        Ok(Value::Object(json))
    }
}
