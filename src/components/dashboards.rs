// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Dashboard variant.

use serde_json::{Map, Value, json};

use super::base::{CopyField, JsonGenerator, Role, Scope, Variant};
use crate::error::Error;

/// Type tag of dashboard fragments.
pub(crate) const DASHBOARD: &str = "dashboard";

const COPY_FIELDS: &[CopyField] = &[
    CopyField::new("sharedCrosshair"),
    CopyField::new("graphTooltip"),
    CopyField::new("editable"),
    CopyField::new("hideControls"),
    CopyField::new("timezone"),
    CopyField::new("style"),
    CopyField::new("uid"),
    CopyField::new("description")
];

pub(crate) fn variants() -> Vec<Variant> {
    vec![Variant::new("Dashboard", Role::Standalone, Dashboard)]
}

#[derive(Debug)]
struct Dashboard;

impl JsonGenerator for Dashboard {
    fn gen_json_from_data(&self, scope: &Scope<'_>) -> Result<Value, Error> {
        let mut json = scope.object(COPY_FIELDS);

        let title = match scope.get("title") {
            Some(title) => title.clone(),
            None => scope.name().map_or(Value::Null, Value::String)
        };
        json.insert("title".to_owned(), title);

        let mut nav = Map::new();
        nav.insert("type".to_owned(), Value::from("timepicker"));
        for key in ["time_options", "refresh_intervals"] {
            if let Some(value) = scope.get(key) {
                nav.insert(key.to_owned(), value.clone());
            }
        }
        json.insert("nav".to_owned(), json!([nav]));

        if let Some(time) = scope.get("time") {
            let bound = |key: &str| {
                time.get(key)
                    .cloned()
                    .ok_or_else(|| Error::missing_field(DASHBOARD, &format!("time.{key}")))
            };
            json.insert("time".to_owned(), json!({"from": bound("from")?, "to": bound("to")?}));
        }
        for key in ["tags", "refresh"] {
            if let Some(value) = scope.get(key) {
                json.insert(key.to_owned(), value.clone());
            }
        }

        if let Some(annotations) = scope.child_json("annotations")? {
            json.insert("annotations".to_owned(), json!({"list": annotations}));
        }
        if let Some(rows) = scope.child_json("rows")? {
            json.insert("rows".to_owned(), rows);
        }
        if let Some(templates) = scope.child_json("templates")? {
            json.insert("templating".to_owned(), json!({"list": templates, "enable": true}));
        }
        if let Some(links) = scope.child_json("links")? {
            json.insert("links".to_owned(), links);
        }
        Ok(Value::Object(json))
    }
}
