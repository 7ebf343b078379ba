// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Link list and drilldown link variants.

use serde_json::{Value, json};

use super::{
    base::{JsonGenerator, ListKind, Role, Scope, Variant, text_of},
    list::ListOf
};
use crate::error::Error;

const LINK_NAME: &str = "Drilldown dashboard";

pub(crate) fn variants() -> Vec<Variant> {
    vec![
        Variant::new("Links", Role::Standalone, ListOf(ListKind::Links)),
        Variant::new("DashboardLink", Role::Item(ListKind::Links), DashboardLink),
        Variant::new("AbsoluteLink", Role::Item(ListKind::Links), AbsoluteLink)
    ]
}

#[derive(Debug)]
struct DashboardLink;

impl JsonGenerator for DashboardLink {
    fn gen_json_from_data(&self, scope: &Scope<'_>) -> Result<Value, Error> {
        let mut json = json!({
            "type": "dashboard",
            "name": LINK_NAME,
            "title": scope.value_or("title", Value::Null),
            "dashboard": scope.value_or("dashboard", Value::Null)
        });
        if let Some(params) = scope.get("params") {
            json["params"] = Value::from(query_params(scope.component_type(), params)?);
        }
        Ok(json)
    }
}

/// Joins `params` into `var-name=value` pairs.
///
/// A bare name forwards the variable of the same name.
fn query_params(component_type: &str, params: &Value) -> Result<String, Error> {
    let Value::Array(params) = params else {
        return Err(Error::invalid_component(component_type, "params must be a list"));
    };
    let mut pairs = Vec::new();
    for param in params {
        match param {
            Value::String(name) => pairs.push(format!("var-{name}=${name}")),
            Value::Object(entries) => pairs.extend(
                entries
                    .iter()
                    .map(|(name, value)| format!("var-{name}={}", text_of(value)))
            ),
            other => {
                return Err(Error::invalid_component(
                    component_type,
                    format!("unsupported link parameter {other}")
                ));
            }
        }
    }
    Ok(pairs.join("&"))
}

#[derive(Debug)]
struct AbsoluteLink;

impl JsonGenerator for AbsoluteLink {
    fn gen_json_from_data(&self, scope: &Scope<'_>) -> Result<Value, Error> {
        Ok(json!({
            "type": "absolute",
            "name": LINK_NAME,
            "title": scope.value_or("title", Value::Null),
            "url": scope.value_or("url", Value::Null)
        }))
    }
}
