// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Target list and datasource query variants.

use serde_json::Value;
use tracing::debug;

use super::{
    base::{CopyField, JsonGenerator, ListKind, Role, Scope, Variant},
    list::ListGenerator
};
use crate::error::Error;

const GRAPHITE_TARGET: &str = "graphite-target";

const GRAPHITE_FIELDS: &[CopyField] = &[CopyField::new("refId"), CopyField::new("hide")];

const PROMETHEUS_FIELDS: &[CopyField] = &[
    CopyField::new("format"),
    CopyField::new("hide"),
    CopyField::new("instant"),
    CopyField::new("interval"),
    CopyField::new("intervalFactor"),
    CopyField::new("legendFormat"),
    CopyField::new("refId"),
    CopyField::new("step")
];

const INFLUXDB_FIELDS: &[CopyField] = &[CopyField::new("alias"), CopyField::new("refId")];

pub(crate) fn variants() -> Vec<Variant> {
    vec![
        Variant::new("Targets", Role::Standalone, Targets),
        Variant::new("GraphiteTarget", Role::Item(ListKind::Targets), GraphiteTarget),
        Variant::new("PrometheusTarget", Role::Item(ListKind::Targets), PrometheusTarget),
        Variant::new("InfluxdbTarget", Role::Item(ListKind::Targets), InfluxdbTarget)
    ]
}

/// Target list where items that resolve to no component are graphite
/// queries.
#[derive(Debug)]
struct Targets;

impl JsonGenerator for Targets {
    fn gen_json_from_data(&self, scope: &Scope<'_>) -> Result<Value, Error> {
        let list = ListGenerator::new(scope, ListKind::Targets);
        let mut rendered = Vec::new();
        for item in list.items(scope.data())? {
            if list.resolves(item) {
                list.gen_item(item, &mut rendered)?;
            } else {
                debug!("Rendering unresolved target {} as graphite query", item);
                rendered.push(scope.render(GRAPHITE_TARGET, item.clone())?);
            }
        }
        Ok(Value::Array(rendered))
    }
}

#[derive(Debug)]
struct GraphiteTarget;

impl JsonGenerator for GraphiteTarget {
    fn gen_json_from_data(&self, scope: &Scope<'_>) -> Result<Value, Error> {
        let mut json = scope.object(GRAPHITE_FIELDS);
        let target = match scope.data() {
            Value::Object(_) => scope.require("target")?.clone(),
            query => query.clone()
        };
        json.insert("target".to_owned(), target);
        Ok(Value::Object(json))
    }
}

#[derive(Debug)]
struct PrometheusTarget;

impl JsonGenerator for PrometheusTarget {
    fn gen_json_from_data(&self, scope: &Scope<'_>) -> Result<Value, Error> {
        let mut json = scope.object(PROMETHEUS_FIELDS);
        json.insert("expr".to_owned(), scope.require("expr")?.clone());
        Ok(Value::Object(json))
    }
}

#[derive(Debug)]
struct InfluxdbTarget;

impl JsonGenerator for InfluxdbTarget {
    fn gen_json_from_data(&self, scope: &Scope<'_>) -> Result<Value, Error> {
        let mut json = scope.object(INFLUXDB_FIELDS);
        json.insert("query".to_owned(), scope.require("query")?.clone());
        json.insert("dsType".to_owned(), Value::from("influxdb"));
        json.insert("rawQuery".to_owned(), Value::Bool(true));
        Ok(Value::Object(json))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use crate::{ComponentRegistry, Context, Error};

    fn render(registry: &ComponentRegistry, component_type: &str, payload: Value) -> Result<Value, Error> {
        registry
            .create_component(component_type, payload, None)?
            .gen_json(&Context::default(), registry)
    }

    #[test]
    fn unresolved_items_fall_back_to_graphite() {
        let registry = ComponentRegistry::new();
        let json = render(&registry, "targets", json!([
            "a.b.c",
            {"target": "x.y", "refId": "B"}
        ]))
        .expect("targets render");
        assert_eq!(json, json!([
            {"target": "a.b.c"},
            {"refId": "B", "target": "x.y"}
        ]));
    }

    #[test]
    fn named_targets_are_resolved_before_fallback() {
        let mut registry = ComponentRegistry::new();
        registry
            .add(json!({"name": "up", "prometheus-target": {"expr": "up{job=\"{job}\"}"}}))
            .expect("target registers");
        let json = render(&registry, "targets", json!(["up", {"up": {"job": "node"}}]))
            .expect("targets render");
        assert_eq!(json, json!([
            {"expr": "up{job=\"{job}\"}"},
            {"expr": "up{job=\"node\"}"}
        ]));
    }

    #[test]
    fn prometheus_target_requires_expr() {
        let registry = ComponentRegistry::new();
        let error = render(&registry, "prometheus-target", json!({"refId": "A"})).unwrap_err();
        match error {
            Error::MissingField {
                ref component_type,
                ref field
            } => {
                assert_eq!(component_type, "prometheus-target");
                assert_eq!(field, "expr");
            }
            other => panic!("expected missing field, got {other:?}")
        }
    }

    #[test]
    fn influxdb_target_is_raw_query() {
        let registry = ComponentRegistry::new();
        let json = render(&registry, "influxdb-target", json!({"query": "SELECT 1", "alias": "one"}))
            .expect("influxdb target renders");
        assert_eq!(json, json!({
            "alias": "one",
            "query": "SELECT 1",
            "dsType": "influxdb",
            "rawQuery": true
        }));
    }

    #[test]
    fn graphite_mapping_without_target_is_rejected() {
        let registry = ComponentRegistry::new();
        let error = render(&registry, "graphite-target", json!({"refId": "A"})).unwrap_err();
        assert!(matches!(error, Error::MissingField { .. }));
    }
}
