// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Annotation list and annotation variant.

use serde_json::Value;

use super::{
    base::{CopyField, JsonGenerator, ListKind, Literal, Role, Scope, Variant},
    list::ListOf
};
use crate::error::Error;

const ANNOTATION_FIELDS: &[CopyField] = &[
    CopyField::new("datasource"),
    CopyField::with_default("enable", Literal::Bool(true)),
    CopyField::with_default("hide", Literal::Bool(false)),
    CopyField::with_default("iconColor", Literal::Str("rgba(255, 96, 96, 1)")),
    CopyField::with_default("showIn", Literal::Int(0))
];

pub(crate) fn variants() -> Vec<Variant> {
    vec![
        Variant::new("Annotations", Role::Standalone, ListOf(ListKind::Annotations)),
        Variant::new("Annotation", Role::Item(ListKind::Annotations), Annotation)
    ]
}

#[derive(Debug)]
struct Annotation;

impl JsonGenerator for Annotation {
    fn gen_json_from_data(&self, scope: &Scope<'_>) -> Result<Value, Error> {
        let mut json = scope.object(ANNOTATION_FIELDS);
        json.insert("name".to_owned(), scope.require("name")?.clone());
        json.insert("expr".to_owned(), scope.require("expr")?.clone());
        Ok(Value::Object(json))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{ComponentRegistry, Context, Error};

    #[test]
    fn annotation_defaults() {
        let registry = ComponentRegistry::new();
        let json = registry
            .create_component("annotation", json!({"name": "deploys", "expr": "deploys_total"}), None)
            .expect("annotation is registered")
            .gen_json(&Context::default(), &registry)
            .expect("annotation renders");
        assert_eq!(json, json!({
            "name": "deploys",
            "expr": "deploys_total",
            "enable": true,
            "hide": false,
            "iconColor": "rgba(255, 96, 96, 1)",
            "showIn": 0
        }));
    }

    #[test]
    fn annotation_requires_expr() {
        let registry = ComponentRegistry::new();
        let error = registry
            .create_component("annotation", json!({"name": "deploys"}), None)
            .expect("annotation is registered")
            .gen_json(&Context::default(), &registry)
            .unwrap_err();
        match error {
            Error::MissingField {
                ref field, ..
            } => assert_eq!(field, "expr"),
            other => panic!("expected missing field, got {other:?}")
        }
    }
}
