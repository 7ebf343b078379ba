// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Y axis list and axis variant.
//!
//! Graphs always carry a left and a right axis; a single configured axis is
//! used for both.

use serde_json::Value;

use super::{
    base::{CopyField, JsonGenerator, ListKind, Literal, Role, Scope, Variant},
    list::ListGenerator
};
use crate::error::Error;

const YAXIS_FIELDS: &[CopyField] = &[
    CopyField::new("decimals"),
    CopyField::with_default("format", Literal::Str("short")),
    CopyField::with_default("label", Literal::Null),
    CopyField::with_default("logBase", Literal::Int(1)),
    CopyField::with_default("max", Literal::Null),
    CopyField::with_default("min", Literal::Null),
    CopyField::with_default("show", Literal::Bool(true))
];

pub(crate) fn variants() -> Vec<Variant> {
    vec![
        Variant::new("Yaxes", Role::Standalone, Yaxes),
        Variant::new("Yaxis", Role::Item(ListKind::Yaxes), Yaxis)
    ]
}

#[derive(Debug)]
struct Yaxes;

impl JsonGenerator for Yaxes {
    fn gen_json_from_data(&self, scope: &Scope<'_>) -> Result<Value, Error> {
        let list = ListGenerator::new(scope, ListKind::Yaxes);
        let items = list.items(scope.data())?;
        let items: Vec<&Value> = match items {
            [single] => vec![single, single],
            items => items.iter().collect()
        };
        let mut rendered = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::Object(entries) if entries.len() > 1 => rendered.push(item.clone()),
                item => list.gen_item(item, &mut rendered)?
            }
        }
        Ok(Value::Array(rendered))
    }
}

#[derive(Debug)]
struct Yaxis;

impl JsonGenerator for Yaxis {
    fn gen_json_from_data(&self, scope: &Scope<'_>) -> Result<Value, Error> {
        Ok(Value::Object(scope.object(YAXIS_FIELDS)))
    }
}
