// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Row list and row variants.

use serde_json::Value;

use super::{
    base::{CopyField, JsonGenerator, ListKind, Literal, Role, Scope, Variant},
    list::ListOf
};
use crate::error::Error;

const ROW_FIELDS: &[CopyField] = &[
    CopyField::new("collapse"),
    CopyField::new("repeat"),
    CopyField::with_default("title", Literal::Str("")),
    CopyField::with_default("height", Literal::Str("250px")),
    CopyField::with_default("showTitle", Literal::Bool(false))
];

pub(crate) fn variants() -> Vec<Variant> {
    vec![
        Variant::new("Rows", Role::Standalone, ListOf(ListKind::Rows)),
        Variant::new("Row", Role::Item(ListKind::Rows), Row)
    ]
}

#[derive(Debug)]
struct Row;

impl JsonGenerator for Row {
    fn gen_json_from_data(&self, scope: &Scope<'_>) -> Result<Value, Error> {
        let mut json = scope.object(ROW_FIELDS);
        let panels = scope.child_json("panels")?.unwrap_or_else(|| Value::Array(Vec::new()));
        json.insert("panels".to_owned(), panels);
        Ok(Value::Object(json))
    }
}
