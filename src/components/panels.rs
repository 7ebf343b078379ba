// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Panel list and panel variants.
//!
//! Panels render their metric queries through the `targets` list, so bare
//! graphite paths and inline target definitions may be mixed freely.

use serde_json::{Map, Value, json};

use super::{
    base::{CopyField, JsonGenerator, ListKind, Literal, Role, Scope, Variant, copy_fields, text_of},
    list::ListOf
};
use crate::error::Error;

const TARGETS: &str = "targets";

const GRAPH_FIELDS: &[CopyField] = &[
    CopyField::with_default("title", Literal::Null),
    CopyField::with_default("span", Literal::Null),
    CopyField::with_default("nullPointMode", Literal::Str("null")),
    CopyField::new("stack"),
    CopyField::new("fill"),
    CopyField::new("aliasColors"),
    CopyField::new("bars"),
    CopyField::new("lines"),
    CopyField::new("linewidth"),
    CopyField::new("points"),
    CopyField::new("pointradius"),
    CopyField::new("percentage"),
    CopyField::new("steppedLine"),
    CopyField::new("y_formats"),
    CopyField::new("seriesOverrides"),
    CopyField::new("repeat"),
    CopyField::new("minSpan"),
    CopyField::new("decimals"),
    CopyField::new("datasource"),
    CopyField::new("description"),
    CopyField::new("transparent")
];

const GRID_FIELDS: &[CopyField] = &[
    CopyField::with_default("leftMax", Literal::Null),
    CopyField::with_default("rightMax", Literal::Null),
    CopyField::with_default("leftMin", Literal::Null),
    CopyField::with_default("rightMin", Literal::Null),
    CopyField::with_default("threshold1", Literal::Null),
    CopyField::with_default("threshold2", Literal::Null)
];

const LEGEND_FIELDS: &[CopyField] = &[
    CopyField::with_default("show", Literal::Bool(true)),
    CopyField::with_default("values", Literal::Bool(false)),
    CopyField::with_default("min", Literal::Bool(false)),
    CopyField::with_default("max", Literal::Bool(false)),
    CopyField::with_default("current", Literal::Bool(false)),
    CopyField::with_default("total", Literal::Bool(false)),
    CopyField::with_default("avg", Literal::Bool(false)),
    CopyField::with_default("alignAsTable", Literal::Bool(false)),
    CopyField::with_default("rightSide", Literal::Bool(false)),
    CopyField::with_default("hideEmpty", Literal::Bool(false)),
    CopyField::with_default("hideZero", Literal::Bool(false))
];

const TOOLTIP_FIELDS: &[CopyField] = &[
    CopyField::with_default("value_type", Literal::Str("individual")),
    CopyField::with_default("shared", Literal::Bool(false)),
    CopyField::with_default("sort", Literal::Int(0))
];

const SINGLE_STAT_FIELDS: &[CopyField] = &[
    CopyField::with_default("title", Literal::Null),
    CopyField::with_default("span", Literal::Null),
    CopyField::with_default("nullPointMode", Literal::Str("null")),
    CopyField::with_default("valueName", Literal::Str("current")),
    CopyField::new("prefix"),
    CopyField::new("postfix"),
    CopyField::new("nullText"),
    CopyField::new("format"),
    CopyField::new("thresholds"),
    CopyField::new("colorValue"),
    CopyField::new("colorBackground"),
    CopyField::new("colors"),
    CopyField::new("prefixFontSize"),
    CopyField::new("valueFontSize"),
    CopyField::new("postfixFontSize"),
    CopyField::new("maxDataPoints"),
    CopyField::new("datasource"),
    CopyField::new("repeat"),
    CopyField::new("minSpan"),
    CopyField::new("decimals"),
    CopyField::new("description")
];

const SPARKLINE_FIELDS: &[CopyField] = &[
    CopyField::with_default("show", Literal::Bool(true)),
    CopyField::with_default("full", Literal::Bool(false)),
    CopyField::with_default("lineColor", Literal::Str("rgb(31, 120, 193)")),
    CopyField::with_default("fillColor", Literal::Str("rgba(31, 118, 189, 0.18)"))
];

const GAUGE_FIELDS: &[CopyField] = &[
    CopyField::with_default("show", Literal::Bool(true)),
    CopyField::with_default("minValue", Literal::Int(0)),
    CopyField::with_default("maxValue", Literal::Int(100)),
    CopyField::with_default("thresholdMarkers", Literal::Bool(true)),
    CopyField::with_default("thresholdLabels", Literal::Bool(false))
];

const TABLE_FIELDS: &[CopyField] = &[
    CopyField::with_default("title", Literal::Null),
    CopyField::with_default("span", Literal::Null),
    CopyField::with_default("transform", Literal::Str("timeseries_aggregations")),
    CopyField::new("fontSize"),
    CopyField::new("pageSize"),
    CopyField::new("showHeader"),
    CopyField::new("scroll"),
    CopyField::new("sort"),
    CopyField::new("styles"),
    CopyField::new("datasource"),
    CopyField::new("repeat"),
    CopyField::new("minSpan"),
    CopyField::new("description")
];

const TEXT_FIELDS: &[CopyField] = &[
    CopyField::with_default("title", Literal::Null),
    CopyField::with_default("span", Literal::Null),
    CopyField::with_default("mode", Literal::Str("text")),
    CopyField::with_default("content", Literal::Str("")),
    CopyField::new("transparent"),
    CopyField::new("repeat"),
    CopyField::new("minSpan"),
    CopyField::new("description")
];

pub(crate) fn variants() -> Vec<Variant> {
    vec![
        Variant::new("Panels", Role::Standalone, ListOf(ListKind::Panels)),
        Variant::new("Graph", Role::Item(ListKind::Panels), Graph),
        Variant::new("SingleStat", Role::Item(ListKind::Panels), SingleStat),
        Variant::new("Table", Role::Item(ListKind::Panels), Table),
        Variant::new("Text", Role::Item(ListKind::Panels), Text)
    ]
}

#[derive(Debug)]
struct Graph;

impl JsonGenerator for Graph {
    fn gen_json_from_data(&self, scope: &Scope<'_>) -> Result<Value, Error> {
        let mut json = scope.object(GRAPH_FIELDS);
        json.insert("type".to_owned(), Value::from("graph"));
        json.insert("targets".to_owned(), render_targets(scope)?);
        for (key, fields) in [("grid", GRID_FIELDS), ("legend", LEGEND_FIELDS), ("tooltip", TOOLTIP_FIELDS)] {
            if let Some(section) = scope.get(key) {
                json.insert(key.to_owned(), Value::Object(copy_fields(section, fields)));
            }
        }
        insert_children(scope, &mut json, &["yaxes", "links"])?;
        Ok(Value::Object(json))
    }
}

#[derive(Debug)]
struct SingleStat;

impl JsonGenerator for SingleStat {
    fn gen_json_from_data(&self, scope: &Scope<'_>) -> Result<Value, Error> {
        let mut json = scope.object(SINGLE_STAT_FIELDS);
        json.insert("type".to_owned(), Value::from("singlestat"));
        json.insert("targets".to_owned(), render_targets(scope)?);

        let empty = Value::Object(Map::new());
        for (key, fields) in [("sparkline", SPARKLINE_FIELDS), ("gauge", GAUGE_FIELDS)] {
            let section = scope.get(key).unwrap_or(&empty);
            json.insert(key.to_owned(), Value::Object(copy_fields(section, fields)));
        }

        let value_maps = match scope.get("valueMaps") {
            Some(maps) => value_maps(maps)?,
            None => Vec::new()
        };
        let range_maps = match scope.get("rangeMaps") {
            Some(maps) => range_maps(maps)?,
            None => Vec::new()
        };
        let mapping_type = if value_maps.is_empty() && !range_maps.is_empty() { 2 } else { 1 };
        json.insert("valueMaps".to_owned(), Value::Array(value_maps));
        json.insert("rangeMaps".to_owned(), Value::Array(range_maps));
        json.insert("mappingType".to_owned(), Value::from(mapping_type));

        insert_children(scope, &mut json, &["links"])?;
        Ok(Value::Object(json))
    }
}

#[derive(Debug)]
struct Table;

impl JsonGenerator for Table {
    fn gen_json_from_data(&self, scope: &Scope<'_>) -> Result<Value, Error> {
        let mut json = scope.object(TABLE_FIELDS);
        json.insert("type".to_owned(), Value::from("table"));
        json.insert("targets".to_owned(), render_targets(scope)?);

        let columns = match scope.get("columns") {
            None => Vec::new(),
            Some(Value::Array(columns)) => columns
                .iter()
                .map(|column| match column {
                    Value::String(name) => json!({"text": name, "value": name.to_lowercase()}),
                    other => other.clone()
                })
                .collect(),
            Some(other) => {
                return Err(Error::invalid_component(
                    scope.component_type(),
                    format!("columns must be a list, found {other}")
                ));
            }
        };
        json.insert("columns".to_owned(), Value::Array(columns));
        Ok(Value::Object(json))
    }
}

#[derive(Debug)]
struct Text;

impl JsonGenerator for Text {
    fn gen_json_from_data(&self, scope: &Scope<'_>) -> Result<Value, Error> {
        let mut json = scope.object(TEXT_FIELDS);
        json.insert("type".to_owned(), Value::from("text"));
        Ok(Value::Object(json))
    }
}

/// Renders `targets` plus the optional single `target` of a panel.
fn render_targets(scope: &Scope<'_>) -> Result<Value, Error> {
    let mut items = match scope.get(TARGETS) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(other) => {
            return Err(Error::invalid_component(
                scope.component_type(),
                format!("targets must be a list, found {other}")
            ));
        }
    };
    if let Some(target) = scope.get("target") {
        items.push(target.clone());
    }
    scope.render(TARGETS, Value::Array(items))
}

fn insert_children(scope: &Scope<'_>, json: &mut Map<String, Value>, keys: &[&str]) -> Result<(), Error> {
    for key in keys {
        if let Some(child) = scope.child_json(key)? {
            json.insert((*key).to_owned(), child);
        }
    }
    Ok(())
}

fn value_maps(maps: &Value) -> Result<Vec<Value>, Error> {
    let Value::Object(maps) = maps else {
        return Err(Error::invalid_component("single-stat", "valueMaps must be a mapping"));
    };
    Ok(maps
        .iter()
        .map(|(value, text)| json!({"value": value, "op": "=", "text": text_of(text)}))
        .collect())
}

fn range_maps(maps: &Value) -> Result<Vec<Value>, Error> {
    let Value::Object(maps) = maps else {
        return Err(Error::invalid_component("single-stat", "rangeMaps must be a mapping"));
    };
    maps.iter()
        .map(|(range, text)| {
            let (from, to) = range.split_once(':').ok_or_else(|| {
                Error::invalid_component(
                    "single-stat",
                    format!("range '{range}' must have the form 'from:to'")
                )
            })?;
            Ok(json!({"from": from, "to": to, "text": text_of(text)}))
        })
        .collect()
}
