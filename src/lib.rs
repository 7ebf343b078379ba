// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Generation of Grafana dashboards from templated YAML definitions.
//!
//! Definition files hold named, typed component fragments: projects,
//! dashboards, rows, panels, targets, templates, annotations and links. The
//! [`ComponentRegistry`] stores them, [`Context`] substitutes `{placeholder}`
//! references inside them, and [`ContextExpander`] multiplies a project into
//! one context per combination of its list-valued data. Every resulting
//! dashboard document is handed to the configured exporters.
//!
//! # Examples
//!
//! ```
//! use grafana_dashboards::{ComponentRegistry, Context};
//! use serde_json::json;
//!
//! let mut registry = ComponentRegistry::new();
//! registry
//!     .add(json!({"name": "overview", "dashboard": {"title": "{env} overview"}}))
//!     .expect("dashboard registers");
//!
//! let context = Context::from_value(&json!({"env": "prod"}));
//! let dashboard = registry
//!     .get_component("dashboard", "overview")
//!     .and_then(|component| component.gen_json(&context, &registry))
//!     .expect("dashboard renders");
//! assert_eq!(dashboard["title"], "prod overview");
//! ```

mod client;
mod components;
mod config;
mod context;
mod error;
mod expander;
mod exporter;
mod loader;
mod naming;

pub use client::{Connection, ElasticSearchExporter, GrafanaExporter, Transport};
pub use components::{
    Catalog, Component, ComponentRegistry, CopyField, Fragment, JsonGenerator, ListGenerator,
    ListKind, ListOf, Literal, Project, Role, Scope, Variant, copy_fields
};
pub use config::{Auth, Config, ConnectionSettings, FileSettings, load_config, parse_config};
pub use context::{Context, Contexts, Lookup, placeholders};
pub use error::{Error, io_error};
pub use expander::{Bindings, ContextExpander};
pub use exporter::{DashboardExporter, FileExporter, ProjectProcessor};
pub use loader::{DefinitionParser, definition_files, parse_fragments, yaml_to_json};
pub use naming::ComponentType;
