// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Component model: the variant catalog, the registry of named instances
//! and the JSON generators of every dashboard building block.

mod annotations;
mod axes;
pub mod base;
mod dashboards;
mod links;
pub mod list;
mod panels;
pub mod projects;
pub mod registry;
mod rows;
mod targets;
mod templates;

pub use base::{Component, CopyField, JsonGenerator, ListKind, Literal, Role, Scope, Variant, copy_fields};
pub use list::{ListGenerator, ListOf};
pub use projects::Project;
pub use registry::{Catalog, ComponentRegistry, Fragment};
