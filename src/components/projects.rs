// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Projects: the root entities binding dashboard templates to the data
//! they are expanded with.

use serde_json::{Map, Value};

use super::{
    base::{Component, Role, Variant},
    dashboards::DASHBOARD,
    registry::ComponentRegistry
};
use crate::{
    context::{Context, Contexts, placeholders},
    error::Error
};

/// Type tag of project fragments.
pub(crate) const PROJECT: &str = "project";

pub(crate) fn variants() -> Vec<Variant> {
    vec![Variant::plain("Project", Role::Standalone)]
}

/// Read-only view over a registered project component.
///
/// A project lists dashboard names, which may contain placeholders, and
/// carries the data those placeholders are expanded from. Every other key
/// of the project payload becomes part of the expansion data.
#[derive(Debug, Clone)]
pub struct Project<'r> {
    component:    &'r Component,
    dashboards:   Vec<String>,
    placeholders: Vec<String>
}

impl<'r> Project<'r> {
    /// Wraps a project component.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidComponent`] when `dashboards` is not a list of
    /// names.
    pub fn new(component: &'r Component) -> Result<Self, Error> {
        let dashboards = match component.data().get("dashboards") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(names)) => names
                .iter()
                .map(|name| match name {
                    Value::String(name) => Ok(name.clone()),
                    other => Err(Error::invalid_component(
                        PROJECT,
                        format!("dashboard names must be strings, found {other}")
                    ))
                })
                .collect::<Result<_, _>>()?,
            Some(other) => {
                return Err(Error::invalid_component(
                    PROJECT,
                    format!("dashboards must be a list, found {other}")
                ));
            }
        };
        let placeholders = dashboards
            .iter()
            .flat_map(|name| placeholders(name))
            .collect();
        Ok(Self {
            component,
            dashboards,
            placeholders
        })
    }

    /// Project name.
    pub fn name(&self) -> Option<&'r str> {
        self.component.name()
    }

    /// Dashboard name templates, in declaration order.
    pub fn dashboard_names(&self) -> &[String] {
        &self.dashboards
    }

    /// Placeholders referenced by the dashboard names.
    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    /// Resolves the dashboards of the project.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnregisteredComponent`] for names without a
    /// registered dashboard.
    pub fn get_dashboards(
        &self,
        registry: &'r ComponentRegistry
    ) -> Result<Vec<&'r Component>, Error> {
        self.dashboards
            .iter()
            .map(|name| registry.get_component(DASHBOARD, name))
            .collect()
    }

    /// Contexts the dashboards are rendered with.
    ///
    /// `context` entries override the project's own data. Lists referenced
    /// by dashboard name placeholders fan out into one context per element.
    pub fn get_contexts(&self, context: Option<&Map<String, Value>>) -> Contexts {
        let mut data = match self.component.data() {
            Value::Object(entries) => entries.clone(),
            _ => Map::new()
        };
        if let Some(context) = context {
            data.extend(context.iter().map(|(key, value)| (key.clone(), value.clone())));
        }
        Context::create_context(&Value::Object(data), &self.placeholders)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::Project;
    use crate::{ComponentRegistry, Error};

    fn fixture() -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        registry
            .add(json!({
                "name": "fixture",
                "project": {
                    "dashboards": ["dashboard0", "dashboard1", "{single}", "{dict}", "{list}"],
                    "single": "first",
                    "list": ["list0", "list1"],
                    "dict": [
                        {"dict0": {"dict-value": "00"}},
                        {"dict1": {"dict-value": "10"}}
                    ],
                    "wrapped": "{single}",
                    "double-wrapped": "{wrapped}"
                }
            }))
            .expect("project registers");
        for name in ["dashboard0", "dashboard1", "{single}", "{dict}", "{list}"] {
            registry
                .add(json!({"name": name, "dashboard": {"title": name}}))
                .expect("dashboard registers");
        }
        registry
    }

    #[test]
    fn project_resolves_dashboards_and_contexts() {
        let registry = fixture();
        let projects = registry.projects().expect("projects load");
        assert_eq!(projects.len(), 1);
        let project = &projects[0];
        assert_eq!(project.name(), Some("fixture"));

        let dashboards = project.get_dashboards(&registry).expect("dashboards resolve");
        assert_eq!(dashboards.len(), 5);

        let contexts: Vec<_> = project.get_contexts(None).collect();
        assert_eq!(contexts.len(), 4);
        let template = "{single}-{list}-{dict}-{dict-value}-{missing}-{wrapped}-{double-wrapped}";
        for context in contexts {
            let expanded = context.expand_to_string(template);
            assert_ne!(expanded, template);
            for resolved in ["{single}", "{list}", "{dict}", "{dict-value}", "{wrapped}", "{double-wrapped}"] {
                assert!(!expanded.contains(resolved), "{resolved} left in {expanded}");
            }
            assert!(expanded.contains("{missing}"));
        }
    }

    #[test]
    fn plain_dashboard_names_yield_one_context() {
        let mut registry = ComponentRegistry::new();
        registry
            .add(json!({"name": "p", "project": {"dashboards": ["dashboard0", "dashboard1"]}}))
            .expect("project registers");
        for name in ["dashboard0", "dashboard1"] {
            registry
                .add(json!({"name": name, "dashboard": {}}))
                .expect("dashboard registers");
        }
        let projects = registry.projects().expect("projects load");
        assert_eq!(projects[0].get_dashboards(&registry).expect("resolved").len(), 2);
        assert_eq!(projects[0].get_contexts(None).count(), 1);
    }

    #[test]
    fn parent_context_overrides_project_data() {
        let mut registry = ComponentRegistry::new();
        registry
            .add(json!({"name": "p", "project": {"dashboards": ["{env}"], "env": ["dev", "prod"]}}))
            .expect("project registers");
        let projects = registry.projects().expect("projects load");
        let overrides = json!({"env": ["stage"]});
        let contexts: Vec<_> = projects[0]
            .get_contexts(overrides.as_object())
            .map(|context| context.expand_to_string("{env}"))
            .collect();
        assert_eq!(contexts, vec!["stage".to_owned()]);
    }

    #[test]
    fn unknown_dashboards_fail_to_resolve() {
        let mut registry = ComponentRegistry::new();
        registry
            .add(json!({"name": "p", "project": {"dashboards": ["ghost"]}}))
            .expect("project registers");
        let projects = registry.projects().expect("projects load");
        let error = projects[0].get_dashboards(&registry).unwrap_err();
        assert!(matches!(error, Error::UnregisteredComponent { .. }));
    }

    #[test]
    fn malformed_dashboard_lists_are_rejected() {
        let mut registry = ComponentRegistry::new();
        registry
            .add(json!({"name": "p", "project": {"dashboards": "single"}}))
            .expect("project registers");
        let error = Project::new(&registry.components("project").expect("known")[0]).unwrap_err();
        assert!(matches!(error, Error::InvalidComponent { .. }));
    }
}
