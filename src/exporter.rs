// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Generation of every project dashboard and its hand-off to exporters.

use std::{
    fs,
    path::{Path, PathBuf}
};

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::{
    components::ComponentRegistry,
    error::{self, Error}
};

/// Sink receiving generated dashboards.
pub trait DashboardExporter {
    /// Consumes the dashboard `dashboard` of `project`.
    ///
    /// # Errors
    ///
    /// Implementations report any failure to store or publish the document.
    fn process_dashboard(&self, project: &str, dashboard: &str, json: &Value) -> Result<(), Error>;
}

/// Renders every dashboard of every project and forwards it to all
/// exporters.
#[derive(Default)]
pub struct ProjectProcessor {
    exporters: Vec<Box<dyn DashboardExporter>>
}

impl std::fmt::Debug for ProjectProcessor {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ProjectProcessor")
            .field("exporters", &self.exporters.len())
            .finish()
    }
}

impl ProjectProcessor {
    /// Processor forwarding to `exporters`, in order.
    pub fn new(exporters: Vec<Box<dyn DashboardExporter>>) -> Self {
        Self {
            exporters
        }
    }

    /// Number of attached exporters.
    pub fn exporter_count(&self) -> usize {
        self.exporters.len()
    }

    /// Generates all dashboards and returns how many were produced.
    ///
    /// `parent_context` entries override the data of every project.
    ///
    /// # Errors
    ///
    /// Stops at the first generation or export failure.
    pub fn process_projects(
        &self,
        registry: &ComponentRegistry,
        parent_context: Option<&Map<String, Value>>
    ) -> Result<usize, Error> {
        let mut generated = 0;
        for project in registry.projects()? {
            let project_name = project.name().unwrap_or_default();
            info!("Processing project '{}'", project_name);
            let dashboards = project.get_dashboards(registry)?;
            for context in project.get_contexts(parent_context) {
                for dashboard in &dashboards {
                    let json = dashboard.gen_json(&context, registry)?;
                    let name = context.expand_to_string(dashboard.name().unwrap_or_default());
                    debug!("Generated dashboard '{}'", name);
                    for exporter in &self.exporters {
                        exporter.process_dashboard(project_name, &name, &json)?;
                    }
                    generated += 1;
                }
            }
        }
        Ok(generated)
    }
}

/// Writes dashboards as `<folder>/<project>/<dashboard>.json`.
#[derive(Debug, Clone)]
pub struct FileExporter {
    output_folder: PathBuf
}

impl FileExporter {
    /// Exporter writing below `output_folder`, created when missing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the path exists but is not a
    /// directory and [`Error::Io`] when it cannot be created.
    pub fn new<P>(output_folder: P) -> Result<Self, Error>
    where
        P: Into<PathBuf>
    {
        let output_folder = output_folder.into();
        ensure_directory(&output_folder)?;
        Ok(Self {
            output_folder
        })
    }

    /// Folder dashboards are written below.
    pub fn output_folder(&self) -> &Path {
        &self.output_folder
    }
}

impl DashboardExporter for FileExporter {
    fn process_dashboard(&self, project: &str, dashboard: &str, json: &Value) -> Result<(), Error> {
        let folder = self.output_folder.join(project);
        ensure_directory(&folder)?;
        let path = folder.join(format!("{dashboard}.json"));
        info!("Writing dashboard to {}", path.display());
        let contents = serde_json::to_string_pretty(&sort_keys(json))?;
        fs::write(&path, contents).map_err(|source| error::io_error(&path, source))
    }
}

fn ensure_directory(path: &Path) -> Result<(), Error> {
    if path.exists() {
        if !path.is_dir() {
            return Err(Error::validation(format!(
                "file with name '{}' exists and is not a directory",
                path.display()
            )));
        }
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|source| error::io_error(path, source))
}

/// Copy of `value` with object keys sorted at every level.
fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(entries) => {
            let mut sorted: Vec<_> = entries.iter().collect();
            sorted.sort_by(|left, right| left.0.cmp(right.0));
            Value::Object(
                sorted
                    .into_iter()
                    .map(|(key, value)| (key.clone(), sort_keys(value)))
                    .collect()
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone()
    }
}
