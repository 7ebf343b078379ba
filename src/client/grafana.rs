// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

use serde_json::{Value, json};
use tracing::info;

use super::{Connection, Transport};
use crate::{config::ConnectionSettings, error::Error, exporter::DashboardExporter};

const DASHBOARDS_URI: &str = "/api/dashboards/db";

/// Uploads dashboards through the Grafana HTTP API, overwriting existing
/// ones with the same title.
#[derive(Debug)]
pub struct GrafanaExporter<T = Connection> {
    transport: T
}

impl GrafanaExporter {
    /// Exporter connected according to the `grafana` configuration section.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the section has no host.
    pub fn from_settings(settings: &ConnectionSettings) -> Result<Self, Error> {
        let host = settings.require_host("grafana")?;
        Ok(Self::with_transport(Connection::new(host, settings.auth())?))
    }
}

impl<T> GrafanaExporter<T>
where
    T: Transport
{
    /// Exporter sending requests through `transport`.
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport
        }
    }

    /// Uploads one dashboard document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] when the upload fails.
    pub fn upload(&self, name: &str, dashboard: &Value) -> Result<Value, Error> {
        info!("Uploading dashboard '{}' to Grafana", name);
        let body = json!({
            "overwrite": true,
            "dashboard": dashboard,
            "message": ""
        });
        self.transport.post_json(DASHBOARDS_URI, &body)
    }
}

impl<T> DashboardExporter for GrafanaExporter<T>
where
    T: Transport
{
    fn process_dashboard(&self, _project: &str, dashboard: &str, json: &Value) -> Result<(), Error> {
        self.upload(dashboard, json).map(drop)
    }
}
