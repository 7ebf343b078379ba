// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

use serde_json::{Value, json};
use tracing::info;

use super::{Connection, Transport};
use crate::{config::ConnectionSettings, error::Error, exporter::DashboardExporter};

const DASHBOARD_URI_PREFIX: &str = "/es/grafana-dash/dashboard/";

/// Stores dashboards in the Elasticsearch index used by Grafana's
/// Elasticsearch dashboard storage.
#[derive(Debug)]
pub struct ElasticSearchExporter<T = Connection> {
    transport: T
}

impl ElasticSearchExporter {
    /// Exporter connected according to the `elastic-search` configuration
    /// section.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the section has no host.
    pub fn from_settings(settings: &ConnectionSettings) -> Result<Self, Error> {
        let host = settings.require_host("elastic-search")?;
        Ok(Self::with_transport(Connection::new(host, settings.auth())?))
    }
}

impl<T> ElasticSearchExporter<T>
where
    T: Transport
{
    /// Exporter sending requests through `transport`.
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport
        }
    }

    /// Stores one dashboard document under `name`.
    ///
    /// The document itself travels as a JSON string next to its title and
    /// tags.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialize`] when the dashboard cannot be encoded and
    /// [`Error::Http`] when the request fails.
    pub fn upload(&self, name: &str, dashboard: &Value) -> Result<Value, Error> {
        info!("Uploading dashboard '{}' to Elasticsearch", name);
        let body = json!({
            "user": "guest",
            "group": "guest",
            "title": dashboard.get("title").cloned().unwrap_or(Value::Null),
            "tags": dashboard.get("tags").cloned().unwrap_or_else(|| json!([])),
            "dashboard": serde_json::to_string(dashboard)?
        });
        self.transport
            .post_json(&format!("{DASHBOARD_URI_PREFIX}{name}"), &body)
    }
}

impl<T> DashboardExporter for ElasticSearchExporter<T>
where
    T: Transport
{
    fn process_dashboard(&self, _project: &str, dashboard: &str, json: &Value) -> Result<(), Error> {
        self.upload(dashboard, json).map(drop)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::ElasticSearchExporter;
    use crate::{client::testing::RecordingTransport, exporter::DashboardExporter};

    #[test]
    fn dashboards_are_stored_as_strings() {
        let exporter = ElasticSearchExporter::with_transport(RecordingTransport::default());
        let dashboard = json!({"title": "Overview", "tags": ["ops"]});
        exporter
            .process_dashboard("ops", "overview", &dashboard)
            .expect("upload succeeds");

        let requests = exporter.transport.requests.borrow();
        let (uri, body) = &requests[0];
        assert_eq!(uri, "/es/grafana-dash/dashboard/overview");
        assert_eq!(body["user"], "guest");
        assert_eq!(body["group"], "guest");
        assert_eq!(body["title"], "Overview");
        assert_eq!(body["tags"], json!(["ops"]));
        let stored: Value = serde_json::from_str(body["dashboard"].as_str().expect("string document"))
            .expect("document decodes");
        assert_eq!(stored, dashboard);
    }

    #[test]
    fn missing_title_and_tags_have_defaults() {
        let exporter = ElasticSearchExporter::with_transport(RecordingTransport::default());
        exporter.upload("bare", &json!({})).expect("upload succeeds");
        let requests = exporter.transport.requests.borrow();
        assert_eq!(requests[0].1["title"], Value::Null);
        assert_eq!(requests[0].1["tags"], json!([]));
    }
}
