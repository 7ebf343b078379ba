// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! HTTP exporters publishing dashboards to Grafana and Elasticsearch.

mod connection;
mod elastic_search;
mod grafana;

use serde_json::Value;

pub use connection::Connection;
pub use elastic_search::ElasticSearchExporter;
pub use grafana::GrafanaExporter;

use crate::error::Error;

/// Sends JSON documents to a service.
///
/// [`Connection`] is the HTTP implementation; exporters are generic over the
/// transport so requests can be observed without a server.
pub trait Transport {
    /// POSTs `body` to `uri`, relative to the transport's host, and returns
    /// the decoded response body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] when the request fails.
    fn post_json(&self, uri: &str, body: &Value) -> Result<Value, Error>;
}
