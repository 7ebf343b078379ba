// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Blocking JSON-over-HTTP connection.

use std::time::Duration;

use reqwest::{
    blocking::{Client, Response},
    header::{ACCEPT, HeaderValue}
};
use serde_json::{Map, Value};
use tracing::debug;

use super::Transport;
use crate::{config::Auth, error::Error};

const TIMEOUT: Duration = Duration::from_secs(30);

/// Connection to one host.
///
/// Requests carry JSON content headers and the configured credentials. Each
/// call sends exactly one request; failures are returned as they are.
#[derive(Debug, Clone)]
pub struct Connection {
    host:   String,
    auth:   Auth,
    client: Client
}

impl Connection {
    /// Creates a connection to `host`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] when the HTTP client cannot be initialised.
    pub fn new<H>(host: H, auth: Auth) -> Result<Self, Error>
    where
        H: Into<String>
    {
        let host = host.into();
        debug!("Creating new connection to {}", host);
        let client = Client::builder()
            .timeout(TIMEOUT)
            .build()
            .map_err(|error| Error::http(&host, error.to_string()))?;
        Ok(Self {
            host: host.trim_end_matches('/').to_owned(),
            auth,
            client
        })
    }

    /// Host requests are sent to.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Absolute URL of `uri`.
    pub fn url(&self, uri: &str) -> String {
        format!("{}{}", self.host, uri)
    }

    fn send(&self, url: &str, body: &Value) -> Result<Value, Error> {
        debug!("Sending request: method=POST uri={}", url);
        let request = self
            .client
            .post(url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .json(body);
        let request = match &self.auth {
            Auth::None => request,
            Auth::Basic {
                username,
                password
            } => request.basic_auth(username, Some(password)),
            Auth::Bearer(token) => request.bearer_auth(token)
        };
        let response = request
            .send()
            .map_err(|error| Error::http(url, error.to_string()))?;
        read_response(url, response)
    }
}

impl Transport for Connection {
    fn post_json(&self, uri: &str, body: &Value) -> Result<Value, Error> {
        self.send(&self.url(uri), body)
    }
}

fn read_response(url: &str, response: Response) -> Result<Value, Error> {
    let status = response.status();
    debug!("Response received: status={}", status);
    let text = response
        .text()
        .map_err(|error| Error::http(url, error.to_string()))?;
    if !status.is_success() {
        return Err(Error::http(url, format!("status {status}: {text}")));
    }
    decode_body(url, &text)
}

/// Decodes a response body; an empty body is an empty object.
fn decode_body(url: &str, text: &str) -> Result<Value, Error> {
    if text.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_str(text).map_err(|error| Error::http(url, format!("invalid JSON response: {error}")))
}
