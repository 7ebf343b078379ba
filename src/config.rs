// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Configuration document of the command line tool.
//!
//! The YAML file holds optional sections for the default expansion context
//! and for each exporter. Connection settings may be overridden through
//! environment variables so credentials never need to live in the file.

use std::{
    fs,
    path::{Path, PathBuf}
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{self, Error};

/// Root configuration document.
///
/// # Examples
///
/// ```
/// use grafana_dashboards::Config;
///
/// let yaml = r#"
/// context:
///   env: prod
/// grafana:
///   host: https://grafana.example.org
///   token: secret
/// "#;
/// let config: Config = serde_yaml::from_str(yaml).expect("valid configuration");
/// assert_eq!(config.context["env"], "prod");
/// assert!(config.elastic_search.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Expansion data merged into every project, below `--context`.
    pub context:        Map<String, Value>,
    /// File exporter settings.
    pub file:           Option<FileSettings>,
    /// Grafana API exporter settings.
    pub grafana:        Option<ConnectionSettings>,
    /// Elasticsearch exporter settings.
    #[serde(rename = "elastic-search", alias = "elastic_search")]
    pub elastic_search: Option<ConnectionSettings>
}

/// File exporter section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FileSettings {
    /// Directory receiving `<project>/<dashboard>.json` files.
    #[serde(alias = "output-folder")]
    pub output_folder: Option<PathBuf>
}

/// Connection section of an HTTP exporter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Base URL requests are sent to.
    pub host:     Option<String>,
    /// User for basic authentication.
    pub username: Option<String>,
    /// Password for basic authentication.
    pub password: Option<String>,
    /// Bearer token; takes precedence over basic credentials.
    pub token:    Option<String>
}

/// Credentials attached to exporter requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    /// No `Authorization` header.
    None,
    /// HTTP basic authentication.
    Basic {
        /// User name.
        username: String,
        /// Password, possibly empty.
        password: String
    },
    /// Bearer token authentication.
    Bearer(String)
}

impl ConnectionSettings {
    /// Credentials derived from the section.
    pub fn auth(&self) -> Auth {
        if let Some(token) = &self.token {
            return Auth::Bearer(token.clone());
        }
        match &self.username {
            Some(username) => Auth::Basic {
                username: username.clone(),
                password: self.password.clone().unwrap_or_default()
            },
            None => Auth::None
        }
    }

    /// Configured host.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming `section` when no host is set.
    pub fn require_host(&self, section: &str) -> Result<&str, Error> {
        self.host
            .as_deref()
            .filter(|host| !host.trim().is_empty())
            .ok_or_else(|| Error::validation(format!("{section} host is not configured")))
    }

    fn apply_env<F>(section: Option<Self>, prefix: &str, keys: &[&str], lookup: &F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>
    {
        let mut settings = section;
        for key in keys {
            let Some(value) = lookup(&format!("{prefix}_{}", key.to_uppercase())) else {
                continue;
            };
            let target = settings.get_or_insert_with(Self::default);
            let slot = match *key {
                "host" => &mut target.host,
                "username" => &mut target.username,
                "password" => &mut target.password,
                _ => &mut target.token
            };
            *slot = Some(value);
        }
        settings
    }
}

impl Config {
    /// Applies environment overrides read through `lookup`.
    ///
    /// `GRAFANA_HOST`, `GRAFANA_USERNAME`, `GRAFANA_PASSWORD` and
    /// `GRAFANA_TOKEN` override the Grafana section; `ES_HOST`,
    /// `ES_USERNAME` and `ES_PASSWORD` the Elasticsearch one. A variable
    /// creates its section when the file has none.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>
    {
        self.grafana = ConnectionSettings::apply_env(
            self.grafana.take(),
            "GRAFANA",
            &["host", "username", "password", "token"],
            &lookup
        );
        self.elastic_search = ConnectionSettings::apply_env(
            self.elastic_search.take(),
            "ES",
            &["host", "username", "password"],
            &lookup
        );
        self
    }

    /// Output folder of the file exporter, if configured.
    pub fn output_folder(&self) -> Option<&Path> {
        self.file
            .as_ref()
            .and_then(|file| file.output_folder.as_deref())
    }
}

/// Reads the configuration file at `path`.
///
/// A missing or empty file yields the default configuration.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be read and [`Error::Parse`]
/// when it is not a valid configuration document.
pub fn load_config(path: &Path) -> Result<Config, Error> {
    if !path.exists() {
        debug!("Config file '{}' does not exist", path.display());
        return Ok(Config::default());
    }
    let contents = fs::read_to_string(path).map_err(|source| error::io_error(path, source))?;
    parse_config(&contents)
}

/// Parses a configuration document.
///
/// # Errors
///
/// Returns [`Error::Parse`] when the YAML cannot be decoded.
pub fn parse_config(contents: &str) -> Result<Config, Error> {
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(contents)?)
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, io::Write};

    use serde_json::json;

    use super::{Auth, Config, ConnectionSettings, load_config, parse_config};
    use crate::Error;

    #[test]
    fn sections_are_parsed() {
        let config = parse_config(
            "context:\n  env: prod\nfile:\n  output_folder: out\n\
             grafana:\n  host: http://grafana\n  username: admin\n  password: pw\n\
             elastic-search:\n  host: http://es\n"
        )
        .expect("configuration parses");
        assert_eq!(config.context.get("env"), Some(&json!("prod")));
        assert_eq!(config.output_folder(), Some(std::path::Path::new("out")));
        let grafana = config.grafana.as_ref().expect("grafana section");
        assert_eq!(grafana.auth(), Auth::Basic {
            username: "admin".to_owned(),
            password: "pw".to_owned()
        });
        assert_eq!(
            config.elastic_search.as_ref().and_then(|es| es.host.as_deref()),
            Some("http://es")
        );
    }

    #[test]
    fn missing_file_yields_defaults() {
        let directory = tempfile::tempdir().expect("temp dir");
        let config = load_config(&directory.path().join("absent.yaml")).expect("defaults");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn empty_file_yields_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file).expect("write succeeds");
        assert_eq!(load_config(file.path()).expect("defaults"), Config::default());
    }

    #[test]
    fn invalid_documents_are_parse_errors() {
        let error = parse_config("grafana: [1, 2").unwrap_err();
        assert!(matches!(error, Error::Parse { .. }));
    }

    #[test]
    fn environment_overrides_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("GRAFANA_HOST", "http://override"),
            ("GRAFANA_TOKEN", "t0k3n"),
            ("ES_USERNAME", "reader")
        ]);
        let config = parse_config("grafana:\n  host: http://grafana\n  username: admin\n")
            .expect("configuration parses")
            .with_env_overrides(|key| env.get(key).map(|value| (*value).to_owned()));

        let grafana = config.grafana.expect("grafana section");
        assert_eq!(grafana.host.as_deref(), Some("http://override"));
        assert_eq!(grafana.auth(), Auth::Bearer("t0k3n".to_owned()));
        let elastic = config.elastic_search.expect("section created from environment");
        assert_eq!(elastic.username.as_deref(), Some("reader"));
        assert!(elastic.host.is_none());
    }

    #[test]
    fn missing_host_is_a_validation_error() {
        let error = ConnectionSettings::default().require_host("grafana").unwrap_err();
        match error {
            Error::Validation {
                ref message
            } => assert_eq!(message, "grafana host is not configured"),
            other => panic!("expected validation error, got {other:?}")
        }
    }
}
