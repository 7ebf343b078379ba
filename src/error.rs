#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the dashboard builder."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The [`masterror::Error`] derive expands pattern matches that trip the
//! `non_shorthand_field_patterns` lint, hence the module level allow.

use std::path::{Path, PathBuf};

/// Unified error type returned by the registry, the generators, the loaders
/// and the exporters.
///
/// Registry and generation failures abort the run. Unknown component types
/// and fragments without a name are not errors: they are logged and skipped
/// by [`ComponentRegistry::add`](crate::ComponentRegistry::add).
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// Reference to a component type or named instance that does not exist.
    #[error("{message}")]
    UnregisteredComponent {
        /// Description of the failed lookup.
        message: String
    },
    /// Two fragments registered the same type and name.
    #[error("key '{name}' is already defined for component {component_type}")]
    DuplicateKey {
        /// Component type tag of the clashing fragment.
        component_type: String,
        /// Name registered twice.
        name:           String
    },
    /// Fragment with more top-level keys than `name` plus one type tag.
    #[error(
        "component must have exactly 2 attributes - name and component type, found {count}"
    )]
    WrongComponentAttributeCount {
        /// Number of keys found on the fragment.
        count: usize
    },
    /// Two catalog variants derived the same component type tag.
    #[error("component type '{component_type}' is provided by both {first} and {second}")]
    DuplicateComponentType {
        /// Derived type tag.
        component_type: String,
        /// Variant registered first.
        first:          String,
        /// Variant rejected by the catalog.
        second:         String
    },
    /// Component data lacks a field the variant cannot render without.
    #[error("component '{component_type}' requires field '{field}'")]
    MissingField {
        /// Component type tag of the incomplete component.
        component_type: String,
        /// Name of the missing field.
        field:          String
    },
    /// Component data has a shape the variant cannot render.
    #[error("invalid '{component_type}' component: {message}")]
    InvalidComponent {
        /// Component type tag of the rejected component.
        component_type: String,
        /// Human readable description of the problem.
        message:        String
    },
    /// Wraps I/O errors that occur while reading definitions or writing
    /// dashboards.
    #[error("I/O failure at {path:?}: {source}")]
    Io {
        /// Location that triggered the failure.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error
    },
    /// Wraps YAML decoding errors.
    #[error("failed to parse YAML: {source}")]
    Parse {
        /// Source decoding error from serde_yaml.
        source: serde_yaml::Error
    },
    /// Wraps JSON serialization errors.
    #[error("failed to serialize JSON: {source}")]
    Serialize {
        /// Underlying serialization error.
        source: serde_json::Error
    },
    /// Returned when configuration or command line input is invalid.
    #[error("invalid configuration: {message}")]
    Validation {
        /// Human readable message describing the validation problem.
        message: String
    },
    /// Transport failures while talking to Grafana or Elasticsearch.
    #[error("request to {url} failed: {message}")]
    Http {
        /// Requested URL.
        url:     String,
        /// Human readable description of the failure.
        message: String
    }
}

impl Error {
    /// Constructs a validation error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the validation failure.
    pub fn validation<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Validation {
            message: message.into()
        }
    }

    /// Constructs an unregistered component error.
    pub fn unregistered<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::UnregisteredComponent {
            message: message.into()
        }
    }

    /// Constructs a missing field error for the given component type.
    pub fn missing_field(component_type: &str, field: &str) -> Self {
        Self::MissingField {
            component_type: component_type.to_owned(),
            field:          field.to_owned()
        }
    }

    /// Constructs an invalid component error for the given component type.
    pub fn invalid_component<M>(component_type: &str, message: M) -> Self
    where
        M: Into<String>
    {
        Self::InvalidComponent {
            component_type: component_type.to_owned(),
            message:        message.into()
        }
    }

    /// Constructs a transport error for a request to `url`.
    pub fn http<M>(url: &str, message: M) -> Self
    where
        M: Into<String>
    {
        Self::Http {
            url:     url.to_owned(),
            message: message.into()
        }
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// The returned string matches the [`std::fmt::Display`] implementation
    /// and is what the CLI prints before exiting.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(source: serde_yaml::Error) -> Self {
        Self::Parse {
            source
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Serialize {
            source
        }
    }
}

/// Creates an [`Error::Io`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn validation_constructor_populates_message() {
        let error = Error::validation("something went wrong");
        match error {
            Error::Validation {
                ref message
            } => {
                assert_eq!(message, "something went wrong");
            }
            other => panic!("expected validation error, got {other:?}")
        }
    }

    #[test]
    fn to_display_string_matches_display() {
        let error = Error::unregistered("No component 'dashboard' with name 'x' found!");
        assert_eq!(error.to_string(), error.to_display_string());
        assert_eq!(error.to_string(), "No component 'dashboard' with name 'x' found!");
    }

    #[test]
    fn duplicate_key_mentions_type_and_name() {
        let error = Error::DuplicateKey {
            component_type: "graph".to_owned(),
            name:           "cpu".to_owned()
        };
        assert_eq!(error.to_string(), "key 'cpu' is already defined for component graph");
    }

    #[test]
    fn missing_field_helper_populates_both_parts() {
        let error = Error::missing_field("prometheus-target", "expr");
        match error {
            Error::MissingField {
                ref component_type,
                ref field
            } => {
                assert_eq!(component_type, "prometheus-target");
                assert_eq!(field, "expr");
            }
            other => panic!("expected missing field error, got {other:?}")
        }
    }

    #[test]
    fn io_error_helper_wraps_path_and_source() {
        let path = std::path::Path::new("/tmp/project.yaml");
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error = super::io_error(path, io_error);

        match error {
            Error::Io {
                path: ref stored_path,
                ref source
            } => {
                assert_eq!(stored_path, path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected io error, got {other:?}")
        }
    }

    #[test]
    fn http_errors_name_the_url() {
        assert_eq!(
            Error::http("http://grafana/api", "status 401").to_string(),
            "request to http://grafana/api failed: status 401"
        );
    }

    #[test]
    fn serde_yaml_conversion_maps_to_parse_variant() {
        let error = serde_yaml::from_str::<usize>("not-a-number").unwrap_err();
        let mapped: Error = error.into();
        assert!(matches!(mapped, Error::Parse { .. }));
    }

    #[test]
    fn serde_json_conversion_maps_to_serialize_variant() {
        let invalid = serde_json::from_str::<serde_json::Value>("not-json").unwrap_err();
        let mapped: Error = invalid.into();
        assert!(matches!(mapped, Error::Serialize { .. }));
    }
}
