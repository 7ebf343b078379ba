// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Derivation of component type tags from variant names.
//!
//! Tags are the kebab-case form of the camel-case variant name
//! (`SingleStat` becomes `single-stat`) and are the keys fragments use to
//! select a variant in YAML definitions.

use std::{borrow::Borrow, fmt, sync::LazyLock};

use regex::Regex;

static FIRST_CAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("(.)([A-Z][a-z]+)").expect("valid first-cap pattern"));
static ALL_CAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("([a-z0-9])([A-Z])").expect("valid all-cap pattern"));

/// Type tag selecting a component variant.
///
/// # Examples
///
/// ```
/// use grafana_dashboards::ComponentType;
///
/// let tag = ComponentType::from_variant_name("InfluxdbTarget");
/// assert_eq!(tag.as_str(), "influxdb-target");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentType(String);

impl ComponentType {
    /// Derives the tag of a variant from its camel-case name.
    pub fn from_variant_name(name: &str) -> Self {
        let separated = FIRST_CAP.replace_all(name, "${1}-${2}");
        let separated = ALL_CAP.replace_all(&separated, "${1}-${2}");
        Self(separated.to_lowercase())
    }

    /// Returns the tag as used in YAML fragments.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ComponentType {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ComponentType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
