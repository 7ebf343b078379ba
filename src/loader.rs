// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Loading of YAML definition files into a component registry.
//!
//! Every file may hold several YAML documents, each a list of component
//! fragments. `!include <path>` nodes are replaced by the referenced file:
//! YAML files are parsed (their own includes resolved relative to them),
//! any other file is inlined as a string. A file including itself, directly
//! or through other files, is rejected.

use std::{
    fs,
    path::{Path, PathBuf}
};

use serde::Deserialize;
use serde_json::{Map, Number, Value};
use serde_yaml::Value as Yaml;
use tracing::{debug, info};

use crate::{
    components::ComponentRegistry,
    error::{self, Error}
};

const INCLUDE_TAG: &str = "!include";

/// Builds registries from definition files.
#[derive(Debug, Default)]
pub struct DefinitionParser {
    registry: ComponentRegistry
}

impl DefinitionParser {
    /// Parser filling a registry over the built-in catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser filling `registry`, typically one built over a catalog with
    /// additional variants.
    pub fn with_registry(registry: ComponentRegistry) -> Self {
        Self {
            registry
        }
    }

    /// Loads every definition file under `paths`.
    ///
    /// Directories are walked recursively and only `.yaml`/`.yml` files are
    /// read from them; explicitly listed files are read whatever their
    /// extension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] for unreadable paths, [`Error::Parse`] for
    /// invalid YAML and every registration error of
    /// [`ComponentRegistry::add`].
    pub fn load_projects<P>(mut self, paths: &[P]) -> Result<ComponentRegistry, Error>
    where
        P: AsRef<Path>
    {
        for path in definition_files(paths)? {
            self.load_file(&path)?;
        }
        Ok(self.registry)
    }

    /// Registers the fragments of one file.
    ///
    /// # Errors
    ///
    /// See [`DefinitionParser::load_projects`].
    pub fn load_file(&mut self, path: &Path) -> Result<(), Error> {
        info!("Loading definitions from {}", path.display());
        let contents = fs::read_to_string(path).map_err(|source| error::io_error(path, source))?;
        let mut includes = vec![canonical(path)?];
        for fragment in parse_documents(&contents, base_dir(path), &mut includes)? {
            self.registry.add(fragment)?;
        }
        Ok(())
    }
}

/// Expands `paths` into the definition files to load, in order.
///
/// # Errors
///
/// Returns [`Error::Io`] when a path or directory cannot be read.
pub fn definition_files<P>(paths: &[P]) -> Result<Vec<PathBuf>, Error>
where
    P: AsRef<Path>
{
    let mut files = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let metadata = fs::metadata(path).map_err(|source| error::io_error(path, source))?;
        if metadata.is_dir() {
            walk(path, &mut files)?;
        } else {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

fn walk(directory: &Path, files: &mut Vec<PathBuf>) -> Result<(), Error> {
    let mut entries = fs::read_dir(directory)
        .map_err(|source| error::io_error(directory, source))?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| error::io_error(directory, source))?;
    entries.sort();
    for entry in entries {
        if entry.is_dir() {
            walk(&entry, files)?;
        } else if is_definition_file(&entry) {
            files.push(entry);
        }
    }
    Ok(())
}

fn is_definition_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|extension| extension.to_str()),
        Some("yaml" | "yml")
    )
}

fn base_dir(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new("."))
}

/// Parses every document of `contents` into a flat list of fragments.
///
/// Includes are resolved relative to `base`.
///
/// # Errors
///
/// Returns [`Error::Parse`] for invalid YAML and [`Error::Validation`] for
/// documents that are not lists of fragments.
pub fn parse_fragments(contents: &str, base: &Path) -> Result<Vec<Value>, Error> {
    parse_documents(contents, base, &mut Vec::new())
}

fn parse_documents(contents: &str, base: &Path, includes: &mut Vec<PathBuf>) -> Result<Vec<Value>, Error> {
    let mut fragments = Vec::new();
    for document in serde_yaml::Deserializer::from_str(contents) {
        match convert(Yaml::deserialize(document)?, base, includes)? {
            Value::Null => debug!("Skipping empty document"),
            Value::Array(items) => fragments.extend(items),
            other => {
                return Err(Error::validation(format!(
                    "definition documents must be lists of components, found {other}"
                )));
            }
        }
    }
    Ok(fragments)
}

/// Converts YAML into JSON, resolving `!include` tags relative to `base`.
///
/// # Errors
///
/// Returns [`Error::Io`] for unreadable includes and [`Error::Validation`]
/// for include cycles and values JSON cannot represent.
pub fn yaml_to_json(value: Yaml, base: &Path) -> Result<Value, Error> {
    convert(value, base, &mut Vec::new())
}

/// `includes` holds the canonical paths of the files being expanded.
fn convert(value: Yaml, base: &Path, includes: &mut Vec<PathBuf>) -> Result<Value, Error> {
    Ok(match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(flag) => Value::Bool(flag),
        Yaml::Number(number) => json_number(&number)?,
        Yaml::String(text) => Value::String(text),
        Yaml::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(|item| convert(item, base, includes))
                .collect::<Result<_, _>>()?
        ),
        Yaml::Mapping(entries) => {
            let mut object = Map::new();
            for (key, value) in entries {
                object.insert(mapping_key(key)?, convert(value, base, includes)?);
            }
            Value::Object(object)
        }
        Yaml::Tagged(tagged) if tagged.tag == INCLUDE_TAG => include(tagged.value, base, includes)?,
        Yaml::Tagged(tagged) => convert(tagged.value, base, includes)?
    })
}

fn include(target: Yaml, base: &Path, includes: &mut Vec<PathBuf>) -> Result<Value, Error> {
    let Yaml::String(target) = target else {
        return Err(Error::validation("!include expects a file path"));
    };
    let path = base.join(target);
    debug!("Including {}", path.display());
    let contents = fs::read_to_string(&path).map_err(|source| error::io_error(&path, source))?;
    if !is_definition_file(&path) {
        return Ok(Value::String(contents));
    }
    let resolved = canonical(&path)?;
    if includes.contains(&resolved) {
        let chain: Vec<_> = includes
            .iter()
            .chain([&resolved])
            .map(|file| file.display().to_string())
            .collect();
        return Err(Error::validation(format!("include cycle: {}", chain.join(" -> "))));
    }
    let included: Yaml = serde_yaml::from_str(&contents)?;
    includes.push(resolved);
    let value = convert(included, base_dir(&path), includes);
    includes.pop();
    value
}

fn canonical(path: &Path) -> Result<PathBuf, Error> {
    fs::canonicalize(path).map_err(|source| error::io_error(path, source))
}

fn json_number(number: &serde_yaml::Number) -> Result<Value, Error> {
    if let Some(integer) = number.as_i64() {
        return Ok(Value::from(integer));
    }
    if let Some(integer) = number.as_u64() {
        return Ok(Value::from(integer));
    }
    number
        .as_f64()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| Error::validation(format!("number {number} cannot be represented in JSON")))
}

fn mapping_key(key: Yaml) -> Result<String, Error> {
    match key {
        Yaml::String(key) => Ok(key),
        Yaml::Bool(flag) => Ok(flag.to_string()),
        Yaml::Number(number) => Ok(number.to_string()),
        Yaml::Null => Ok("null".to_owned()),
        Yaml::Tagged(tagged) => mapping_key(tagged.value),
        other => Err(Error::validation(format!("unsupported mapping key {other:?}")))
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use serde_json::json;

    use super::{DefinitionParser, definition_files, parse_fragments};
    use crate::Error;

    const PROJECT: &str = "\
- name: ops
  project:
    dashboards: [overview]
- name: overview
  dashboard:
    title: Overview
";

    #[test]
    fn multiple_documents_are_concatenated() {
        let fragments = parse_fragments(
            "- name: a\n  text: {}\n---\n- name: b\n  text: {}\n---\n",
            Path::new(".")
        )
        .expect("documents parse");
        assert_eq!(fragments, vec![
            json!({"name": "a", "text": {}}),
            json!({"name": "b", "text": {}})
        ]);
    }

    #[test]
    fn scalar_keys_are_stringified() {
        let fragments = parse_fragments(
            "- name: stat\n  single-stat:\n    valueMaps:\n      0: down\n      1: up\n",
            Path::new(".")
        )
        .expect("document parses");
        assert_eq!(fragments[0]["single-stat"]["valueMaps"], json!({"0": "down", "1": "up"}));
    }

    #[test]
    fn non_list_documents_are_rejected() {
        let error = parse_fragments("name: lonely\n", Path::new(".")).unwrap_err();
        assert!(matches!(error, Error::Validation { .. }));
    }

    #[test]
    fn includes_resolve_relative_to_including_file() {
        let directory = tempfile::tempdir().expect("temp dir");
        fs::write(directory.path().join("panel.yaml"), "title: included\ncontent: !include note.md\n")
            .expect("write include");
        fs::write(directory.path().join("note.md"), "# Notes\n").expect("write note");

        let fragments = parse_fragments("- name: readme\n  text: !include panel.yaml\n", directory.path())
            .expect("document parses");
        assert_eq!(fragments[0]["text"], json!({"title": "included", "content": "# Notes\n"}));
    }

    #[test]
    fn self_including_files_are_rejected() {
        let directory = tempfile::tempdir().expect("temp dir");
        let path = directory.path().join("a.yaml");
        fs::write(&path, "- name: p\n  project: !include a.yaml\n").expect("write a");

        let error = DefinitionParser::new().load_projects(&[&path]).unwrap_err();
        match error {
            Error::Validation {
                ref message
            } => assert!(message.starts_with("include cycle: "), "{message}"),
            other => panic!("expected include cycle, got {other:?}")
        }
    }

    #[test]
    fn indirect_include_cycles_are_rejected() {
        let directory = tempfile::tempdir().expect("temp dir");
        fs::write(directory.path().join("a.yaml"), "inner: !include b.yaml\n").expect("write a");
        fs::write(directory.path().join("b.yaml"), "inner: !include a.yaml\n").expect("write b");

        let error = parse_fragments("- name: p\n  text: !include a.yaml\n", directory.path()).unwrap_err();
        assert!(matches!(error, Error::Validation { .. }));
    }

    #[test]
    fn repeated_includes_are_not_cycles() {
        let directory = tempfile::tempdir().expect("temp dir");
        fs::write(directory.path().join("shared.yaml"), "content: shared\n").expect("write shared");

        let fragments = parse_fragments(
            "- name: a\n  text: !include shared.yaml\n- name: b\n  text: !include shared.yaml\n",
            directory.path()
        )
        .expect("document parses");
        assert_eq!(fragments[1]["text"], json!({"content": "shared"}));
    }

    #[test]
    fn directories_are_walked_in_order() {
        let directory = tempfile::tempdir().expect("temp dir");
        let nested = directory.path().join("nested");
        fs::create_dir(&nested).expect("create nested dir");
        fs::write(directory.path().join("b.yaml"), "[]").expect("write b");
        fs::write(directory.path().join("a.yml"), "[]").expect("write a");
        fs::write(directory.path().join("notes.txt"), "ignored").expect("write txt");
        fs::write(nested.join("c.yaml"), "[]").expect("write c");

        let files = definition_files(&[directory.path()]).expect("walk succeeds");
        let names: Vec<_> = files
            .iter()
            .filter_map(|file| file.file_name().and_then(|name| name.to_str()))
            .collect();
        assert_eq!(names, vec!["a.yml", "b.yaml", "c.yaml"]);
    }

    #[test]
    fn load_projects_builds_registry() {
        let directory = tempfile::tempdir().expect("temp dir");
        fs::write(directory.path().join("project.yaml"), PROJECT).expect("write project");

        let registry = DefinitionParser::new()
            .load_projects(&[directory.path()])
            .expect("definitions load");
        let projects = registry.projects().expect("projects resolve");
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name(), Some("ops"));
        assert!(registry.get_component("dashboard", "overview").is_ok());
    }

    #[test]
    fn missing_paths_are_io_errors() {
        let error = definition_files(&[Path::new("/nonexistent/definitions")]).unwrap_err();
        assert!(matches!(error, Error::Io { .. }));
    }
}
