// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Combinatorial decomposition of a data tree into flat binding sets.
//!
//! Lists stored under an expansion key fan out into one branch per element,
//! mappings multiply the branches of their entries, and every other value is
//! a single leaf binding. The result is the cartesian product of all
//! branches, each flattened into one mapping.

use std::collections::HashSet;

use serde_json::{Map, Value};

/// Raw bindings produced for one branch of the product.
pub type Bindings = Map<String, Value>;

/// Splits data trees into the cartesian product of their expandable parts.
#[derive(Debug, Clone, Default)]
pub struct ContextExpander {
    keys_to_expand: HashSet<String>
}

impl ContextExpander {
    /// Creates an expander fanning out lists stored under `keys_to_expand`.
    pub fn new<K>(keys_to_expand: &[K]) -> Self
    where
        K: AsRef<str>
    {
        Self {
            keys_to_expand: keys_to_expand.iter().map(|key| key.as_ref().to_owned()).collect()
        }
    }

    /// Decomposes `value`, found under `key`, into flat binding sets.
    ///
    /// `parent` names the expansion key of the list `value` was taken from.
    /// A single-entry mapping inside such a list additionally binds `parent`
    /// to the entry's key, which makes `- web: {port: 80}` addressable both as
    /// `{parent}` and through its own entries.
    ///
    /// When parts of one combination bind the same name, parts holding a
    /// single binding are applied first and parts holding several bindings
    /// last, in order; the last writer wins.
    pub fn create_context(
        &self,
        key: Option<&str>,
        value: &Value,
        parent: Option<&str>
    ) -> Vec<Bindings> {
        let mut branches: Vec<Vec<Bindings>> = Vec::new();

        match value {
            Value::Array(items) if key.is_some_and(|name| self.keys_to_expand.contains(name)) => {
                branches.push(
                    items
                        .iter()
                        .flat_map(|item| self.create_context(key, item, key))
                        .collect()
                );
            }
            Value::Object(entries) => {
                let parent = parent.filter(|name| !name.is_empty());
                for (sub_key, sub_value) in entries {
                    if let Some(parent) = parent
                        && entries.len() == 1
                    {
                        branches.push(self.create_context(
                            Some(parent),
                            &Value::String(sub_key.clone()),
                            None
                        ));
                    }
                    branches.push(self.create_context(Some(sub_key), sub_value, None));
                }
            }
            _ => branches.push(vec![leaf(key, value)])
        }

        product(&branches).into_iter().map(merge).collect()
    }
}

fn leaf(key: Option<&str>, value: &Value) -> Bindings {
    let mut bindings = Bindings::new();
    if let Some(key) = key {
        bindings.insert(key.to_owned(), value.clone());
    }
    bindings
}

/// Cartesian product of `branches`, the last branch varying fastest.
fn product(branches: &[Vec<Bindings>]) -> Vec<Vec<&Bindings>> {
    branches.iter().fold(vec![Vec::new()], |combinations, branch| {
        combinations
            .iter()
            .flat_map(|prefix| {
                branch.iter().map(move |part| {
                    let mut combination = prefix.clone();
                    combination.push(part);
                    combination
                })
            })
            .collect()
    })
}

fn merge(parts: Vec<&Bindings>) -> Bindings {
    let mut result = Bindings::new();
    let mut multi = Bindings::new();
    for part in parts {
        let target = if part.len() == 1 { &mut result } else { &mut multi };
        for (key, value) in part {
            target.insert(key.clone(), value.clone());
        }
    }
    for (key, value) in multi {
        result.insert(key, value);
    }
    result
}
