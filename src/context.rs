// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Placeholder expansion against a snapshot of variable bindings.
//!
//! A [`Context`] maps placeholder names to values. Strings reference them as
//! `{name}`; doubled braces (`{{`, `}}`) escape a literal brace. Expansion
//! never fails: names without a binding are left as `{name}` so that a later,
//! more specific context can still resolve them.

use std::borrow::Cow;

use serde_json::{Map, Value};
use tracing::warn;

use crate::expander::ContextExpander;

/// Upper bound on substitution rounds for a single string.
const MAX_EXPANSION_ROUNDS: usize = 64;

/// Result of looking up a placeholder name in a [`Context`].
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<'a> {
    /// The name is bound to a value.
    Resolved(&'a Value),
    /// The name is unbound; carries the original `{name}` token.
    Unresolved(String)
}

/// Immutable set of placeholder bindings.
///
/// # Examples
///
/// ```
/// use grafana_dashboards::Context;
/// use serde_json::json;
///
/// let context = Context::from_value(&json!({"a": "{b}", "b": "value"}));
/// assert_eq!(context.expand_placeholders(&json!("{a}-{missing}")), json!("value-{missing}"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    bindings: Map<String, Value>
}

impl Context {
    /// Wraps raw bindings without expanding them.
    pub fn new(bindings: Map<String, Value>) -> Self {
        Self {
            bindings
        }
    }

    /// Builds a context from a JSON object; other values yield an empty
    /// context.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self::new(map.clone()),
            _ => Self::default()
        }
    }

    /// Raw bindings of the context.
    pub fn bindings(&self) -> &Map<String, Value> {
        &self.bindings
    }

    /// Looks up a placeholder name.
    pub fn lookup(&self, key: &str) -> Lookup<'_> {
        match self.bindings.get(key) {
            Some(value) => Lookup::Resolved(value),
            None => Lookup::Unresolved(format!("{{{key}}}"))
        }
    }

    /// Expands placeholders in every string reachable from `value`.
    ///
    /// Strings are substituted repeatedly until they stop changing, so
    /// bindings may refer to other bindings. A string consisting of exactly
    /// one bound placeholder is replaced by the bound value itself, keeping
    /// lists, mappings and numbers intact. Escaped braces are unescaped once
    /// the fixed point is reached.
    pub fn expand_placeholders(&self, value: &Value) -> Value {
        match value {
            Value::String(text) => self.expand_string(text),
            Value::Array(items) => {
                Value::Array(items.iter().map(|item| self.expand_placeholders(item)).collect())
            }
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, item)| (key.clone(), self.expand_placeholders(item)))
                    .collect()
            ),
            other => other.clone()
        }
    }

    /// Expands a string and renders the result as text.
    pub fn expand_to_string(&self, text: &str) -> String {
        render_text(&self.expand_string(text)).into_owned()
    }

    /// Expands `data` into independent contexts, one per combination of the
    /// values found under `keys_to_expand`.
    ///
    /// Every produced context has its own values expanded against itself
    /// before it is yielded, so cross references between bindings are
    /// already resolved for callers.
    pub fn create_context<K>(data: &Value, keys_to_expand: &[K]) -> Contexts
    where
        K: AsRef<str>
    {
        Contexts {
            pending: ContextExpander::new(keys_to_expand).create_context(None, data, None).into_iter()
        }
    }

    fn expand_string(&self, text: &str) -> Value {
        let mut current = Value::String(text.to_owned());
        let mut rounds = 0;

        while let Value::String(pending) = &current {
            let next = self.expand_once(pending);
            if next == current {
                break;
            }
            rounds += 1;
            if rounds >= MAX_EXPANSION_ROUNDS {
                warn!("placeholder expansion of '{}' did not settle, giving up", text);
                current = next;
                break;
            }
            current = next;
        }

        match current {
            Value::String(done) => Value::String(unescape(&done)),
            other => other
        }
    }

    fn expand_once(&self, text: &str) -> Value {
        if let Some(inner) = text.strip_prefix('{').and_then(|rest| rest.strip_suffix('}'))
            && let Lookup::Resolved(value) = self.lookup(inner)
        {
            return value.clone();
        }
        Value::String(self.substitute(text))
    }

    fn substitute(&self, text: &str) -> String {
        let mut output = String::with_capacity(text.len());
        for token in tokenize(text) {
            match token {
                Token::Literal(literal) => output.push_str(literal),
                Token::Placeholder(name) => match self.lookup(name) {
                    Lookup::Resolved(value) => output.push_str(&render_text(value)),
                    Lookup::Unresolved(original) => output.push_str(&original)
                }
            }
        }
        output
    }
}

/// Lazy sequence of contexts produced by [`Context::create_context`].
///
/// Each raw binding set is self-expanded only when it is pulled from the
/// iterator; the sequence cannot be restarted.
#[derive(Debug)]
pub struct Contexts {
    pending: std::vec::IntoIter<Map<String, Value>>
}

impl Iterator for Contexts {
    type Item = Context;

    fn next(&mut self) -> Option<Context> {
        let raw = Context::new(self.pending.next()?);
        let expanded = raw
            .bindings
            .iter()
            .map(|(key, value)| (key.clone(), raw.expand_placeholders(value)))
            .collect();
        Some(Context::new(expanded))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.pending.size_hint()
    }
}

/// Names of the placeholders referenced by `text`, in order of appearance.
///
/// Escaped braces are not placeholders.
///
/// # Examples
///
/// ```
/// use grafana_dashboards::placeholders;
///
/// assert_eq!(placeholders("{env}-{{literal}}-{host}"), vec!["env", "host"]);
/// ```
pub fn placeholders(text: &str) -> Vec<String> {
    tokenize(text)
        .into_iter()
        .filter_map(|token| match token {
            Token::Placeholder(name) => Some(name.to_owned()),
            Token::Literal(_) => None
        })
        .collect()
}

/// Renders a value the way it appears when substituted inside a string.
///
/// Strings are used verbatim; every other value is rendered as compact JSON.
pub(crate) fn render_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(text) => Cow::Borrowed(text),
        other => Cow::Owned(other.to_string())
    }
}

#[derive(Debug, PartialEq)]
enum Token<'a> {
    Literal(&'a str),
    Placeholder(&'a str)
}

/// Splits `text` into literal runs and `{name}` placeholders.
///
/// Escapes stay in the literal runs untouched; a brace that does not open a
/// well-formed placeholder is literal as well.
fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = text;

    while let Some(position) = rest.find(['{', '}']) {
        let tail = &rest[position..];
        if tail.starts_with("{{") || tail.starts_with("}}") {
            tokens.push(Token::Literal(&rest[..position + 2]));
            rest = &tail[2..];
            continue;
        }
        if tail.starts_with('{')
            && let Some(close) = tail[1..].find(['{', '}'])
            && tail[1 + close..].starts_with('}')
            && close > 0
        {
            if position > 0 {
                tokens.push(Token::Literal(&rest[..position]));
            }
            tokens.push(Token::Placeholder(&tail[1..1 + close]));
            rest = &tail[close + 2..];
            continue;
        }
        tokens.push(Token::Literal(&rest[..position + 1]));
        rest = &tail[1..];
    }

    if !rest.is_empty() {
        tokens.push(Token::Literal(rest));
    }
    tokens
}

fn unescape(text: &str) -> String {
    text.replace("{{", "{").replace("}}", "}")
}
