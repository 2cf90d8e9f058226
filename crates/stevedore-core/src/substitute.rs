//! `${NAME}` token substitution
//!
//! A release is resolved in three steps:
//! 1. the context's override patch is resolved against the environment only
//! 2. the substitution map is built from environment, patch and, lazily,
//!    the config providers declared by the release
//! 3. every string leaf of the release values is substituted
//!
//! Patch entries still holding tokens after step 1 only reach the release
//! when the provider values fetched for it resolve them. Anything shaped
//! like `${...}` left after step 3, malformed tokens included, is reported
//! as a [`SubstitutionError`].

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value as JsonValue;
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use crate::conditions::Attributes;
use crate::error::{CoreError, Result, SubstitutionError};
use crate::manifest::ReleaseSpecification;
use crate::provider::ProviderRegistry;
use crate::values::Values;

static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{\s*([^{}$\s]+)\s*\}").expect("token pattern is valid"));

/// Any `${...}`, including names [`TOKEN`] never resolves (`${}`, `${DB HOST}`)
static LEFTOVER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]*)\}").expect("leftover pattern is valid"));

/// Flat name -> value table used to resolve tokens
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Substitute(BTreeMap<String, JsonValue>);

impl Substitute {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the process environment; non UTF-8 variables are skipped
    pub fn from_process_env() -> Self {
        std::env::vars_os()
            .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<JsonValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<JsonValue>> FromIterator<(K, V)> for Substitute {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<JsonValue>> Extend<(K, V)> for Substitute {
    /// Later entries overwrite existing names
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.0.insert(k.into(), v.into());
        }
    }
}

/// String form of a value when spliced into a string
pub fn string_form(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

/// Collect every token name found in string leaves
pub fn collect_tokens(value: &JsonValue, tokens: &mut BTreeSet<String>) {
    match value {
        JsonValue::String(s) => {
            for caps in TOKEN.captures_iter(s) {
                tokens.insert(caps[1].to_string());
            }
        }
        JsonValue::Array(items) => items.iter().for_each(|v| collect_tokens(v, tokens)),
        JsonValue::Object(map) => map.values().for_each(|v| collect_tokens(v, tokens)),
        _ => {}
    }
}

/// Collect the names of every `${...}` left in string leaves
pub fn collect_unresolved(value: &JsonValue, names: &mut BTreeSet<String>) {
    match value {
        JsonValue::String(s) => {
            for caps in LEFTOVER.captures_iter(s) {
                names.insert(caps[1].trim().to_string());
            }
        }
        JsonValue::Array(items) => items.iter().for_each(|v| collect_unresolved(v, names)),
        JsonValue::Object(map) => map.values().for_each(|v| collect_unresolved(v, names)),
        _ => {}
    }
}

/// Whether any string leaf still contains something shaped like a token
pub fn has_unresolved(value: &JsonValue) -> bool {
    match value {
        JsonValue::String(s) => LEFTOVER.is_match(s),
        JsonValue::Array(items) => items.iter().any(has_unresolved),
        JsonValue::Object(map) => map.values().any(has_unresolved),
        _ => false,
    }
}

/// Replace resolvable tokens; unknown tokens are kept verbatim
pub fn substitute_value(value: &JsonValue, substitute: &Substitute) -> JsonValue {
    match value {
        JsonValue::String(s) => JsonValue::String(substitute_str(s, substitute).into_owned()),
        JsonValue::Array(items) => JsonValue::Array(
            items
                .iter()
                .map(|v| substitute_value(v, substitute))
                .collect(),
        ),
        JsonValue::Object(map) => JsonValue::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), substitute_value(v, substitute)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn substitute_str<'a>(input: &'a str, substitute: &Substitute) -> Cow<'a, str> {
    TOKEN.replace_all(input, |caps: &Captures<'_>| match substitute.get(&caps[1]) {
        Some(value) => string_form(value),
        None => caps[0].to_string(),
    })
}

/// Outcome of substituting one release
#[derive(Debug, Clone, PartialEq)]
pub enum Substitution {
    Resolved(Values),
    Unresolved(SubstitutionError),
}

/// Per-file substitution engine
///
/// Holds the environment substitute merged with the override patch, whose
/// own tokens were already resolved against the environment.
pub struct SubstitutionEngine<'a> {
    patch: IndexMap<String, JsonValue>,
    base: Substitute,
    registry: &'a ProviderRegistry,
    context: &'a Attributes,
}

impl<'a> SubstitutionEngine<'a> {
    pub fn new(
        env: &Substitute,
        overrides: &IndexMap<String, JsonValue>,
        registry: &'a ProviderRegistry,
        context: &'a Attributes,
    ) -> Self {
        let patch: IndexMap<String, JsonValue> = overrides
            .iter()
            .map(|(k, v)| (k.clone(), substitute_value(v, env)))
            .collect();

        let mut base = env.clone();
        base.extend(
            patch
                .iter()
                .filter(|(_, v)| !has_unresolved(v))
                .map(|(k, v)| (k.clone(), v.clone())),
        );

        Self {
            patch,
            base,
            registry,
            context,
        }
    }

    /// Override patch after resolution against the environment
    pub fn patch(&self) -> &IndexMap<String, JsonValue> {
        &self.patch
    }

    /// Substitute a release's values.
    ///
    /// Config providers are only called while a token of the release values
    /// is missing from the map; a provider failure aborts with an error.
    pub fn substitute(&self, spec: &ReleaseSpecification) -> Result<Substitution> {
        let name = &spec.release.name;

        let mut values = spec.release.values.clone();
        values.overlay(self.patch.iter().filter(|(_, v)| !has_unresolved(v)));

        let mut tokens = BTreeSet::new();
        collect_tokens(values.inner(), &mut tokens);

        let mut map = Cow::Borrowed(&self.base);
        for (provider_name, options) in &spec.configs {
            if tokens.iter().all(|t| map.contains(t)) {
                break;
            }

            tracing::debug!(
                release = %name,
                provider = %provider_name,
                "fetching config values"
            );
            let provider = self.registry.config(provider_name)?;
            let fetched = provider
                .fetch(self.context, options)
                .map_err(|e| CoreError::Provider {
                    name: provider_name.clone(),
                    message: e.to_string(),
                })?;
            map.to_mut().extend(fetched);
        }

        for (key, value) in self.patch.iter().filter(|(_, v)| has_unresolved(v)) {
            let value = substitute_value(value, &map);
            if has_unresolved(&value) {
                tracing::debug!(release = %name, key = %key, "override left out, tokens unresolved");
                continue;
            }
            values.overlay([(key, &value)]);
        }

        let resolved = Values(substitute_value(values.inner(), &map));

        let mut unresolved = BTreeSet::new();
        collect_unresolved(resolved.inner(), &mut unresolved);
        if !unresolved.is_empty() {
            return Ok(Substitution::Unresolved(SubstitutionError {
                release: name.clone(),
                tokens: unresolved.into_iter().collect(),
            }));
        }

        Ok(Substitution::Resolved(resolved))
    }
}
