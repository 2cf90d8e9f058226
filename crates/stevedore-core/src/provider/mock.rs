//! Mock config provider for testing
//!
//! Returns fixed values and records every call, so tests can assert how
//! often (and with what) a provider was fetched.

use serde_json::Value as JsonValue;
use std::sync::{Arc, RwLock};

use super::{ConfigProvider, ConfigValues, ProviderError};
use crate::conditions::Attributes;
use crate::manifest::ConfigOptions;

/// A recorded `fetch` call
#[derive(Debug, Clone, PartialEq)]
pub struct FetchCall {
    pub context: Attributes,
    pub options: Vec<ConfigOptions>,
}

/// In-memory config provider with call tracking
#[derive(Clone)]
pub struct MockConfigProvider {
    values: ConfigValues,
    failure: Option<String>,
    calls: Arc<RwLock<Vec<FetchCall>>>,
}

impl MockConfigProvider {
    /// Provider that always returns the given values
    pub fn new<K, V, I>(values: I) -> Self
    where
        K: Into<String>,
        V: Into<JsonValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            failure: None,
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Provider whose every fetch fails with the given message
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            values: ConfigValues::new(),
            failure: Some(message.into()),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Number of fetch calls made so far
    pub fn fetch_count(&self) -> usize {
        self.calls.read().map(|calls| calls.len()).unwrap_or_default()
    }

    /// Recorded calls, oldest first
    pub fn calls(&self) -> Vec<FetchCall> {
        self.calls
            .read()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl ConfigProvider for MockConfigProvider {
    fn fetch(
        &self,
        context: &Attributes,
        options: &[ConfigOptions],
    ) -> Result<ConfigValues, ProviderError> {
        if let Ok(mut calls) = self.calls.write() {
            calls.push(FetchCall {
                context: context.clone(),
                options: options.to_vec(),
            });
        }

        match &self.failure {
            Some(message) => Err(ProviderError::new(message.clone())),
            None => Ok(self.values.clone()),
        }
    }
}
