//! Release values with merge support

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Values container (arbitrary YAML/JSON tree)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Values(pub JsonValue);

impl Values {
    /// Create empty values
    pub fn new() -> Self {
        Self(JsonValue::Object(serde_json::Map::new()))
    }

    /// Deep merge another Values into this one
    ///
    /// Rules:
    /// - Scalars: overlay replaces base
    /// - Objects: recursive merge
    /// - Arrays: overlay replaces base (not appended)
    pub fn merge(&mut self, overlay: &Values) {
        deep_merge(&mut self.0, &overlay.0);
    }

    /// Replace top-level keys with the given entries.
    ///
    /// Unlike [`merge`](Self::merge), nested objects are replaced wholesale.
    /// Non-object values are turned into an empty object first, but only
    /// when there is something to write.
    pub fn overlay<'a, I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (&'a String, &'a JsonValue)>,
    {
        let mut entries = entries.into_iter().peekable();
        if entries.peek().is_none() {
            return;
        }

        if !self.0.is_object() {
            self.0 = JsonValue::Object(serde_json::Map::new());
        }

        if let JsonValue::Object(map) = &mut self.0 {
            for (key, value) in entries {
                map.insert(key.clone(), value.clone());
            }
        }
    }

    /// Get the inner JSON value
    pub fn inner(&self) -> &JsonValue {
        &self.0
    }

    /// Convert to JSON value
    pub fn into_inner(self) -> JsonValue {
        self.0
    }

    /// Check if values are empty
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            JsonValue::Object(map) => map.is_empty(),
            JsonValue::Null => true,
            _ => false,
        }
    }
}

/// Deep merge two JSON values
fn deep_merge(base: &mut JsonValue, overlay: &JsonValue) {
    match (base, overlay) {
        (JsonValue::Object(base_map), JsonValue::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => {
                        base_map.insert(key.clone(), overlay_value.clone());
                    }
                }
            }
        }
        (base, overlay) => {
            *base = overlay.clone();
        }
    }
}
