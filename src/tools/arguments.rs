//! Typed access to tool call arguments.

use crate::error::StoreIntelError;

/// Wrapper around tool call arguments providing typed extraction.
#[derive(Debug, Clone)]
pub struct ToolArguments {
    value: serde_json::Value,
}

impl ToolArguments {
    /// Models sometimes send arguments as a JSON-encoded string; those are
    /// decoded here so accessors see an object either way.
    pub fn new(value: serde_json::Value) -> Self {
        let value = match value {
            serde_json::Value::String(raw) => match raw.trim() {
                "" => serde_json::json!({}),
                trimmed => serde_json::from_str(trimmed).unwrap_or(serde_json::Value::String(raw)),
            },
            other => other,
        };
        Self { value }
    }

    /// Get the raw JSON value.
    pub fn raw(&self) -> &serde_json::Value {
        &self.value
    }

    /// Get a string argument by key.
    pub fn get_str(&self, key: &str) -> Result<&str, StoreIntelError> {
        self.value
            .get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| StoreIntelError::InvalidArgument(format!("Missing string argument: {key}")))
    }

    /// Get an optional string argument.
    pub fn get_str_opt(&self, key: &str) -> Option<&str> {
        self.value.get(key).and_then(|v| v.as_str())
    }

    /// Deserialize the entire arguments into a typed struct.
    pub fn deserialize<T: serde::de::DeserializeOwned>(&self) -> Result<T, StoreIntelError> {
        serde_json::from_value(self.value.clone()).map_err(|e| {
            StoreIntelError::InvalidArgument(format!("Failed to deserialize arguments: {e}"))
        })
    }
}
