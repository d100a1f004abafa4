//! Pipeline variables and runtime block configuration

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

/// Variables passed to templates and to the build tool
pub type Variables = Map<String, Value>;

/// Reserved key carrying runtime configuration from the orchestration layer.
///
/// Never forwarded to the build tool.
pub const RUNTIME_VARIABLES_KEY: &str = "__mage_variables";

/// Shallow merge where `overrides` wins on key collisions
pub fn merge(base: &Variables, overrides: &Variables) -> Variables {
    let mut merged = base.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Encode a timestamp the way it is handed to the build tool
pub fn timestamp_value(ts: DateTime<Utc>) -> Value {
    Value::String(ts.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Variables that can be forwarded to the build tool as `--vars`.
///
/// Drops the reserved runtime key and null values.
pub fn forwardable(variables: &Variables) -> Variables {
    variables
        .iter()
        .filter(|(k, v)| k.as_str() != RUNTIME_VARIABLES_KEY && !v.is_null())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Runtime overrides for one block, read from
/// `__mage_variables.blocks.<uuid>.configuration`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeBlockConfiguration {
    /// Extra flags such as `--full-refresh`
    pub flags: Vec<String>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

impl RuntimeBlockConfiguration {
    /// Extract the runtime configuration of `block_uuid`, if any
    pub fn from_variables(variables: &Variables, block_uuid: &str) -> Option<Self> {
        let config = variables
            .get(RUNTIME_VARIABLES_KEY)?
            .get("blocks")?
            .get(block_uuid)?
            .get("configuration")?;

        let flags = match config.get("flags") {
            Some(Value::String(flag)) if !flag.is_empty() => vec![flag.clone()],
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect(),
            _ => Vec::new(),
        };

        let text = |key: &str| {
            config
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(String::from)
        };

        Some(Self {
            flags,
            prefix: text("prefix"),
            suffix: text("suffix"),
        })
    }

    /// Apply prefix and suffix to a selected model path
    pub fn decorate(&self, path: &str) -> String {
        format!(
            "{}{}{}",
            self.prefix.as_deref().unwrap_or_default(),
            path,
            self.suffix.as_deref().unwrap_or_default()
        )
    }
}
