//! Connection bags and canonical adapter configuration

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tb_core::WarehouseType;

/// Key/value credentials handed to a connector, e.g. `POSTGRES_HOST`
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionConfig(BTreeMap<String, String>);

impl ConnectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(key.to_string(), value.into());
    }

    /// Insert only when a value is present
    pub fn insert_opt(&mut self, key: &str, value: Option<String>) {
        if let Some(v) = value {
            self.0.insert(key.to_string(), v);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Values are credentials; only keys are printed.
impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.0.keys()).finish()
    }
}

/// How a table is written when it already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WritePolicy {
    Append,
    Fail,
    #[default]
    Replace,
}

/// Canonical per-invocation record describing where data lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterConfiguration {
    pub warehouse: WarehouseType,
    pub database: Option<String>,
    pub schema: Option<String>,
    pub write_policy: WritePolicy,
}

impl AdapterConfiguration {
    /// Configuration with the default `replace` write policy
    pub fn new(warehouse: WarehouseType, database: Option<String>, schema: Option<String>) -> Self {
        Self {
            warehouse,
            database,
            schema,
            write_policy: WritePolicy::Replace,
        }
    }
}

/// Caller-supplied overrides applied while resolving an adapter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdapterOptions {
    /// Database/project to use instead of the profile's, honoured by BigQuery
    pub database_override: Option<String>,
}
