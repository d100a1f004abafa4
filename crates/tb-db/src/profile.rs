//! A single resolved profile target

use crate::error::{DbError, DbResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tb_core::WarehouseType;

/// Connection parameters of one profile target (`profiles.<name>.outputs.<target>`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileTarget(pub serde_yaml::Mapping);

impl ProfileTarget {
    /// Read a scalar field as a string.
    ///
    /// Numbers and booleans are stringified, so `port: 5432` reads as `"5432"`.
    /// Empty strings and nulls read as `None`.
    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            serde_yaml::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_yaml::Value::Number(n) => Some(n.to_string()),
            serde_yaml::Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Read a boolean field; `"true"`/`"false"` strings are accepted
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.0.get(key)? {
            serde_yaml::Value::Bool(b) => Some(*b),
            serde_yaml::Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Read a field the adapter cannot work without
    pub fn required(&self, warehouse: WarehouseType, key: &str) -> DbResult<String> {
        self.get_string(key)
            .ok_or_else(|| DbError::MissingProfileField {
                warehouse: warehouse.to_string(),
                field: key.to_string(),
            })
    }

    /// Raw `type` field
    pub fn type_name(&self) -> Option<String> {
        self.get_string("type")
    }

    /// Warehouse type named by the `type` field
    pub fn warehouse_type(&self) -> DbResult<WarehouseType> {
        let found = self.type_name().unwrap_or_default();
        WarehouseType::from_str(&found).map_err(|_| DbError::UnknownWarehouse(found))
    }

    /// First schema-like field: `schema`, `+schema`, then `dataset`
    pub fn schema(&self) -> Option<String> {
        self.get_string("schema")
            .or_else(|| self.get_string("+schema"))
            .or_else(|| self.get_string("dataset"))
    }
}

impl From<serde_yaml::Mapping> for ProfileTarget {
    fn from(mapping: serde_yaml::Mapping) -> Self {
        Self(mapping)
    }
}
