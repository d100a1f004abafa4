//! Project-level source registry (`models/mage_sources.yml`)
//!
//! The registry maps declared source names to the tables they expose. It is
//! only ever grown: inserts are idempotent and nothing is removed
//! automatically, since several models may share a source.

use serde::{Deserialize, Serialize};

/// File name of both the project-level and the legacy per-model registry
pub const REGISTRY_FILE: &str = "mage_sources.yml";

fn default_version() -> u32 {
    2
}

/// Registry document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRegistry {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub sources: Vec<RegistrySource>,
}

/// A declared source and its tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySource {
    pub name: String,

    #[serde(default)]
    pub tables: Vec<RegistryTable>,
}

/// A table exposed by a source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryTable {
    pub name: String,
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self {
            version: default_version(),
            sources: Vec::new(),
        }
    }
}

impl SourceRegistry {
    /// Find a source by name
    pub fn source(&self, name: &str) -> Option<&RegistrySource> {
        self.sources.iter().find(|s| s.name == name)
    }

    /// Whether `table` is registered under `source`
    pub fn contains(&self, source: &str, table: &str) -> bool {
        self.source(source)
            .is_some_and(|s| s.tables.iter().any(|t| t.name == table))
    }

    /// Insert `table` under `source`, creating the source when absent.
    ///
    /// Returns `true` when the registry changed.
    pub fn add_table_to_source(&mut self, source: &str, table: &str) -> bool {
        match self.sources.iter_mut().find(|s| s.name == source) {
            Some(existing) => {
                if existing.tables.iter().any(|t| t.name == table) {
                    return false;
                }
                existing.tables.push(RegistryTable {
                    name: table.to_string(),
                });
            }
            None => self.sources.push(RegistrySource {
                name: source.to_string(),
                tables: vec![RegistryTable {
                    name: table.to_string(),
                }],
            }),
        }
        true
    }

    /// All `(source, table)` pairs in document order
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sources.iter().flat_map(|s| {
            s.tables
                .iter()
                .map(move |t| (s.name.as_str(), t.name.as_str()))
        })
    }

    /// Insert every pair from `other`; returns how many were new
    pub fn merge(&mut self, other: &SourceRegistry) -> usize {
        let mut added = 0;
        for (source, table) in other.pairs() {
            if self.add_table_to_source(source, table) {
                added += 1;
            }
        }
        added
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
