//! Extraction of `ref()`, `source()` and `config()` macro calls from model text
//!
//! These are pure regex scans over the raw template; nothing is rendered.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

static REF_RE: OnceLock<Regex> = OnceLock::new();
static SOURCE_RE: OnceLock<Regex> = OnceLock::new();
static CONFIG_RE: OnceLock<Regex> = OnceLock::new();

fn ref_regex() -> &'static Regex {
    REF_RE.get_or_init(|| {
        Regex::new(r#"\{\{\s*ref\(\s*['"]+(\w+)['"]+\s*\)\s*\}\}"#).expect("valid regex")
    })
}

fn source_regex() -> &'static Regex {
    SOURCE_RE.get_or_init(|| {
        Regex::new(r#"\{\{\s*source\(\s*['"]+(\w+)['"]+\s*,+\s*['"]+(\w+)['"]+\s*\)\s*\}\}"#)
            .expect("valid regex")
    })
}

fn config_regex() -> &'static Regex {
    CONFIG_RE.get_or_init(|| Regex::new(r"\{\{\s*config\(([^)]+)\)\s*\}\}").expect("valid regex"))
}

/// Model names referenced through `{{ ref('name') }}`, in order, duplicates kept
pub fn extract_refs(content: &str) -> Vec<String> {
    ref_regex()
        .captures_iter(content)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// `(source_name, table_name)` pairs referenced through `{{ source('s', 't') }}`
pub fn extract_sources(content: &str) -> Vec<(String, String)> {
    source_regex()
        .captures_iter(content)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect()
}

/// Inline model configuration captured from `{{ config(...) }}` calls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelConfig {
    values: BTreeMap<String, String>,
}

impl ModelConfig {
    /// Parse every `config()` call in the content.
    ///
    /// Later calls and later duplicate keys overwrite earlier ones.
    pub fn parse(content: &str) -> Self {
        let mut values = BTreeMap::new();

        for caps in config_regex().captures_iter(content) {
            for pair in caps[1].trim().split(',') {
                let Some((key, value)) = pair.trim().split_once('=') else {
                    continue;
                };
                values.insert(key.trim().to_string(), strip_quotes(value.trim()).to_string());
            }
        }

        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Table alias, ignoring empty values
    pub fn alias(&self) -> Option<&str> {
        self.get("alias").filter(|v| !v.is_empty())
    }

    pub fn database(&self) -> Option<&str> {
        self.get("database").filter(|v| !v.is_empty())
    }

    pub fn schema(&self) -> Option<&str> {
        self.get("schema").filter(|v| !v.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Strip one pair of matching surrounding quotes
fn strip_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'\'' || first == b'"') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
