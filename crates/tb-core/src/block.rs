//! Block and pipeline abstractions consumed from the orchestration layer
//!
//! Blocks are owned by the pipeline layer. This crate only reads them and
//! rewrites their upstream lists; creation goes through [`Pipeline`].

use crate::error::{CoreError, CoreResult};
use crate::names::clean_name;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Block type as known to the orchestration layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Callback,
    Chart,
    Conditional,
    Custom,
    DataExporter,
    DataLoader,
    Dbt,
    Scratchpad,
    Sensor,
    Transformer,
}

impl std::fmt::Display for BlockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BlockType::Callback => "callback",
            BlockType::Chart => "chart",
            BlockType::Conditional => "conditional",
            BlockType::Custom => "custom",
            BlockType::DataExporter => "data_exporter",
            BlockType::DataLoader => "data_loader",
            BlockType::Dbt => "dbt",
            BlockType::Scratchpad => "scratchpad",
            BlockType::Sensor => "sensor",
            BlockType::Transformer => "transformer",
        };
        write!(f, "{}", name)
    }
}

/// Source language of a block's content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BlockLanguage {
    #[default]
    Sql,
    Python,
    R,
    Yaml,
}

/// Free-form block configuration map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockConfiguration(pub Map<String, Value>);

impl BlockConfiguration {
    /// Create a configuration bound to a model file path
    pub fn for_file(file_path: impl Into<String>) -> Self {
        let mut map = Map::new();
        map.insert("file_path".to_string(), Value::String(file_path.into()));
        Self(map)
    }

    /// Read a string value, ignoring non-string entries
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Set a value
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// Model path relative to the repo's dbt folder, e.g. `demo/models/users.sql`
    pub fn file_path(&self) -> Option<&str> {
        self.get_str("file_path")
    }

    /// Profile target pinned on the block
    pub fn profile_target(&self) -> Option<&str> {
        self.get_str("dbt_profile_target").filter(|s| !s.is_empty())
    }

    /// Project name template used by free-form command blocks
    pub fn project_name(&self) -> Option<&str> {
        self.get_str("dbt_project_name")
    }

    /// Default verb configured under `dbt.command`
    pub fn command(&self) -> Option<&str> {
        self.0
            .get("dbt")
            .and_then(|v| v.get("command"))
            .and_then(Value::as_str)
    }
}

/// A pipeline block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub uuid: String,
    pub name: String,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    #[serde(default)]
    pub language: BlockLanguage,
    #[serde(default)]
    pub configuration: BlockConfiguration,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub upstream_blocks: Vec<Block>,
    /// Downstream block uuids
    #[serde(default)]
    pub downstream_blocks: Vec<String>,
    pub pipeline_uuid: String,
}

impl Block {
    /// Create a block with empty content and no neighbours
    pub fn new(
        uuid: impl Into<String>,
        block_type: BlockType,
        language: BlockLanguage,
        pipeline_uuid: impl Into<String>,
    ) -> Self {
        let uuid = uuid.into();
        Self {
            name: uuid.clone(),
            uuid,
            block_type,
            language,
            configuration: BlockConfiguration::default(),
            content: String::new(),
            upstream_blocks: Vec::new(),
            downstream_blocks: Vec::new(),
            pipeline_uuid: pipeline_uuid.into(),
        }
    }

    /// Builder-style configuration setter
    pub fn with_configuration(mut self, configuration: BlockConfiguration) -> Self {
        self.configuration = configuration;
        self
    }

    /// Builder-style content setter
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Model file path, failing when the block is not file backed
    pub fn require_file_path(&self) -> CoreResult<&str> {
        self.configuration
            .file_path()
            .ok_or_else(|| CoreError::MissingConfiguration {
                block: self.uuid.clone(),
                key: "file_path".to_string(),
            })
    }

    /// Table identifier this block's output is registered under in a source,
    /// `<pipeline_uuid>_<block_uuid>` after sanitising.
    pub fn source_table_name(&self) -> String {
        format!(
            "{}_{}",
            clean_name(&self.pipeline_uuid, &[]),
            clean_name(&self.uuid, &[])
        )
    }

    /// Upstream block uuids in order
    pub fn upstream_uuids(&self) -> Vec<&str> {
        self.upstream_blocks.iter().map(|b| b.uuid.as_str()).collect()
    }
}

/// Request to create a block inside a pipeline
#[derive(Debug, Clone)]
pub struct NewBlock {
    pub uuid: String,
    pub block_type: BlockType,
    pub language: BlockLanguage,
    pub configuration: BlockConfiguration,
}

/// Pipeline operations this crate needs from the orchestration layer
pub trait Pipeline {
    /// Pipeline identifier
    fn uuid(&self) -> &str;

    /// Look up an existing block by uuid and type
    fn get_block(&self, uuid: &str, block_type: BlockType) -> Option<Block>;

    /// Create and persist a new block
    fn create_block(&mut self, request: NewBlock) -> CoreResult<Block>;
}

/// In-memory pipeline used by the CLI and tests
#[derive(Debug, Default)]
pub struct MemoryPipeline {
    uuid: String,
    blocks: HashMap<(String, BlockType), Block>,
    created: Vec<String>,
}

impl MemoryPipeline {
    pub fn new(uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            ..Default::default()
        }
    }

    /// Register an existing block
    pub fn insert(&mut self, block: Block) {
        self.blocks
            .insert((block.uuid.clone(), block.block_type), block);
    }

    /// Uuids of blocks created through [`Pipeline::create_block`], in order
    pub fn created(&self) -> &[String] {
        &self.created
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl Pipeline for MemoryPipeline {
    fn uuid(&self) -> &str {
        &self.uuid
    }

    fn get_block(&self, uuid: &str, block_type: BlockType) -> Option<Block> {
        self.blocks.get(&(uuid.to_string(), block_type)).cloned()
    }

    fn create_block(&mut self, request: NewBlock) -> CoreResult<Block> {
        let key = (request.uuid.clone(), request.block_type);
        if self.blocks.contains_key(&key) {
            return Err(CoreError::BlockCreation {
                uuid: request.uuid,
                reason: "a block with this uuid already exists".to_string(),
            });
        }

        let block = Block::new(
            request.uuid,
            request.block_type,
            request.language,
            self.uuid.clone(),
        )
        .with_configuration(request.configuration);

        self.created.push(block.uuid.clone());
        self.blocks.insert(key, block.clone());
        Ok(block)
    }
}
