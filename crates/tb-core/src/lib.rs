//! tb-core - Core library for Tributary
//!
//! This crate provides the block and pipeline abstractions, project settings,
//! the source registry and its on-disk store, `ref()`/`source()`/`config()`
//! extraction, pipeline variables and the block dependency graph shared by
//! the other Tributary crates.

pub mod block;
pub mod dag;
pub mod error;
pub mod extract;
pub mod names;
pub mod project;
pub mod registry;
pub mod store;
pub mod variables;
pub mod warehouse;

pub use block::{Block, BlockConfiguration, BlockLanguage, BlockType, MemoryPipeline, NewBlock, Pipeline};
pub use dag::BlockDag;
pub use error::{CoreError, CoreResult};
pub use extract::{extract_refs, extract_sources, ModelConfig};
pub use project::{ProjectSettings, PROJECT_SETTINGS_FILE};
pub use registry::{RegistrySource, RegistryTable, SourceRegistry, REGISTRY_FILE};
pub use store::{FsProjectStore, ProjectStore};
pub use variables::{RuntimeBlockConfiguration, Variables, RUNTIME_VARIABLES_KEY};
pub use warehouse::WarehouseType;
