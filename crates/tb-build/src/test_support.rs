//! Throwaway repo layouts for unit tests

use crate::context::BuildContext;
use std::path::PathBuf;
use tb_core::{Block, BlockConfiguration, BlockLanguage, BlockType};
use tempfile::TempDir;

pub(crate) const PROJECT_SETTINGS: &str = r#"
name: demo_project
profile: demo
snapshot-paths: ["snapshots"]
target-path: target
models:
  demo_project:
    +schema: core
    marts:
      schema: marts
      database: warehouse
"#;

pub(crate) const PROFILES: &str = r#"
demo:
  target: dev
  outputs:
    dev:
      type: postgres
      dbname: analytics
      host: localhost
      port: 5432
      schema: public
      user: "{{ env_var('TB_TEST_UNSET_USER', 'tester') }}"
    warehouse:
      type: mysql
      schema: shop
      server: localhost
"#;

/// A repo with one dbt project at `dbt/demo`
pub(crate) struct Fixture {
    pub dir: TempDir,
    pub ctx: BuildContext,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_files(PROJECT_SETTINGS, PROFILES)
    }

    pub fn with_files(settings: &str, profiles: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let ctx = BuildContext::new(dir.path());
        let fixture = Self { dir, ctx };
        fixture.write("demo/dbt_project.yml", settings);
        fixture.write("demo/profiles.yml", profiles);
        fixture
    }

    /// `<repo>/dbt/demo`
    pub fn project(&self) -> PathBuf {
        self.ctx.project_path("demo")
    }

    /// Write a file relative to `<repo>/dbt`
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.ctx.dbt_root().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    /// A dbt SQL block bound to `file_path` inside pipeline `etl`
    pub fn model(&self, file_path: &str, content: &str) -> Block {
        let uuid = tb_core::names::remove_extension(file_path).to_string();
        Block::new(uuid, BlockType::Dbt, BlockLanguage::Sql, "etl")
            .with_configuration(BlockConfiguration::for_file(file_path))
            .with_content(content)
    }

    /// Write a model file and return its block
    pub fn add_model(&self, file_path: &str, content: &str) -> Block {
        self.write(file_path, content);
        self.model(file_path, content)
    }
}
