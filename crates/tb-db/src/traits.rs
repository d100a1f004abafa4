//! Adapter, connector and session traits

use crate::config::{AdapterConfiguration, AdapterOptions, ConnectionConfig, WritePolicy};
use crate::error::DbResult;
use crate::profile::ProfileTarget;
use crate::result::QueryResult;
use async_trait::async_trait;
use tb_core::WarehouseType;

/// Data of an upstream block to be materialized before a model runs
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamTable {
    pub schema: String,
    pub table_name: String,
    pub data: QueryResult,
}

/// An open connection to a warehouse.
///
/// Sessions are acquired per operation and must be released with
/// [`release`] once the operation finishes, on success or failure.
#[async_trait]
pub trait WarehouseSession: Send + Sync {
    /// Warehouse this session talks to
    fn warehouse(&self) -> WarehouseType;

    /// Run a query and return up to `limit` rows
    async fn load(&self, query: &str, limit: Option<usize>) -> DbResult<QueryResult>;

    /// Materialize `schema.table` from a SELECT
    async fn create_table_as(
        &self,
        schema: &str,
        table: &str,
        select: &str,
        policy: WritePolicy,
    ) -> DbResult<()>;

    /// Write in-memory rows into `schema.table`
    async fn export(
        &self,
        schema: &str,
        table: &str,
        data: &QueryResult,
        policy: WritePolicy,
        cascade_on_drop: bool,
    ) -> DbResult<()>;

    /// Replace each upstream table with the given data
    async fn create_upstream_tables(
        &self,
        tables: &[UpstreamTable],
        cascade_on_drop: bool,
    ) -> DbResult<()> {
        for table in tables {
            log::debug!(
                "Creating upstream table {}.{} ({} rows)",
                table.schema,
                table.table_name,
                table.data.row_count()
            );
            self.export(
                &table.schema,
                &table.table_name,
                &table.data,
                WritePolicy::Replace,
                cascade_on_drop,
            )
            .await?;
        }
        Ok(())
    }

    /// Close the underlying connection
    async fn close(&self) -> DbResult<()>;
}

/// Opens sessions for a warehouse from a connection bag
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(
        &self,
        warehouse: WarehouseType,
        config: &ConnectionConfig,
    ) -> DbResult<Box<dyn WarehouseSession>>;
}

/// Per-warehouse mapping from a profile target to connection settings
#[async_trait]
pub trait WarehouseAdapter: Send + Sync {
    fn warehouse(&self) -> WarehouseType;

    /// Credential bag for the connector
    fn build_connection_config(&self, profile: &ProfileTarget) -> DbResult<ConnectionConfig>;

    /// Canonical `{warehouse, database, schema, write_policy}` record
    fn canonical_configuration(
        &self,
        profile: &ProfileTarget,
        options: &AdapterOptions,
    ) -> AdapterConfiguration;

    /// Whether dropping upstream tables cascades to dependent views
    fn cascade_on_drop(&self) -> bool {
        false
    }

    /// Acquire a session for this warehouse
    async fn scoped_session(
        &self,
        connector: &dyn Connector,
        config: &ConnectionConfig,
    ) -> DbResult<Box<dyn WarehouseSession>> {
        connector.connect(self.warehouse(), config).await
    }

    /// Run one query in its own session
    async fn load(
        &self,
        connector: &dyn Connector,
        config: &ConnectionConfig,
        query: &str,
        limit: Option<usize>,
    ) -> DbResult<QueryResult> {
        let session = self.scoped_session(connector, config).await?;
        let result = session.load(query, limit).await;
        release(session).await;
        result
    }
}

/// Close a session, logging instead of failing when closing errors
pub async fn release(session: Box<dyn WarehouseSession>) {
    if let Err(e) = session.close().await {
        log::warn!("Failed to close {} session: {}", session.warehouse(), e);
    }
}
