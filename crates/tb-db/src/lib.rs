//! tb-db - Warehouse adapter layer for Tributary
//!
//! This crate maps profile targets onto the nine supported warehouses
//! through the [`WarehouseAdapter`] trait and runs queries through sessions
//! opened by a [`Connector`]. [`DuckDbConnector`] executes everything
//! against a local DuckDB database.

pub mod adapters;
pub mod config;
pub mod duckdb;
pub mod error;
pub mod profile;
pub mod result;
pub mod traits;

pub use adapters::adapter_for;
pub use config::{AdapterConfiguration, AdapterOptions, ConnectionConfig, WritePolicy};
pub use crate::duckdb::{DuckDbConnector, DuckDbSession};
pub use error::{DbError, DbResult};
pub use profile::ProfileTarget;
pub use result::QueryResult;
pub use traits::{release, Connector, UpstreamTable, WarehouseAdapter, WarehouseSession};
