//! Error types for tb-db

use thiserror::Error;

/// Adapter, session and connector failures
#[derive(Error, Debug)]
pub enum DbError {
    /// The connector could not open a session (D001)
    #[error("[D001] Could not open warehouse session: {0}")]
    ConnectionError(String),

    /// A statement sent through a session failed (D002)
    #[error("[D002] Query failed: {0}")]
    ExecutionError(String),

    /// A statement referenced a relation the session does not know (D003)
    #[error("[D003] Relation not found: {0}")]
    TableNotFound(String),

    /// Profile target names a warehouse type without an adapter (D004)
    #[error("[D004] No adapter for warehouse type '{0}'")]
    UnknownWarehouse(String),

    /// Profile target lacks a field the adapter requires (D005)
    #[error("[D005] Profile target for {warehouse} is missing required field '{field}'")]
    MissingProfileField { warehouse: String, field: String },

    /// Another session panicked while holding the shared connection (D006)
    #[error("[D006] Shared connection is poisoned: {0}")]
    MutexPoisoned(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

/// Classify a DuckDB failure; missing relations are reported separately so
/// callers can tell an unmaterialized model from a broken query.
impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        let msg = err.to_string();
        let missing_relation = msg.contains("Catalog Error")
            && (msg.contains("does not exist") || msg.contains("not found"));
        if missing_relation || msg.contains("Table with name") {
            DbError::TableNotFound(msg)
        } else {
            DbError::ExecutionError(msg)
        }
    }
}
