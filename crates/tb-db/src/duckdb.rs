//! DuckDB-backed connector
//!
//! Runs every warehouse's queries against one local DuckDB database, which is
//! what the CLI uses for offline previews and what the tests run against.

use crate::config::{ConnectionConfig, WritePolicy};
use crate::error::{DbError, DbResult};
use crate::result::QueryResult;
use crate::traits::{Connector, WarehouseSession};
use async_trait::async_trait;
use duckdb::types::ValueRef;
use duckdb::Connection;
use serde_json::Value;
use std::path::Path;
use std::sync::Mutex;
use tb_core::WarehouseType;

/// Connector handing out sessions on one DuckDB database
pub struct DuckDbConnector {
    root: Mutex<Connection>,
}

impl DuckDbConnector {
    /// Connector on a fresh in-memory database
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            root: Mutex::new(conn),
        })
    }

    /// Connector on a database file
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path).map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            root: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }
}

#[async_trait]
impl Connector for DuckDbConnector {
    async fn connect(
        &self,
        warehouse: WarehouseType,
        config: &ConnectionConfig,
    ) -> DbResult<Box<dyn WarehouseSession>> {
        log::debug!(
            "Opening local session for {} with settings {:?}",
            warehouse,
            config
        );
        let conn = self
            .root
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))?
            .try_clone()
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Box::new(DuckDbSession {
            conn: Mutex::new(conn),
            warehouse,
        }))
    }
}

/// Session on a cloned DuckDB connection
pub struct DuckDbSession {
    conn: Mutex<Connection>,
    warehouse: WarehouseType,
}

impl DuckDbSession {
    fn lock(&self) -> DbResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    fn execute_sync(&self, sql: &str) -> DbResult<usize> {
        let conn = self.lock()?;
        conn.execute(sql, [])
            .map_err(|e| DbError::ExecutionError(format!("{}: {}", e, sql)))
    }

    fn execute_batch_sync(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql)
            .map_err(|e| DbError::ExecutionError(e.to_string()))
    }

    fn relation_exists_sync(&self, schema: &str, table: &str) -> DbResult<bool> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = ? AND table_name = ?",
                [schema, table],
                |row| row.get(0),
            )
            .map_err(|e| DbError::ExecutionError(e.to_string()))?;
        Ok(count > 0)
    }

    fn load_sync(&self, query: &str, limit: Option<usize>) -> DbResult<QueryResult> {
        let query = query.trim().trim_end_matches(';');
        let sql = match limit {
            Some(n) => format!("SELECT * FROM ({}) AS _tb_load LIMIT {}", query, n),
            None => query.to_string(),
        };

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;

        // Column metadata is only valid after the statement has run
        let rows: Vec<Vec<Value>> = stmt
            .query_map([], |row| {
                let col_count = row.as_ref().column_count();
                Ok((0..col_count).map(|i| column_to_json(row, i)).collect())
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let columns: Vec<String> = (0..stmt.column_count())
            .map(|i| stmt.column_name(i).map_or("?".to_string(), |v| v.to_string()))
            .collect();

        Ok(QueryResult::new(columns, rows))
    }
}

#[async_trait]
impl WarehouseSession for DuckDbSession {
    fn warehouse(&self) -> WarehouseType {
        self.warehouse
    }

    async fn load(&self, query: &str, limit: Option<usize>) -> DbResult<QueryResult> {
        self.load_sync(query, limit)
    }

    async fn create_table_as(
        &self,
        schema: &str,
        table: &str,
        select: &str,
        policy: WritePolicy,
    ) -> DbResult<()> {
        self.execute_sync(&format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(schema)))?;
        let name = qualified(schema, table);
        let select = select.trim().trim_end_matches(';');

        let sql = match policy {
            WritePolicy::Replace => format!("CREATE OR REPLACE TABLE {} AS {}", name, select),
            WritePolicy::Fail => format!("CREATE TABLE {} AS {}", name, select),
            WritePolicy::Append if self.relation_exists_sync(schema, table)? => {
                format!("INSERT INTO {} {}", name, select)
            }
            WritePolicy::Append => format!("CREATE TABLE {} AS {}", name, select),
        };
        self.execute_sync(&sql)?;
        Ok(())
    }

    async fn export(
        &self,
        schema: &str,
        table: &str,
        data: &QueryResult,
        policy: WritePolicy,
        cascade_on_drop: bool,
    ) -> DbResult<()> {
        self.execute_sync(&format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(schema)))?;
        let name = qualified(schema, table);
        let exists = self.relation_exists_sync(schema, table)?;

        match policy {
            WritePolicy::Fail if exists => {
                return Err(DbError::ExecutionError(format!(
                    "table {} already exists",
                    name
                )));
            }
            WritePolicy::Replace if exists => {
                let cascade = if cascade_on_drop { " CASCADE" } else { "" };
                self.execute_sync(&format!("DROP TABLE IF EXISTS {}{}", name, cascade))?;
            }
            _ => {}
        }

        if !exists || policy == WritePolicy::Replace {
            let columns: Vec<String> = data
                .columns
                .iter()
                .enumerate()
                .map(|(idx, col)| format!("{} {}", quote_ident(col), infer_column_type(data, idx)))
                .collect();
            self.execute_sync(&format!("CREATE TABLE {} ({})", name, columns.join(", ")))?;
        }

        if data.rows.is_empty() {
            return Ok(());
        }

        let values: Vec<String> = data
            .rows
            .iter()
            .map(|row| {
                let literals: Vec<String> = row.iter().map(sql_literal).collect();
                format!("({})", literals.join(", "))
            })
            .collect();
        self.execute_batch_sync(&format!("INSERT INTO {} VALUES {};", name, values.join(", ")))
    }

    async fn close(&self) -> DbResult<()> {
        // The connection is dropped with the session; only check it is usable
        self.lock().map(|_| ())
    }
}

/// Read a column as JSON, keeping numeric and boolean types
fn column_to_json(row: &duckdb::Row<'_>, idx: usize) -> Value {
    match row.get_ref(idx) {
        Ok(ValueRef::Null) => Value::Null,
        Ok(ValueRef::Boolean(b)) => Value::Bool(b),
        Ok(ValueRef::TinyInt(n)) => Value::from(n),
        Ok(ValueRef::SmallInt(n)) => Value::from(n),
        Ok(ValueRef::Int(n)) => Value::from(n),
        Ok(ValueRef::BigInt(n)) => Value::from(n),
        Ok(ValueRef::UTinyInt(n)) => Value::from(n),
        Ok(ValueRef::USmallInt(n)) => Value::from(n),
        Ok(ValueRef::UInt(n)) => Value::from(n),
        Ok(ValueRef::UBigInt(n)) => Value::from(n),
        Ok(ValueRef::Float(f)) => Value::from(f64::from(f)),
        Ok(ValueRef::Double(f)) => Value::from(f),
        Ok(ValueRef::Text(bytes)) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        _ => {
            if let Ok(Some(s)) = row.get::<_, Option<String>>(idx) {
                return Value::String(s);
            }
            if let Ok(Some(f)) = row.get::<_, Option<f64>>(idx) {
                return Value::from(f);
            }
            Value::Null
        }
    }
}

/// Column type from the first non-null value of a column
fn infer_column_type(data: &QueryResult, idx: usize) -> &'static str {
    let first = data
        .rows
        .iter()
        .filter_map(|row| row.get(idx))
        .find(|v| !v.is_null());
    match first {
        Some(Value::Bool(_)) => "BOOLEAN",
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => "BIGINT",
        Some(Value::Number(_)) => "DOUBLE",
        _ => "VARCHAR",
    }
}

fn sql_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote_literal(s),
        other => quote_literal(&other.to_string()),
    }
}

fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn qualified(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(table))
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
