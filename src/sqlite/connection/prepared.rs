use std::sync::Arc;

use async_trait::async_trait;

use crate::driver::{DriverError, Execution, ServerInfo, Session};
use crate::params::Bindings;
use crate::sqlite::params::bound_to_sqlite_value;
use crate::sqlite::query::run_statement;

use super::{SqliteSession, run_blocking};

/// A statement compiled into the connection's statement cache.
#[derive(Debug, Clone)]
pub struct SqliteStatement {
    sql: Arc<String>,
    column_count: usize,
}

impl SqliteStatement {
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.column_count
    }
}

#[async_trait]
impl Session for SqliteSession {
    type Statement = SqliteStatement;

    async fn set_charset(&mut self, charset: &str) -> Result<(), DriverError> {
        let encoding = match charset.to_ascii_lowercase().as_str() {
            "utf8" | "utf8mb4" | "utf-8" => "UTF-8",
            "utf16" | "utf-16" => "UTF-16",
            other => {
                return Err(DriverError::other(format!(
                    "unsupported sqlite charset: {other}"
                )));
            }
        };
        run_blocking(self.conn_handle(), move |conn| {
            conn.execute_batch(&format!("PRAGMA encoding = '{encoding}';"))
                .map_err(DriverError::from)
        })
        .await
    }

    async fn server_info(&mut self) -> Result<ServerInfo, DriverError> {
        self.describe().await
    }

    async fn prepare(&mut self, sql: &str) -> Result<SqliteStatement, DriverError> {
        let sql = Arc::new(sql.to_owned());
        let compile = Arc::clone(&sql);
        let column_count = run_blocking(self.conn_handle(), move |conn| {
            let stmt = conn.prepare_cached(&compile)?;
            Ok(stmt.column_count())
        })
        .await?;
        Ok(SqliteStatement { sql, column_count })
    }

    async fn execute(
        &mut self,
        stmt: &mut SqliteStatement,
        bindings: &Bindings,
    ) -> Result<Execution, DriverError> {
        let sql = Arc::clone(&stmt.sql);
        let values: Vec<rusqlite::types::Value> =
            bindings.iter().map(bound_to_sqlite_value).collect();
        run_blocking(self.conn_handle(), move |conn| run_statement(conn, &sql, &values)).await
    }

    async fn execute_batch(&mut self, sql: &str) -> Result<(), DriverError> {
        self.batch(sql).await
    }

    async fn begin(&mut self) -> Result<(), DriverError> {
        self.batch("BEGIN").await
    }

    async fn commit(&mut self) -> Result<(), DriverError> {
        self.batch("COMMIT").await
    }

    async fn rollback(&mut self) -> Result<(), DriverError> {
        self.batch("ROLLBACK").await
    }

    async fn close(self) -> Result<(), DriverError> {
        self.shutdown().await
    }
}
