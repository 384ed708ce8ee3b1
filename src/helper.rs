use std::time::Duration;

use crate::config::ConnectionParams;
use crate::connection::ConnectionManager;
use crate::driver::{Driver, Session};
use crate::error::SqlHelperError;
use crate::response::Response;

/// A single database session with placeholder rewriting and transparent reconnect.
///
/// The session is opened lazily by the first `query`, `begin` or `execute_batch`.
/// One caller at a time: every stateful call takes `&mut self`.
///
/// ```rust,no_run
/// use sql_helper::prelude::*;
///
/// # async fn demo() -> Result<(), SqlHelperError> {
/// let params = ConnectionParams::builder("app.db").finish();
/// let mut db = SqlHelper::new(SqliteDriver, params);
/// db.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)").await?;
///
/// let res = db
///     .query("INSERT INTO t (name) VALUES (:name)", QueryArgs::new().bind("name", "alice"))
///     .await;
/// assert!(res.state);
///
/// let res = db.query("SELECT id, name FROM t WHERE id = ?", vec![SqlValue::Int(1)]).await;
/// assert_eq!(res.numrows, 1);
/// # Ok(()) }
/// ```
#[derive(Debug)]
pub struct SqlHelper<D: Driver> {
    pub(crate) conn: ConnectionManager<D>,
    pub(crate) trace_enabled: bool,
    pub(crate) lower_table_fields: bool,
}

impl<D: Driver> SqlHelper<D> {
    #[must_use]
    pub fn new(driver: D, params: ConnectionParams) -> Self {
        let trace_enabled = params.trace;
        Self {
            conn: ConnectionManager::new(driver, params),
            trace_enabled,
            lower_table_fields: true,
        }
    }

    /// Build from the JSON construction mapping (`host`, `user`, `pwd`, `db`, `port`,
    /// `charset`, `socket`, `trace`).
    ///
    /// # Errors
    /// Returns `SqlHelperError::ConfigError` if the mapping cannot be read.
    pub fn from_json(driver: D, params: serde_json::Value) -> Result<Self, SqlHelperError> {
        Ok(Self::new(driver, ConnectionParams::from_json(params)?))
    }

    /// Open (or reopen) the session. `server_info` is filled in on success.
    pub async fn connect(&mut self) -> Response {
        match self.conn.connect().await {
            Ok(info) => Response {
                state: true,
                server_info: Some(info),
                ..Response::default()
            },
            Err(err) => Response::from_error(&err),
        }
    }

    /// Close the session if open.
    ///
    /// # Errors
    /// Returns `SqlHelperError::ConnectionError` if the driver fails to close cleanly.
    pub async fn disconnect(&mut self) -> Result<(), SqlHelperError> {
        self.conn.disconnect().await
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.conn.is_connected()
    }

    #[must_use]
    pub fn connection(&self) -> &ConnectionManager<D> {
        &self.conn
    }

    /// Run a parameterless script, connecting first if needed.
    ///
    /// # Errors
    /// Returns `SqlHelperError` if connecting or executing fails.
    pub async fn execute_batch(&mut self, sql: &str) -> Result<(), SqlHelperError> {
        self.conn.ensure_connected().await?;
        self.conn
            .session_mut()?
            .execute_batch(sql)
            .await
            .map_err(SqlHelperError::ExecutionError)
    }

    /// Start a transaction, connecting first if needed.
    ///
    /// # Errors
    /// Returns `SqlHelperError` if connecting or starting the transaction fails.
    pub async fn begin(&mut self) -> Result<(), SqlHelperError> {
        self.conn.ensure_connected().await?;
        self.conn
            .session_mut()?
            .begin()
            .await
            .map_err(SqlHelperError::ExecutionError)
    }

    /// # Errors
    /// Returns `SqlHelperError::NotConnected` without a session, or the driver failure.
    pub async fn commit(&mut self) -> Result<(), SqlHelperError> {
        self.conn
            .session_mut()?
            .commit()
            .await
            .map_err(SqlHelperError::ExecutionError)
    }

    /// # Errors
    /// Returns `SqlHelperError::NotConnected` without a session, or the driver failure.
    pub async fn rollback(&mut self) -> Result<(), SqlHelperError> {
        self.conn
            .session_mut()?
            .rollback()
            .await
            .map_err(SqlHelperError::ExecutionError)
    }

    pub fn set_trace_enabled(&mut self, trace_enabled: bool) {
        self.trace_enabled = trace_enabled;
    }

    pub fn set_auto_reconnect(&mut self, auto_reconnect: bool) {
        self.conn.policy_mut().enabled = auto_reconnect;
    }

    pub fn set_auto_reconnect_max_try(&mut self, max_try: u32) {
        self.conn.policy_mut().max_try = max_try;
    }

    pub fn set_auto_reconnect_sleep(&mut self, sleep: Duration) {
        self.conn.policy_mut().sleep = sleep;
    }

    pub fn set_lower_table_fields(&mut self, lower_table_fields: bool) {
        self.lower_table_fields = lower_table_fields;
    }
}
