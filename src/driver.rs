//! The seam between the helper and a concrete database driver.
//!
//! A [`Driver`] opens sessions; a [`Session`] is one live connection speaking a
//! prepare/execute protocol with `?` placeholders. Backends normalize their native
//! errors into [`DriverError`] using the mysqli client error codes below, so the
//! reconnect logic can classify failures the same way for every backend.

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::ConnectionParams;
use crate::params::Bindings;
use crate::types::SqlValue;

/// Client could not reach the server.
pub const CR_CONNECTION_ERROR: i64 = 2002;
/// Server went away between calls.
pub const CR_SERVER_GONE_ERROR: i64 = 2006;
/// Connection dropped during a call.
pub const CR_SERVER_LOST: i64 = 2013;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverError {
    pub code: Option<i64>,
    pub message: String,
}

impl DriverError {
    pub fn new(code: impl Into<Option<i64>>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// An error without a numeric code.
    pub fn other(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "[{code}] {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for DriverError {}

/// Session metadata captured after a successful connect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServerInfo {
    pub server_info: String,
    pub server_version: u64,
    pub stat: String,
    pub host_info: String,
}

/// Outcome of running one prepared statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Execution {
    /// Negative when the driver does not know.
    pub affected_rows: i64,
    pub last_insert_id: u64,
    /// `None` when the statement produced no result-set metadata.
    pub columns: Option<Vec<String>>,
    /// Rows in driver order, cells in column order.
    pub rows: Vec<Vec<SqlValue>>,
}

#[async_trait]
pub trait Driver: Send + Sync {
    type Session: Session;

    /// Open a new session with the given parameters.
    async fn connect(&self, params: &ConnectionParams) -> Result<Self::Session, DriverError>;
}

#[async_trait]
pub trait Session: Send + Sized + 'static {
    type Statement: Send;

    async fn set_charset(&mut self, charset: &str) -> Result<(), DriverError>;

    async fn server_info(&mut self) -> Result<ServerInfo, DriverError>;

    /// Compile `sql`; placeholders are `?` only.
    async fn prepare(&mut self, sql: &str) -> Result<Self::Statement, DriverError>;

    /// Bind `bindings` (possibly empty) and run the statement, fetching every row.
    async fn execute(
        &mut self,
        stmt: &mut Self::Statement,
        bindings: &Bindings,
    ) -> Result<Execution, DriverError>;

    /// Run one or more statements without parameters or results (DDL, setup scripts).
    async fn execute_batch(&mut self, sql: &str) -> Result<(), DriverError>;

    async fn begin(&mut self) -> Result<(), DriverError>;

    async fn commit(&mut self) -> Result<(), DriverError>;

    async fn rollback(&mut self) -> Result<(), DriverError>;

    /// Release the session.
    async fn close(self) -> Result<(), DriverError>;
}
