// SQLite backend
//
// - connection: session handle, blocking bridge, prepare/execute, transactions
// - params: bound parameters to rusqlite values
// - query: fetching rows into an `Execution`

mod connection;
mod params;
mod query;

use async_trait::async_trait;
use rusqlite::ErrorCode;

use crate::config::ConnectionParams;
use crate::driver::{CR_CONNECTION_ERROR, Driver, DriverError};

pub use connection::{SqliteSession, SqliteStatement};
pub use params::bound_to_sqlite_value;
pub use query::sqlite_extract_value_sync;

/// Opens `SQLite` sessions; `ConnectionParams::db` is the database path.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDriver;

#[async_trait]
impl Driver for SqliteDriver {
    type Session = SqliteSession;

    async fn connect(&self, params: &ConnectionParams) -> Result<SqliteSession, DriverError> {
        let path = params.db.clone();
        let open_path = path.clone();
        let conn = tokio::task::spawn_blocking(move || rusqlite::Connection::open(open_path))
            .await
            .map_err(|e| {
                DriverError::new(CR_CONNECTION_ERROR, format!("sqlite open join error: {e}"))
            })?
            .map_err(open_error)?;
        tracing::debug!(path = %path, "opened sqlite database");
        Ok(SqliteSession::new(conn, path))
    }
}

/// Failing to open the file is this backend's "can't connect".
fn open_error(err: rusqlite::Error) -> DriverError {
    match &err {
        rusqlite::Error::SqliteFailure(code, _) if code.code == ErrorCode::CannotOpen => {
            DriverError::new(CR_CONNECTION_ERROR, err.to_string())
        }
        _ => DriverError::from(err),
    }
}

impl From<rusqlite::Error> for DriverError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _) => {
                DriverError::new(i64::from(code.extended_code), err.to_string())
            }
            _ => DriverError::other(err.to_string()),
        }
    }
}
