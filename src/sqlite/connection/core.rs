use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::driver::{DriverError, ServerInfo};

pub(crate) type SharedSqliteConnection = Arc<Mutex<rusqlite::Connection>>;

/// One open `SQLite` database.
pub struct SqliteSession {
    pub(crate) conn: SharedSqliteConnection,
    pub(crate) path: String,
}

impl SqliteSession {
    pub(crate) fn new(conn: rusqlite::Connection, path: String) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        }
    }

    /// Run `func` against the raw connection on the blocking pool.
    ///
    /// # Errors
    /// Returns whatever `func` returns, or a `DriverError` if the blocking task panics.
    pub async fn with_connection<F, R>(&self, func: F) -> Result<R, DriverError>
    where
        F: FnOnce(&mut rusqlite::Connection) -> Result<R, DriverError> + Send + 'static,
        R: Send + 'static,
    {
        run_blocking(self.conn_handle(), func).await
    }

    pub(crate) fn conn_handle(&self) -> SharedSqliteConnection {
        Arc::clone(&self.conn)
    }

    pub(crate) async fn describe(&self) -> Result<ServerInfo, DriverError> {
        let pages: i64 = self
            .with_connection(|conn| {
                conn.query_row("PRAGMA page_count", [], |row| row.get(0))
                    .map_err(DriverError::from)
            })
            .await?;
        Ok(ServerInfo {
            server_info: rusqlite::version().to_string(),
            server_version: u64::try_from(rusqlite::version_number()).unwrap_or(0),
            stat: format!("Pages: {pages}"),
            host_info: format!("{} via sqlite", self.path),
        })
    }
}

impl fmt::Debug for SqliteSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteSession")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

pub(crate) async fn run_blocking<F, R>(
    conn: SharedSqliteConnection,
    func: F,
) -> Result<R, DriverError>
where
    F: FnOnce(&mut rusqlite::Connection) -> Result<R, DriverError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut guard = conn.blocking_lock();
        func(&mut guard)
    })
    .await
    .map_err(|e| DriverError::other(format!("sqlite spawn_blocking join error: {e}")))?
}
