use std::sync::Arc;

use crate::driver::DriverError;

use super::{SqliteSession, run_blocking};

impl SqliteSession {
    /// Run a parameterless script (also used for BEGIN / COMMIT / ROLLBACK).
    pub(crate) async fn batch(&self, sql: &str) -> Result<(), DriverError> {
        let sql = sql.to_owned();
        run_blocking(self.conn_handle(), move |conn| {
            conn.execute_batch(&sql).map_err(DriverError::from)
        })
        .await
    }

    /// Close the underlying connection, rolling back anything still open.
    pub(crate) async fn shutdown(self) -> Result<(), DriverError> {
        let path = self.path;
        let Ok(mutex) = Arc::try_unwrap(self.conn) else {
            tracing::debug!(path = %path, "sqlite connection still shared; dropping handle");
            return Ok(());
        };
        let conn = mutex.into_inner();
        tokio::task::spawn_blocking(move || conn.close().map_err(|(_, err)| DriverError::from(err)))
            .await
            .map_err(|e| DriverError::other(format!("sqlite close join error: {e}")))?
    }
}
