use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::driver::{DriverError, ServerInfo};
use crate::error::SqlHelperError;
use crate::params::Bindings;
use crate::results::Row;

fn as_seconds<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

/// Outcome of one `connect` or `query` call.
///
/// Failures are reported here as data: `state` is false and `error` / `errorno`
/// carry the reason.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Response {
    pub state: bool,
    pub numrows: usize,
    pub result: Vec<Row>,
    pub affected_rows: u64,
    pub error: Option<String>,
    pub errorno: Option<i64>,
    /// SQL as sent to the driver, after placeholder rewriting
    pub sql: String,
    pub sql_original: String,
    pub params: Option<Bindings>,
    /// Zero when tracing is disabled
    #[serde(serialize_with = "as_seconds")]
    pub duration: Duration,
    pub last_insert_id: u64,
    pub server_info: Option<ServerInfo>,
}

impl Response {
    pub(crate) fn for_sql(sql: &str) -> Self {
        Self {
            sql: sql.to_owned(),
            sql_original: sql.to_owned(),
            ..Self::default()
        }
    }

    pub(crate) fn from_error(err: &SqlHelperError) -> Self {
        let mut response = Self::default();
        response.fail(err);
        response
    }

    pub(crate) fn fail(&mut self, err: &SqlHelperError) {
        self.state = false;
        self.error = Some(err.message());
        self.errorno = err.code();
    }

    /// First row, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Row> {
        self.result.first()
    }

    /// Convert a failed response into an error.
    ///
    /// # Errors
    /// Returns `SqlHelperError::ExecutionError` carrying `errorno` / `error` when
    /// `state` is false.
    pub fn into_result(self) -> Result<Self, SqlHelperError> {
        if self.state {
            Ok(self)
        } else {
            Err(SqlHelperError::ExecutionError(DriverError::new(
                self.errorno,
                self.error.unwrap_or_default(),
            )))
        }
    }
}
