use thiserror::Error;

use crate::driver::DriverError;
use crate::translation::ParseError;

#[derive(Debug, Error)]
pub enum SqlHelperError {
    #[error(transparent)]
    ParseError(#[from] ParseError),

    #[error("Connection error: {0}")]
    ConnectionError(DriverError),

    #[error("Prepare error: {0}")]
    PrepareError(DriverError),

    #[error("SQL execution error: {0}")]
    ExecutionError(DriverError),

    #[error("{0}")]
    MetadataError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Not connected")]
    NotConnected,
}

impl SqlHelperError {
    /// Numeric driver code, when the failure came from the driver.
    #[must_use]
    pub fn code(&self) -> Option<i64> {
        match self {
            SqlHelperError::ConnectionError(e)
            | SqlHelperError::PrepareError(e)
            | SqlHelperError::ExecutionError(e) => e.code,
            _ => None,
        }
    }

    /// Error text as surfaced in a `Response`: the bare driver message for driver
    /// failures, the display form otherwise.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            SqlHelperError::ConnectionError(e)
            | SqlHelperError::PrepareError(e)
            | SqlHelperError::ExecutionError(e) => e.message.clone(),
            other => other.to_string(),
        }
    }
}
