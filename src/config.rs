use std::time::Duration;

use serde::Deserialize;

use crate::error::SqlHelperError;

fn default_port() -> u16 {
    3306
}

fn default_charset() -> String {
    "utf8".to_string()
}

fn default_trace() -> bool {
    true
}

/// Parameters used for every connect and reconnect of a session.
///
/// Deserializes from the construction mapping; missing `port`, `charset`, `socket`
/// and `trace` fall back to 3306, `"utf8"`, none and enabled.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectionParams {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub pwd: String,
    #[serde(default)]
    pub db: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_charset")]
    pub charset: String,
    #[serde(default)]
    pub socket: Option<String>,
    #[serde(default = "default_trace")]
    pub trace: bool,
}

impl ConnectionParams {
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        pwd: impl Into<String>,
        db: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
            pwd: pwd.into(),
            db: db.into(),
            port: default_port(),
            charset: default_charset(),
            socket: None,
            trace: default_trace(),
        }
    }

    #[must_use]
    pub fn builder(db: impl Into<String>) -> ConnectionParamsBuilder {
        ConnectionParamsBuilder::new(db)
    }

    /// Build from a JSON object such as
    /// `{"host": "db", "user": "app", "pwd": "secret", "db": "shop", "trace": false}`.
    ///
    /// # Errors
    /// Returns `SqlHelperError::ConfigError` if the value is not an object of the
    /// recognized keys.
    pub fn from_json(value: serde_json::Value) -> Result<Self, SqlHelperError> {
        if !value.is_object() {
            return Err(SqlHelperError::ConfigError(format!(
                "connection parameters must be an object, got {value}"
            )));
        }
        serde_json::from_value(value).map_err(|e| SqlHelperError::ConfigError(e.to_string()))
    }
}

/// Fluent builder for `ConnectionParams`.
#[derive(Debug, Clone)]
pub struct ConnectionParamsBuilder {
    params: ConnectionParams,
}

impl ConnectionParamsBuilder {
    #[must_use]
    pub fn new(db: impl Into<String>) -> Self {
        Self {
            params: ConnectionParams::new("localhost", "", "", db),
        }
    }

    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.params.host = host.into();
        self
    }

    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.params.user = user.into();
        self
    }

    #[must_use]
    pub fn pwd(mut self, pwd: impl Into<String>) -> Self {
        self.params.pwd = pwd.into();
        self
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.params.port = port;
        self
    }

    #[must_use]
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.params.charset = charset.into();
        self
    }

    #[must_use]
    pub fn socket(mut self, socket: Option<String>) -> Self {
        self.params.socket = socket;
        self
    }

    #[must_use]
    pub fn trace(mut self, trace: bool) -> Self {
        self.params.trace = trace;
        self
    }

    #[must_use]
    pub fn finish(self) -> ConnectionParams {
        self.params
    }
}

/// How connect failures that look like a lost server are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub enabled: bool,
    /// Retries after the initial attempt.
    pub max_try: u32,
    pub sleep: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            max_try: 5,
            sleep: Duration::from_secs(3),
        }
    }
}
