use crate::config::{ConnectionParams, ReconnectPolicy};
use crate::driver::{CR_CONNECTION_ERROR, Driver, DriverError, ServerInfo, Session};
use crate::error::SqlHelperError;

/// Lower-cased fragments of driver messages that mean the connection is gone.
pub static GONE_AWAY_SIGNATURES: [&str; 7] = [
    "server has gone away",
    "no connection to the server",
    "lost connection",
    "is dead or not enabled",
    "error while sending",
    "decryption failed or bad record mac",
    "ssl connection has been closed unexpectedly",
];

/// Heuristic, case-insensitive check for a lost or broken connection.
#[must_use]
pub fn is_gone_away(message: &str) -> bool {
    let message = message.to_lowercase();
    GONE_AWAY_SIGNATURES
        .iter()
        .any(|signature| message.contains(signature))
}

fn is_retryable_connect_error(err: &DriverError) -> bool {
    is_gone_away(&err.message) || err.code == Some(CR_CONNECTION_ERROR)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// Last connect failed; the next `ensure_connected` tries again.
    Failed,
}

/// Owns the single live session and re-establishes it after transient failures.
pub struct ConnectionManager<D: Driver> {
    driver: D,
    params: ConnectionParams,
    policy: ReconnectPolicy,
    session: Option<D::Session>,
    state: ConnectionState,
    reconnect_count: u32,
}

impl<D: Driver> std::fmt::Debug for ConnectionManager<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("host", &self.params.host)
            .field("db", &self.params.db)
            .field("policy", &self.policy)
            .field("state", &self.state)
            .field("reconnect_count", &self.reconnect_count)
            .finish_non_exhaustive()
    }
}

impl<D: Driver> ConnectionManager<D> {
    #[must_use]
    pub fn new(driver: D, params: ConnectionParams) -> Self {
        Self {
            driver,
            params,
            policy: ReconnectPolicy::default(),
            session: None,
            state: ConnectionState::Disconnected,
            reconnect_count: 0,
        }
    }

    #[must_use]
    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }

    #[must_use]
    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    pub fn policy_mut(&mut self) -> &mut ReconnectPolicy {
        &mut self.policy
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Retries spent by the connect in progress; zero once a connect succeeds.
    #[must_use]
    pub fn reconnect_count(&self) -> u32 {
        self.reconnect_count
    }

    #[must_use]
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Open a new session, replacing any existing one.
    ///
    /// Failures that look like a lost server (or the driver's can't-connect code) are
    /// retried up to `max_try` more times with a fixed sleep in between, when
    /// auto-reconnect is enabled. On success the configured charset is applied.
    ///
    /// # Errors
    /// Returns `SqlHelperError::ConnectionError` with the last driver failure.
    pub async fn connect(&mut self) -> Result<ServerInfo, SqlHelperError> {
        if let Some(stale) = self.session.take()
            && let Err(err) = stale.close().await
        {
            tracing::debug!(error = %err, "closing stale session failed");
        }
        self.state = ConnectionState::Connecting;

        let mut outcome = self.driver.connect(&self.params).await;
        let retry = match &outcome {
            Err(err) => self.policy.enabled && is_retryable_connect_error(err),
            Ok(_) => false,
        };
        if retry {
            self.reconnect_count = 0;
            while self.reconnect_count < self.policy.max_try {
                if let Err(err) = &outcome {
                    tracing::warn!(
                        attempt = self.reconnect_count + 1,
                        max_try = self.policy.max_try,
                        sleep = ?self.policy.sleep,
                        error = %err,
                        "connect failed, retrying"
                    );
                }
                tokio::time::sleep(self.policy.sleep).await;
                self.reconnect_count += 1;
                outcome = self.driver.connect(&self.params).await;
                if outcome.is_ok() {
                    break;
                }
            }
        }

        let mut session = match outcome {
            Ok(session) => session,
            Err(err) => {
                self.state = ConnectionState::Failed;
                tracing::warn!(error = %err, host = %self.params.host, "connect failed");
                return Err(SqlHelperError::ConnectionError(err));
            }
        };
        self.reconnect_count = 0;

        if let Err(err) = session.set_charset(&self.params.charset).await {
            tracing::warn!(charset = %self.params.charset, error = %err, "could not apply charset");
        }
        let info = match session.server_info().await {
            Ok(info) => info,
            Err(err) => {
                tracing::debug!(error = %err, "server info unavailable");
                ServerInfo::default()
            }
        };

        self.session = Some(session);
        self.state = ConnectionState::Connected;
        tracing::info!(
            host = %self.params.host,
            db = %self.params.db,
            server = %info.server_info,
            "connected"
        );
        Ok(info)
    }

    /// Connect unless a session is already open.
    ///
    /// # Errors
    /// Returns the `connect` failure.
    pub async fn ensure_connected(&mut self) -> Result<(), SqlHelperError> {
        if self.session.is_none() {
            self.connect().await?;
        }
        Ok(())
    }

    /// Release the session if there is one. Calling this twice is harmless.
    ///
    /// # Errors
    /// Returns `SqlHelperError::ConnectionError` if the driver fails to close cleanly;
    /// the session is dropped either way.
    pub async fn disconnect(&mut self) -> Result<(), SqlHelperError> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };
        self.state = ConnectionState::Disconnected;
        session
            .close()
            .await
            .map_err(SqlHelperError::ConnectionError)
    }

    /// # Errors
    /// Returns `SqlHelperError::NotConnected` when no session is open.
    pub fn session_mut(&mut self) -> Result<&mut D::Session, SqlHelperError> {
        self.session.as_mut().ok_or(SqlHelperError::NotConnected)
    }
}
