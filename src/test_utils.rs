//! A scripted in-memory driver for exercising connect, prepare and execute paths
//! without a database server.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::config::ConnectionParams;
use crate::driver::{Driver, DriverError, Execution, ServerInfo, Session};
use crate::params::Bindings;

/// What the scripted driver will do next, and what it has been asked to do so far.
#[derive(Debug, Default)]
pub struct Script {
    /// Failures returned by the next `connect` calls, front first.
    pub connect_failures: VecDeque<DriverError>,
    /// Failures returned by the next `prepare` calls, front first.
    pub prepare_failures: VecDeque<DriverError>,
    /// Results of the next `execute` calls; an empty queue yields a bare DML outcome.
    pub executions: VecDeque<Result<Execution, DriverError>>,
    pub connect_attempts: usize,
    pub sessions_opened: usize,
    pub sessions_closed: usize,
    pub charsets: Vec<String>,
    pub prepared: Vec<String>,
    pub executed: Vec<(String, Bindings)>,
    pub batches: Vec<String>,
    pub transactions: Vec<&'static str>,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedDriver {
    script: Arc<Mutex<Script>>,
}

impl ScriptedDriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the script for inspection or to queue more behaviour.
    pub fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn fail_connect(&self, times: usize, err: DriverError) {
        let mut script = self.script();
        for _ in 0..times {
            script.connect_failures.push_back(err.clone());
        }
    }

    pub fn fail_prepare(&self, err: DriverError) {
        self.script().prepare_failures.push_back(err);
    }

    pub fn push_execution(&self, outcome: Result<Execution, DriverError>) {
        self.script().executions.push_back(outcome);
    }
}

#[derive(Debug)]
pub struct ScriptedSession {
    script: Arc<Mutex<Script>>,
    id: usize,
}

impl ScriptedSession {
    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A statement "compiled" by the scripted session.
#[derive(Debug, Clone)]
pub struct ScriptedStatement {
    pub sql: String,
    pub session: usize,
}

#[async_trait]
impl Driver for ScriptedDriver {
    type Session = ScriptedSession;

    async fn connect(&self, _params: &ConnectionParams) -> Result<ScriptedSession, DriverError> {
        let mut script = self.script();
        script.connect_attempts += 1;
        if let Some(err) = script.connect_failures.pop_front() {
            return Err(err);
        }
        script.sessions_opened += 1;
        Ok(ScriptedSession {
            script: Arc::clone(&self.script),
            id: script.sessions_opened,
        })
    }
}

#[async_trait]
impl Session for ScriptedSession {
    type Statement = ScriptedStatement;

    async fn set_charset(&mut self, charset: &str) -> Result<(), DriverError> {
        self.script().charsets.push(charset.to_owned());
        Ok(())
    }

    async fn server_info(&mut self) -> Result<ServerInfo, DriverError> {
        Ok(ServerInfo {
            server_info: "scripted".to_string(),
            server_version: 1,
            stat: format!("session: {}", self.id),
            host_info: "in-memory".to_string(),
        })
    }

    async fn prepare(&mut self, sql: &str) -> Result<ScriptedStatement, DriverError> {
        let mut script = self.script();
        script.prepared.push(sql.to_owned());
        if let Some(err) = script.prepare_failures.pop_front() {
            return Err(err);
        }
        Ok(ScriptedStatement {
            sql: sql.to_owned(),
            session: self.id,
        })
    }

    async fn execute(
        &mut self,
        stmt: &mut ScriptedStatement,
        bindings: &Bindings,
    ) -> Result<Execution, DriverError> {
        let mut script = self.script();
        script.executed.push((stmt.sql.clone(), bindings.clone()));
        script.executions.pop_front().unwrap_or(Ok(Execution {
            affected_rows: 1,
            ..Execution::default()
        }))
    }

    async fn execute_batch(&mut self, sql: &str) -> Result<(), DriverError> {
        self.script().batches.push(sql.to_owned());
        Ok(())
    }

    async fn begin(&mut self) -> Result<(), DriverError> {
        self.script().transactions.push("begin");
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), DriverError> {
        self.script().transactions.push("commit");
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), DriverError> {
        self.script().transactions.push("rollback");
        Ok(())
    }

    async fn close(self) -> Result<(), DriverError> {
        self.script().sessions_closed += 1;
        Ok(())
    }
}
