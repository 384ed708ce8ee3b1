use async_trait::async_trait;
use mysql_async::prelude::*;
use mysql_async::{Conn, Opts, OptsBuilder, Params, Row};

use crate::config::ConnectionParams;
use crate::driver::{Driver, DriverError, Execution, ServerInfo, Session};
use crate::params::Bindings;

use super::driver_error;
use super::params::{bound_to_mysql_value, mysql_value_to_sql_value};

/// Opens one `mysql_async` connection per session.
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlDriver;

pub struct MysqlSession {
    conn: Conn,
    host_info: String,
}

impl std::fmt::Debug for MysqlSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MysqlSession")
            .field("host_info", &self.host_info)
            .finish_non_exhaustive()
    }
}

fn build_opts(params: &ConnectionParams) -> Opts {
    let mut builder = OptsBuilder::default()
        .ip_or_hostname(params.host.clone())
        .tcp_port(params.port)
        .socket(params.socket.clone());
    if !params.user.is_empty() {
        builder = builder.user(Some(params.user.clone()));
    }
    if !params.pwd.is_empty() {
        builder = builder.pass(Some(params.pwd.clone()));
    }
    if !params.db.is_empty() {
        builder = builder.db_name(Some(params.db.clone()));
    }
    builder.into()
}

#[async_trait]
impl Driver for MysqlDriver {
    type Session = MysqlSession;

    async fn connect(&self, params: &ConnectionParams) -> Result<MysqlSession, DriverError> {
        tracing::debug!(host = %params.host, port = params.port, db = %params.db, "connecting to MySQL");
        let conn = Conn::new(build_opts(params))
            .await
            .map_err(|e| driver_error(&e, true))?;
        let host_info = match &params.socket {
            Some(socket) => format!("Localhost via UNIX socket {socket}"),
            None => format!("{} via TCP/IP", params.host),
        };
        Ok(MysqlSession { conn, host_info })
    }
}

#[async_trait]
impl Session for MysqlSession {
    type Statement = mysql_async::Statement;

    async fn set_charset(&mut self, charset: &str) -> Result<(), DriverError> {
        if charset.is_empty()
            || !charset
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_')
        {
            return Err(DriverError::other(format!("invalid charset name: {charset}")));
        }
        self.conn
            .query_drop(format!("SET NAMES {charset}"))
            .await
            .map_err(DriverError::from)
    }

    async fn server_info(&mut self) -> Result<ServerInfo, DriverError> {
        let (major, minor, patch) = self.conn.server_version();
        let uptime: Option<(String, String)> = self
            .conn
            .query_first("SHOW GLOBAL STATUS LIKE 'Uptime'")
            .await?;
        Ok(ServerInfo {
            server_info: format!("{major}.{minor}.{patch}"),
            server_version: u64::from(major) * 10_000 + u64::from(minor) * 100 + u64::from(patch),
            stat: uptime.map_or_else(String::new, |(_, secs)| format!("Uptime: {secs}")),
            host_info: self.host_info.clone(),
        })
    }

    async fn prepare(&mut self, sql: &str) -> Result<mysql_async::Statement, DriverError> {
        self.conn.prep(sql).await.map_err(DriverError::from)
    }

    async fn execute(
        &mut self,
        stmt: &mut mysql_async::Statement,
        bindings: &Bindings,
    ) -> Result<Execution, DriverError> {
        let params = if bindings.is_empty() {
            Params::Empty
        } else {
            Params::Positional(bindings.iter().map(bound_to_mysql_value).collect())
        };

        let mut result = self.conn.exec_iter(&*stmt, params).await?;
        let columns: Option<Vec<String>> = result
            .columns()
            .filter(|columns| !columns.is_empty())
            .map(|columns| columns.iter().map(|c| c.name_str().into_owned()).collect());
        let fetched: Vec<Row> = result.collect().await?;
        let affected_rows = i64::try_from(result.affected_rows()).unwrap_or(i64::MAX);
        let last_insert_id = result.last_insert_id().unwrap_or(0);
        result.drop_result().await?;

        let rows = fetched
            .into_iter()
            .map(|row| Row::unwrap(row).into_iter().map(mysql_value_to_sql_value).collect())
            .collect();

        Ok(Execution {
            affected_rows,
            last_insert_id,
            columns,
            rows,
        })
    }

    async fn execute_batch(&mut self, sql: &str) -> Result<(), DriverError> {
        self.conn.query_drop(sql).await.map_err(DriverError::from)
    }

    async fn begin(&mut self) -> Result<(), DriverError> {
        self.conn
            .query_drop("START TRANSACTION")
            .await
            .map_err(DriverError::from)
    }

    async fn commit(&mut self) -> Result<(), DriverError> {
        self.conn.query_drop("COMMIT").await.map_err(DriverError::from)
    }

    async fn rollback(&mut self) -> Result<(), DriverError> {
        self.conn.query_drop("ROLLBACK").await.map_err(DriverError::from)
    }

    async fn close(self) -> Result<(), DriverError> {
        self.conn.disconnect().await.map_err(DriverError::from)
    }
}
