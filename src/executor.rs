use std::sync::LazyLock;
use std::time::{Duration, Instant};

use regex::Regex;

use crate::connection::is_gone_away;
use crate::driver::{Driver, Execution, Session};
use crate::error::SqlHelperError;
use crate::helper::SqlHelper;
use crate::params::{Bindings, QueryArgs, bind_parameters};
use crate::response::Response;
use crate::results::{build_rows, dedupe_column_names};
use crate::translation::parse_placeholders;

type Statement<D> = <<D as Driver>::Session as Session>::Statement;

/// Statements that legitimately come back without result-set metadata.
static NO_RESULT_SET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(insert|update|delete|alter|drop|rename|modify|truncate)\s")
        .expect("no-result-set pattern is valid")
});

/// Any run of leading whitespace is accepted before the keyword, not just one
/// character.
pub(crate) fn is_no_result_statement(sql: &str) -> bool {
    NO_RESULT_SET.is_match(sql)
}

impl<D: Driver> SqlHelper<D> {
    /// Run one statement and report the outcome as a `Response`.
    ///
    /// `args` may be positional (`Vec<SqlValue>`), named (`QueryArgs::new().bind(..)`)
    /// or both; with no arguments the SQL is sent as-is. The statement is prepared, and
    /// a prepare that fails because the connection went away is retried once after a
    /// reconnect. Rows are keyed by column name, lower-cased unless disabled, with
    /// repeated names suffixed `1`, `2`, ...
    #[tracing::instrument(
        skip(self, sql, args),
        fields(sql_preview = %sql.chars().take(100).collect::<String>())
    )]
    pub async fn query(&mut self, sql: &str, args: impl Into<QueryArgs>) -> Response {
        let args = args.into();
        let started = self.trace_enabled.then(Instant::now);
        let mut response = self.run_query(sql, &args).await;
        response.duration = started.map_or(Duration::ZERO, |start| start.elapsed());
        response
    }

    async fn run_query(&mut self, sql: &str, args: &QueryArgs) -> Response {
        if let Err(err) = self.conn.ensure_connected().await {
            return Response::from_error(&err);
        }

        let mut response = Response::for_sql(sql);
        let mut bindings = Bindings::default();

        if !args.is_empty() {
            let parsed = match parse_placeholders(sql) {
                Ok(parsed) => parsed,
                Err(err) => {
                    response.fail(&SqlHelperError::from(err));
                    return response;
                }
            };
            bindings = bind_parameters(args, &parsed.positions);
            response.sql = parsed.sql;
            if !bindings.is_empty() {
                tracing::debug!(signature = %bindings.signature(), "bound parameters");
                response.params = Some(bindings.clone());
            }
        }

        let mut stmt = match self.prepare_with_reconnect(&response.sql).await {
            Ok(stmt) => stmt,
            // A failed reconnect reports like a failed initial connect, without the SQL.
            Err(err @ SqlHelperError::ConnectionError(_)) => return Response::from_error(&err),
            Err(err) => {
                response.fail(&err);
                return response;
            }
        };

        tracing::debug!(params = bindings.len(), "statement prepared, executing");
        let execution = match self.conn.session_mut() {
            Ok(session) => session
                .execute(&mut stmt, &bindings)
                .await
                .map_err(SqlHelperError::ExecutionError),
            Err(err) => Err(err),
        };
        match execution {
            Ok(execution) => self.collect(&mut response, execution),
            Err(err) => response.fail(&err),
        }
        response
    }

    async fn prepare_with_reconnect(
        &mut self,
        sql: &str,
    ) -> Result<Statement<D>, SqlHelperError> {
        let err = match self.conn.session_mut()?.prepare(sql).await {
            Ok(stmt) => return Ok(stmt),
            Err(err) => err,
        };
        if !(self.conn.policy().enabled && is_gone_away(&err.message)) {
            return Err(SqlHelperError::PrepareError(err));
        }

        tracing::warn!(error = %err, "prepare failed on a lost connection, reconnecting");
        self.conn.connect().await?;
        self.conn
            .session_mut()?
            .prepare(sql)
            .await
            .map_err(SqlHelperError::PrepareError)
    }

    fn collect(&self, response: &mut Response, execution: Execution) {
        response.state = true;
        response.last_insert_id = execution.last_insert_id;
        response.affected_rows = u64::try_from(execution.affected_rows).unwrap_or(0);

        match execution.columns {
            Some(columns) => {
                let names = dedupe_column_names(&columns, self.lower_table_fields);
                response.result = build_rows(names, execution.rows);
                response.numrows = response.result.len();
            }
            None if is_no_result_statement(&response.sql) => {}
            None => response.fail(&SqlHelperError::MetadataError(
                "result_metadata returned false".to_string(),
            )),
        }
    }
}
