use std::sync::Arc;
use std::time::Duration;

use sql_helper::prelude::*;
use sql_helper::test_utils::ScriptedDriver;
use tokio::time::Instant;

fn helper(driver: &ScriptedDriver) -> SqlHelper<ScriptedDriver> {
    let params = ConnectionParams::new("db.internal", "app", "secret", "shop");
    SqlHelper::new(driver.clone(), params)
}

fn gone_away() -> DriverError {
    DriverError::new(CR_SERVER_GONE_ERROR, "MySQL server has gone away")
}

#[tokio::test(start_paused = true)]
async fn connect_retries_up_to_max_try_then_fails() {
    let driver = ScriptedDriver::new();
    driver.fail_connect(3, gone_away());
    let mut db = helper(&driver);
    db.set_auto_reconnect_max_try(2);

    let started = Instant::now();
    let res = db.connect().await;

    assert!(!res.state);
    assert_eq!(res.errorno, Some(CR_SERVER_GONE_ERROR));
    assert_eq!(res.error.as_deref(), Some("MySQL server has gone away"));
    assert_eq!(driver.script().connect_attempts, 3);
    assert_eq!(started.elapsed(), Duration::from_secs(6));
    assert_eq!(db.connection().state(), ConnectionState::Failed);
    assert!(!db.is_connected());
}

#[tokio::test(start_paused = true)]
async fn connect_recovers_after_transient_failures() {
    let driver = ScriptedDriver::new();
    driver.fail_connect(2, DriverError::other("Lost connection to MySQL server at 'handshake'"));
    let mut db = helper(&driver);
    db.set_auto_reconnect_sleep(Duration::from_millis(250));

    let started = Instant::now();
    let res = db.connect().await;

    assert!(res.state);
    assert_eq!(started.elapsed(), Duration::from_millis(500));
    assert_eq!(db.connection().reconnect_count(), 0);
    assert_eq!(db.connection().state(), ConnectionState::Connected);
    let script = driver.script();
    assert_eq!(script.connect_attempts, 3);
    assert_eq!(script.charsets, vec!["utf8".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn ordinary_connect_errors_are_not_retried() {
    let driver = ScriptedDriver::new();
    driver.fail_connect(1, DriverError::new(1045_i64, "Access denied for user 'app'"));
    let mut db = helper(&driver);

    let started = Instant::now();
    let res = db.connect().await;

    assert!(!res.state);
    assert_eq!(res.errorno, Some(1045));
    assert_eq!(driver.script().connect_attempts, 1);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn cant_connect_code_is_retried() {
    let driver = ScriptedDriver::new();
    driver.fail_connect(1, DriverError::new(CR_CONNECTION_ERROR, "Connection refused"));
    let mut db = helper(&driver);

    assert!(db.connect().await.state);
    assert_eq!(driver.script().connect_attempts, 2);
}

#[tokio::test(start_paused = true)]
async fn disabled_auto_reconnect_tries_once() {
    let driver = ScriptedDriver::new();
    driver.fail_connect(1, gone_away());
    let mut db = helper(&driver);
    db.set_auto_reconnect(false);

    let res = db.query("select 1", QueryArgs::new()).await;
    assert!(!res.state);
    assert_eq!(driver.script().connect_attempts, 1);
}

#[tokio::test]
async fn connect_reports_server_info() {
    let driver = ScriptedDriver::new();
    let mut db = helper(&driver);
    let res = db.connect().await;
    assert!(res.state);
    let info = res.server_info.expect("server info");
    assert_eq!(info.server_info, "scripted");
    assert_eq!(info.stat, "session: 1");
}

#[tokio::test]
async fn queries_connect_lazily_once() {
    let driver = ScriptedDriver::new();
    let mut db = helper(&driver);
    assert!(!db.is_connected());

    for _ in 0..3 {
        let res = db.query("delete from t", QueryArgs::new()).await;
        assert!(res.state);
        assert_eq!(res.affected_rows, 1);
    }
    let script = driver.script();
    assert_eq!(script.connect_attempts, 1);
    assert_eq!(script.executed.len(), 3);
}

#[tokio::test]
async fn prepare_on_lost_connection_reconnects_and_retries_once() {
    let driver = ScriptedDriver::new();
    let mut db = helper(&driver);
    assert!(db.connect().await.state);
    driver.fail_prepare(gone_away());

    let res = db
        .query("update t set a = :a", QueryArgs::new().bind("a", 1_i64))
        .await;

    assert!(res.state, "{:?}", res.error);
    let script = driver.script();
    assert_eq!(script.sessions_opened, 2);
    assert_eq!(script.sessions_closed, 1);
    assert_eq!(script.prepared, vec!["update t set a = ?"; 2]);
    assert_eq!(script.executed.len(), 1);
}

#[tokio::test]
async fn second_prepare_failure_is_reported() {
    let driver = ScriptedDriver::new();
    let mut db = helper(&driver);
    driver.fail_prepare(gone_away());
    driver.fail_prepare(gone_away());

    let res = db.query("delete from t", QueryArgs::new()).await;

    assert!(!res.state);
    assert_eq!(res.errorno, Some(CR_SERVER_GONE_ERROR));
    assert_eq!(driver.script().prepared.len(), 2);
    assert!(driver.script().executed.is_empty());
}

#[tokio::test(start_paused = true)]
async fn failed_reconnect_after_lost_prepare_returns_the_connect_error() {
    let driver = ScriptedDriver::new();
    let mut db = helper(&driver);
    db.set_auto_reconnect_max_try(2);
    assert!(db.connect().await.state);
    driver.fail_prepare(gone_away());
    driver.fail_connect(3, gone_away());

    let res = db
        .query("update t set a = ?", vec![SqlValue::Int(1)])
        .await;

    assert!(!res.state);
    assert_eq!(res.errorno, Some(CR_SERVER_GONE_ERROR));
    assert_eq!(res.error.as_deref(), Some("MySQL server has gone away"));
    assert!(res.sql.is_empty());
    assert!(res.sql_original.is_empty());
    assert_eq!(res.params, None);
    assert!(!db.is_connected());
    let script = driver.script();
    assert_eq!(script.connect_attempts, 4);
    assert_eq!(script.prepared.len(), 1);
    assert!(script.executed.is_empty());
}

#[tokio::test]
async fn lost_prepare_without_auto_reconnect_is_reported_at_once() {
    let driver = ScriptedDriver::new();
    let mut db = helper(&driver);
    db.set_auto_reconnect(false);
    driver.fail_prepare(gone_away());

    let res = db.query("delete from t", QueryArgs::new()).await;

    assert!(!res.state);
    assert_eq!(res.errorno, Some(CR_SERVER_GONE_ERROR));
    assert_eq!(res.sql_original, "delete from t");
    let script = driver.script();
    assert_eq!(script.sessions_opened, 1);
    assert_eq!(script.prepared.len(), 1);
    assert!(script.executed.is_empty());
}

#[tokio::test]
async fn other_prepare_errors_do_not_reconnect() {
    let driver = ScriptedDriver::new();
    let mut db = helper(&driver);
    driver.fail_prepare(DriverError::new(1064_i64, "You have an error in your SQL syntax"));

    let res = db.query("selec 1", QueryArgs::new()).await;

    assert!(!res.state);
    assert_eq!(res.errorno, Some(1064));
    assert_eq!(res.error.as_deref(), Some("You have an error in your SQL syntax"));
    let script = driver.script();
    assert_eq!(script.sessions_opened, 1);
    assert_eq!(script.prepared.len(), 1);
}

#[tokio::test]
async fn execute_errors_are_surfaced_without_retry() {
    let driver = ScriptedDriver::new();
    let mut db = helper(&driver);
    driver.push_execution(Err(DriverError::new(
        1062_i64,
        "Duplicate entry '1' for key 'PRIMARY'",
    )));

    let res = db
        .query("insert into t (id) values (?)", vec![SqlValue::Int(1)])
        .await;

    assert!(!res.state);
    assert_eq!(res.errorno, Some(1062));
    assert_eq!(res.sql, "insert into t (id) values (?)");
    assert_eq!(driver.script().executed.len(), 1);
}

#[tokio::test]
async fn bindings_reach_the_driver_in_placeholder_order() {
    let driver = ScriptedDriver::new();
    let mut db = helper(&driver);

    let res = db
        .query(
            "insert into t (a, b, c) values (:b, :a, :b)",
            QueryArgs::new().bind("a", "x").bind("b", 2_i64),
        )
        .await;
    assert!(res.state);

    let script = driver.script();
    let (sql, bindings) = &script.executed[0];
    assert_eq!(sql, "insert into t (a, b, c) values (?, ?, ?)");
    assert_eq!(bindings.signature(), "isi");
    assert_eq!(
        bindings.values(),
        vec![&SqlValue::Int(2), &SqlValue::Text("x".into()), &SqlValue::Int(2)]
    );
    assert_eq!(res.params.as_ref(), Some(bindings));
}

#[tokio::test]
async fn rows_are_keyed_by_deduplicated_lowercase_names() {
    let driver = ScriptedDriver::new();
    let mut db = helper(&driver);
    driver.push_execution(Ok(Execution {
        affected_rows: -1,
        last_insert_id: 0,
        columns: Some(vec!["ID".into(), "id".into(), "Name".into()]),
        rows: vec![
            vec![SqlValue::Int(1), SqlValue::Int(10), SqlValue::from("a")],
            vec![SqlValue::Int(2), SqlValue::Int(20), SqlValue::from("b")],
        ],
    }));

    let res = db.query("select * from t join u", QueryArgs::new()).await;

    assert!(res.state);
    assert_eq!(res.numrows, 2);
    assert_eq!(res.affected_rows, 0);
    assert_eq!(
        res.result[0].column_names,
        Arc::new(vec!["id".to_string(), "id1".to_string(), "name".to_string()])
    );
    assert_eq!(res.result[1].get("id1"), Some(&SqlValue::Int(20)));
}

#[tokio::test]
async fn missing_metadata_is_an_error_except_for_write_statements() {
    let driver = ScriptedDriver::new();
    let mut db = helper(&driver);

    let res = db.query("select 1", QueryArgs::new()).await;
    assert!(!res.state);
    assert_eq!(res.error.as_deref(), Some("result_metadata returned false"));

    for sql in ["INSERT INTO t VALUES (1)", "truncate t", "ALTER TABLE t ADD c INT"] {
        let res = db.query(sql, QueryArgs::new()).await;
        assert!(res.state, "{sql}");
    }
}

#[tokio::test]
async fn transaction_calls_need_a_session_except_begin() {
    let driver = ScriptedDriver::new();
    let mut db = helper(&driver);

    assert!(matches!(db.commit().await, Err(SqlHelperError::NotConnected)));
    assert!(matches!(db.rollback().await, Err(SqlHelperError::NotConnected)));

    db.begin().await.expect("begin");
    db.commit().await.expect("commit");
    db.execute_batch("create table t (id int)").await.expect("batch");
    assert_eq!(driver.script().transactions, vec!["begin", "commit"]);
    assert_eq!(driver.script().batches, vec!["create table t (id int)".to_string()]);
}

#[tokio::test]
async fn disconnect_is_idempotent() {
    let driver = ScriptedDriver::new();
    let mut db = helper(&driver);
    assert!(db.connect().await.state);

    db.disconnect().await.expect("first disconnect");
    db.disconnect().await.expect("second disconnect");

    assert!(!db.is_connected());
    assert_eq!(db.connection().state(), ConnectionState::Disconnected);
    assert_eq!(driver.script().sessions_closed, 1);
}
