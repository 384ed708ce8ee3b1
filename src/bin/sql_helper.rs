//! Run one statement through `SqlHelper` and print the response as JSON.
//!
//! ```text
//! sql-helper --db app.db --sql "SELECT * FROM users WHERE id = :id" --named id=7
//! sql-helper --backend mysql --host db --user app --db shop --sql "SELECT ?" --arg 1
//! ```

use std::process::ExitCode;

use clap::{ArgAction, Parser};
use tracing::Level;

use sql_helper::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about = "Run a statement with placeholder rewriting and print the response")]
struct Args {
    #[arg(long, value_enum, default_value = "sqlite")]
    backend: DatabaseType,
    #[arg(long, default_value = "localhost")]
    host: String,
    #[arg(long, default_value = "")]
    user: String,
    #[arg(long, default_value = "")]
    pwd: String,
    /// Database name, or the file path for SQLite
    #[arg(long)]
    db: String,
    #[arg(long, default_value_t = 3306)]
    port: u16,
    #[arg(long, default_value = "utf8")]
    charset: String,
    #[arg(long)]
    socket: Option<String>,
    /// Script run with `execute_batch` before the statement
    #[arg(long)]
    setup: Option<String>,
    #[arg(long)]
    sql: String,
    /// Positional argument; repeat in placeholder order
    #[arg(long = "arg", value_name = "VALUE")]
    args: Vec<String>,
    /// Named argument as NAME=VALUE
    #[arg(long, value_name = "NAME=VALUE", value_parser = parse_named)]
    named: Vec<(String, String)>,
    #[arg(long)]
    no_trace: bool,
    #[arg(long)]
    no_lower: bool,
    #[arg(long)]
    no_reconnect: bool,
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn parse_named(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got `{raw}`")),
    }
}

fn parse_value(raw: &str) -> SqlValue {
    if raw.eq_ignore_ascii_case("null") {
        SqlValue::Null
    } else if let Ok(int) = raw.parse::<i64>() {
        SqlValue::Int(int)
    } else if let Ok(float) = raw.parse::<f64>() {
        SqlValue::Float(float)
    } else {
        SqlValue::Text(raw.to_string())
    }
}

fn query_args(args: &Args) -> QueryArgs {
    let mut query_args = QueryArgs::new();
    for raw in &args.args {
        query_args.push(parse_value(raw));
    }
    for (name, raw) in &args.named {
        query_args.insert(name.as_str(), parse_value(raw));
    }
    query_args
}

async fn run<D: Driver>(driver: D, args: &Args) -> Response {
    let params = ConnectionParams::builder(args.db.clone())
        .host(args.host.clone())
        .user(args.user.clone())
        .pwd(args.pwd.clone())
        .port(args.port)
        .charset(args.charset.clone())
        .socket(args.socket.clone())
        .trace(!args.no_trace)
        .finish();

    let mut db = SqlHelper::new(driver, params);
    db.set_lower_table_fields(!args.no_lower);
    db.set_auto_reconnect(!args.no_reconnect);

    if let Some(setup) = &args.setup
        && let Err(err) = db.execute_batch(setup).await
    {
        tracing::error!(error = %err, "setup script failed");
        return Response {
            error: Some(err.message()),
            errorno: err.code(),
            ..Response::default()
        };
    }

    let response = db.query(&args.sql, query_args(args)).await;
    if let Err(err) = db.disconnect().await {
        tracing::warn!(error = %err, "disconnect failed");
    }
    response
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(level)
        .init();

    let response = match args.backend {
        #[cfg(feature = "sqlite")]
        DatabaseType::Sqlite => run(SqliteDriver, &args).await,
        #[cfg(feature = "mysql")]
        DatabaseType::Mysql => run(MysqlDriver, &args).await,
    };

    match serde_json::to_string_pretty(&response) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            eprintln!("failed to serialize response: {err}");
            return ExitCode::FAILURE;
        }
    }
    if response.state {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_parse_by_shape() {
        assert_eq!(parse_value("NULL"), SqlValue::Null);
        assert_eq!(parse_value("42"), SqlValue::Int(42));
        assert_eq!(parse_value("2.5"), SqlValue::Float(2.5));
        assert_eq!(parse_value("bob"), SqlValue::Text("bob".into()));
    }

    #[test]
    fn named_requires_equals() {
        assert_eq!(
            parse_named("id=a=b"),
            Ok(("id".to_string(), "a=b".to_string()))
        );
        assert!(parse_named("=1").is_err());
        assert!(parse_named("id").is_err());
    }

    #[test]
    fn cli_args_become_query_args() {
        let args = Args::parse_from([
            "sql-helper", "--db", ":memory:", "--sql", "SELECT ?, :b", "--arg", "1", "--named", "b=x",
        ]);
        let query = query_args(&args);
        assert_eq!(query.get(&ArgKey::Index(0)), Some(&SqlValue::Int(1)));
        assert_eq!(query.get(&ArgKey::from("b")), Some(&SqlValue::Text("x".into())));
    }
}
