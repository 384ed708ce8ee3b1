//! MySQLi-style query helper.
//!
//! `sql-helper` wraps a single database session and gives every statement the same
//! treatment: `:name` placeholders are rewritten to `?`, arguments are bound by name or
//! position, the statement is prepared and executed, and the outcome comes back as a
//! [`Response`] with rows keyed by column name. Connections that drop mid-session are
//! re-established automatically.
//!
//! Backends plug in through the [`Driver`]/[`Session`] traits:
//! - `sqlite` (default): rusqlite, blocking calls moved off the runtime
//! - `mysql`: `mysql_async`
//!
//! ```rust,no_run
//! use sql_helper::prelude::*;
//!
//! # async fn demo() {
//! let params = ConnectionParams::builder(":memory:").finish();
//! let mut db = SqlHelper::new(SqliteDriver, params);
//! let res = db
//!     .query("SELECT :a AS a, ? AS b", QueryArgs::new().bind("a", 1_i64).bind(0_usize, "x"))
//!     .await;
//! assert!(res.state);
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod driver;
pub mod error;
mod executor;
pub mod helper;
pub mod params;
pub mod prelude;
pub mod response;
pub mod results;
pub mod translation;
pub mod types;

#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "sqlite")]
pub mod sqlite;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{ConnectionParams, ConnectionParamsBuilder, ReconnectPolicy};
pub use connection::{ConnectionManager, ConnectionState, is_gone_away};
pub use driver::{Driver, DriverError, Execution, ServerInfo, Session};
pub use error::SqlHelperError;
pub use helper::SqlHelper;
pub use params::{ArgKey, Bindings, BoundParameter, QueryArgs, TypeTag, bind_parameters};
pub use response::Response;
pub use results::Row;
pub use translation::{ParseError, ParsedQuery, parse_placeholders};
pub use types::{DatabaseType, SqlValue};
