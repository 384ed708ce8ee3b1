// MySQL backend over mysql_async
//
// - connection: driver, session, prepare/execute, transactions
// - params: bound parameters and row cells to and from mysql_async values

mod connection;
mod params;

pub use connection::{MysqlDriver, MysqlSession};
pub use params::{bound_to_mysql_value, mysql_value_to_sql_value};

use crate::driver::{CR_CONNECTION_ERROR, CR_SERVER_GONE_ERROR, DriverError};

/// Map a `mysql_async` failure onto mysqli-style codes and messages.
///
/// Transport failures become "can't connect" while connecting and "gone away"
/// afterwards, so the reconnect logic recognizes them.
pub(crate) fn driver_error(err: &mysql_async::Error, connecting: bool) -> DriverError {
    match err {
        mysql_async::Error::Server(server) => {
            DriverError::new(i64::from(server.code), server.message.clone())
        }
        mysql_async::Error::Io(_)
        | mysql_async::Error::Driver(mysql_async::DriverError::ConnectionClosed) => {
            if connecting {
                DriverError::new(
                    CR_CONNECTION_ERROR,
                    format!("Can't connect to MySQL server: {err}"),
                )
            } else {
                DriverError::new(
                    CR_SERVER_GONE_ERROR,
                    format!("MySQL server has gone away: {err}"),
                )
            }
        }
        other => DriverError::other(other.to_string()),
    }
}

impl From<mysql_async::Error> for DriverError {
    fn from(err: mysql_async::Error) -> Self {
        driver_error(&err, false)
    }
}
