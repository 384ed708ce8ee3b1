//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::config::{ConnectionParams, ConnectionParamsBuilder, ReconnectPolicy};
pub use crate::connection::{
    ConnectionManager, ConnectionState, GONE_AWAY_SIGNATURES, is_gone_away,
};
pub use crate::driver::{
    CR_CONNECTION_ERROR, CR_SERVER_GONE_ERROR, CR_SERVER_LOST, Driver, DriverError, Execution,
    ServerInfo, Session,
};
pub use crate::error::SqlHelperError;
pub use crate::helper::SqlHelper;
pub use crate::params::{
    ArgKey, Bindings, BoundParameter, QueryArgs, TypeTag, bind_parameters,
};
pub use crate::response::Response;
pub use crate::results::Row;
pub use crate::translation::{
    ParseError, ParsedQuery, Placeholder, PlaceholderStyle, PlaceholderToken, RegionKind,
    parse_placeholders,
};
pub use crate::types::{DatabaseType, SqlValue};

#[cfg(feature = "sqlite")]
pub use crate::sqlite::SqliteDriver;

#[cfg(feature = "mysql")]
pub use crate::mysql::MysqlDriver;
