mod core;
mod prepared;
mod tx;

pub(crate) use core::run_blocking;
pub use core::SqliteSession;
pub use prepared::SqliteStatement;
