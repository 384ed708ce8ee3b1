use rusqlite::types::Value;
use rusqlite::{Connection, params_from_iter};

use crate::driver::{DriverError, Execution};
use crate::types::SqlValue;

/// Extract a `SqlValue` from a `SQLite` row.
///
/// # Errors
///
/// Returns `DriverError` if the value cannot be read.
pub fn sqlite_extract_value_sync(row: &rusqlite::Row, idx: usize) -> Result<SqlValue, DriverError> {
    let value: Value = row.get(idx)?;
    Ok(match value {
        Value::Null => SqlValue::Null,
        Value::Integer(i) => SqlValue::Int(i),
        Value::Real(f) => SqlValue::Float(f),
        Value::Text(s) => SqlValue::Text(s),
        Value::Blob(b) => SqlValue::Blob(b),
    })
}

/// Run a cached statement with positional values.
///
/// Statements without result columns report no metadata, the number of changed rows
/// and the last inserted rowid. Statements with result columns return every row.
pub(crate) fn run_statement(
    conn: &mut Connection,
    sql: &str,
    values: &[Value],
) -> Result<Execution, DriverError> {
    let mut stmt = conn.prepare_cached(sql)?;
    let column_count = stmt.column_count();

    if column_count == 0 {
        let changed = stmt.execute(params_from_iter(values.iter()))?;
        return Ok(Execution {
            affected_rows: i64::try_from(changed).unwrap_or(i64::MAX),
            last_insert_id: u64::try_from(conn.last_insert_rowid()).unwrap_or(0),
            columns: None,
            rows: Vec::new(),
        });
    }

    let columns: Vec<String> = stmt
        .column_names()
        .iter()
        .map(std::string::ToString::to_string)
        .collect();

    let mut rows = Vec::new();
    let mut rows_iter = stmt.query(params_from_iter(values.iter()))?;
    while let Some(row) = rows_iter.next()? {
        let mut cells = Vec::with_capacity(column_count);
        for idx in 0..column_count {
            cells.push(sqlite_extract_value_sync(row, idx)?);
        }
        rows.push(cells);
    }

    Ok(Execution {
        affected_rows: i64::try_from(rows.len()).unwrap_or(i64::MAX),
        last_insert_id: 0,
        columns: Some(columns),
        rows,
    })
}
