use rusqlite::types::Value;

use crate::params::{BoundParameter, TypeTag};
use crate::types::SqlValue;

/// Convert a bound parameter according to its type tag.
///
/// Booleans under the integer tag become 0/1; anything under the string tag is bound
/// as text (timestamps as `%F %T%.f`, JSON serialized). NULL stays NULL.
#[must_use]
pub fn bound_to_sqlite_value(param: &BoundParameter) -> Value {
    match (param.tag, &param.value) {
        (_, SqlValue::Null) => Value::Null,
        (TypeTag::Integer, SqlValue::Int(i)) => Value::Integer(*i),
        (TypeTag::Integer, SqlValue::Bool(b)) => Value::Integer(i64::from(*b)),
        (TypeTag::Double, SqlValue::Float(f)) => Value::Real(*f),
        (TypeTag::Blob, SqlValue::Blob(bytes)) => Value::Blob(bytes.clone()),
        (_, other) => other.to_bind_text().map_or(Value::Null, Value::Text),
    }
}
