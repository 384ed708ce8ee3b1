use chrono::NaiveDate;
use mysql_async::Value;

use crate::params::{BoundParameter, TypeTag};
use crate::types::SqlValue;

/// Convert a bound parameter according to its type tag.
#[must_use]
pub fn bound_to_mysql_value(param: &BoundParameter) -> Value {
    match (param.tag, &param.value) {
        (_, SqlValue::Null) => Value::NULL,
        (TypeTag::Integer, SqlValue::Int(i)) => Value::Int(*i),
        (TypeTag::Integer, SqlValue::Bool(b)) => Value::Int(i64::from(*b)),
        (TypeTag::Double, SqlValue::Float(f)) => Value::Double(*f),
        (TypeTag::Blob, SqlValue::Blob(bytes)) => Value::Bytes(bytes.clone()),
        (_, other) => other
            .to_bind_text()
            .map_or(Value::NULL, |text| Value::Bytes(text.into_bytes())),
    }
}

/// Convert a binary-protocol cell. Byte strings that are valid UTF-8 come back as text.
#[must_use]
pub fn mysql_value_to_sql_value(value: Value) -> SqlValue {
    match value {
        Value::NULL => SqlValue::Null,
        Value::Bytes(bytes) => match String::from_utf8(bytes) {
            Ok(text) => SqlValue::Text(text),
            Err(err) => SqlValue::Blob(err.into_bytes()),
        },
        Value::Int(i) => SqlValue::Int(i),
        Value::UInt(u) => i64::try_from(u).map_or_else(|_| SqlValue::Text(u.to_string()), SqlValue::Int),
        Value::Float(f) => SqlValue::Float(f64::from(f)),
        Value::Double(d) => SqlValue::Float(d),
        Value::Date(year, month, day, hour, min, sec, micro) => {
            NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day))
                .and_then(|date| {
                    date.and_hms_micro_opt(u32::from(hour), u32::from(min), u32::from(sec), micro)
                })
                .map_or_else(
                    || {
                        SqlValue::Text(format!(
                            "{year:04}-{month:02}-{day:02} {hour:02}:{min:02}:{sec:02}"
                        ))
                    },
                    SqlValue::Timestamp,
                )
        }
        Value::Time(negative, days, hours, mins, secs, micros) => {
            let total_hours = days * 24 + u32::from(hours);
            let sign = if negative { "-" } else { "" };
            SqlValue::Text(format!(
                "{sign}{total_hours:02}:{mins:02}:{secs:02}.{micros:06}"
            ))
        }
    }
}
