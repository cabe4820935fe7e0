//! Wire value normalization for display.
//!
//! Column type tags are opaque; only two families are recognized:
//! date/time tags (`datetime64[ns]`, `datetime64[ns, UTC]`, ...) and
//! complex tags (`complex128`, ...). Everything else passes through.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// How a column's values are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    DateTime,
    Complex,
    Plain,
}

impl ColumnKind {
    pub fn of(col_type: &str) -> Self {
        if col_type.starts_with("datetime") {
            ColumnKind::DateTime
        } else if col_type.starts_with("complex") {
            ColumnKind::Complex
        } else {
            ColumnKind::Plain
        }
    }
}

/// UTC calendar rendering, e.g. `Fri, 05 Jan 2024 00:00:00 GMT`.
const UTC_CALENDAR_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

pub fn normalize_value(kind: ColumnKind, value: &Value) -> Value {
    match (kind, value) {
        (ColumnKind::DateTime, Value::String(s)) => match parse_timestamp(s) {
            Some(ts) => Value::String(ts.format(UTC_CALENDAR_FORMAT).to_string()),
            None => {
                tracing::debug!(value = %s, "unparseable datetime left as-is");
                value.clone()
            }
        },
        (ColumnKind::Complex, Value::Object(obj)) => match (obj.get("real"), obj.get("imag")) {
            (Some(real), Some(imag)) => {
                Value::String(format!("{} + {}j", display_text(real), display_text(imag)))
            }
            _ => value.clone(),
        },
        _ => value.clone(),
    }
}

/// Parse a backend timestamp. Strings without an offset are taken as UTC.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Text form of a component: integral floats lose their fraction and
/// strings are not quoted.
fn display_text(value: &Value) -> String {
    match value {
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (_, Some(u), _) => u.to_string(),
            (_, _, Some(f)) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            (_, _, Some(f)) => format!("{}", f),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
