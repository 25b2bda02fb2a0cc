use chrono::{DateTime, SecondsFormat};
use serde_json::Value;

/// Epoch seconds to an RFC 3339 / ISO-8601 UTC string. Zero means "no timestamp".
pub fn epoch_to_iso8601(secs: i64) -> Option<String> {
    if secs == 0 {
        return None;
    }
    DateTime::from_timestamp(secs, 0).map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
}

pub fn timestamp_field(value: Option<&Value>) -> Option<String> {
    let secs = match value? {
        Value::Number(num) => num.as_i64().or_else(|| num.as_f64().map(|f| f.trunc() as i64)),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }?;
    epoch_to_iso8601(secs)
}
