//! Hub file documents: `GET /{file_id}` and `PUT /`.
//!
//! Files are kept as [`serde_json::Value`]s because their content is owned by
//! the front end; the session layer only touches the bookkeeping fields
//! listed here.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Format version written into files this crate creates.
pub const FILE_VERSION: &str = "rss3.io/version/v0.1.0";

/// Request body for `PUT /`: every changed file, already signed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PutFilesRequest {
    pub contents: Vec<Value>,
}

/// A fresh, unsigned index file for `address`, as used when the hub has
/// never seen the account.
pub fn new_index_file(address: &str, now: DateTime<Utc>) -> Value {
    let ts = timestamp(now);
    json!({
        "id": address,
        "version": FILE_VERSION,
        "date_created": ts,
        "date_updated": ts,
        "signature": "",
    })
}

/// Set `date_updated` on a file object. Non-objects are left alone.
pub fn touch(file: &mut Value, now: DateTime<Utc>) {
    if let Some(obj) = file.as_object_mut() {
        obj.insert("date_updated".into(), Value::String(timestamp(now)));
    }
}

/// The `id` of a file object, if it has one.
pub fn file_id(file: &Value) -> Option<&str> {
    file.get("id").and_then(Value::as_str)
}

fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 18, 12, 0, 0).unwrap()
    }

    #[test]
    fn index_file_has_bookkeeping_fields() {
        let file = new_index_file("0xABC", fixed());
        assert_eq!(file_id(&file), Some("0xABC"));
        assert_eq!(file["version"], FILE_VERSION);
        assert_eq!(file["date_created"], "2026-02-18T12:00:00.000Z");
        assert_eq!(file["signature"], "");
    }

    #[test]
    fn touch_updates_only_date_updated() {
        let mut file = new_index_file("0xABC", fixed());
        let later = Utc.with_ymd_and_hms(2026, 3, 1, 8, 30, 0).unwrap();
        touch(&mut file, later);
        assert_eq!(file["date_updated"], "2026-03-01T08:30:00.000Z");
        assert_eq!(file["date_created"], "2026-02-18T12:00:00.000Z");
    }

    #[test]
    fn put_request_shape() {
        let body = PutFilesRequest {
            contents: vec![new_index_file("0xABC", fixed())],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["id"], "0xABC");
    }
}
