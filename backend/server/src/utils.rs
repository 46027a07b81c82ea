use axum::{Json, extract::FromRequest};
use chrono::{SecondsFormat, Utc};
use serde_json::Value;

use crate::error::AppError;

/// JSON body whose rejections come back as [`AppError::MalformedPayload`].
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct Payload<T>(pub T);

/// Fail on the first empty field, by name.
pub fn require_non_empty(fields: &[(&str, &str)]) -> Result<(), AppError> {
    for (name, value) in fields {
        if value.trim().is_empty() {
            return Err(AppError::MalformedPayload(format!("{name} must not be empty")));
        }
    }

    Ok(())
}

pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Absent or blank optional values count as missing.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// `null`, `false`, zero, `""`, `[]` and `{}` carry no data.
pub fn is_empty_body(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_non_empty() {
        assert!(require_non_empty(&[("user_id", "u1"), ("game_id", "g1")]).is_ok());

        let err = require_non_empty(&[("user_id", "u1"), ("game_id", "  ")]).unwrap_err();
        assert_eq!(err.to_string(), "Malformed payload: game_id must not be empty");
    }

    #[test]
    fn test_timestamp_is_rfc3339() {
        let ts = timestamp();

        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
        assert!(ts.ends_with('Z'));
    }

    #[test]
    fn test_empty_bodies() {
        use serde_json::json;

        for empty in [json!(null), json!(false), json!(0), json!(0.0), json!(""), json!([]), json!({})] {
            assert!(is_empty_body(&empty), "{empty} should be empty");
        }

        for data in [json!(true), json!(-1), json!("0"), json!([0]), json!({ "a": null })] {
            assert!(!is_empty_body(&data), "{data} should carry data");
        }
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some(" ".into())), None);
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some("https://x".into())), Some("https://x".into()));
    }
}
