//! Request-body handling: JSON and form-encoded bodies are accepted
//! interchangeably, JSON winning when the Content-Type says so.

use std::collections::HashMap;
use std::convert::Infallible;

use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::{Form, Json};
use serde_json::Value;

/// The parsed request body as a JSON object. A body that cannot be parsed
/// degrades to an empty object rather than rejecting the request, so the
/// caller sees field-level validation errors ("name is required.") instead of
/// an opaque parse failure.
pub struct Payload(pub Value);

fn is_json(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| {
            let mime = ct.split(';').next().unwrap_or("").trim();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

impl<S> FromRequest<S> for Payload
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let value = if is_json(&req) {
            match Json::<Value>::from_request(req, state).await {
                Ok(Json(v)) if v.is_object() => v,
                _ => Value::Object(Default::default()),
            }
        } else {
            match Form::<HashMap<String, String>>::from_request(req, state).await {
                Ok(Form(map)) => Value::Object(
                    map.into_iter().map(|(k, v)| (k, Value::String(v))).collect(),
                ),
                Err(_) => Value::Object(Default::default()),
            }
        };
        Ok(Payload(value))
    }
}

/// Read a field as text. JSON numbers and booleans are stringified so that
/// `{"level": 7}` and `{"level": "7"}` validate the same way; null and
/// missing are both absent.
pub fn field_str(payload: &Value, key: &str) -> Option<String> {
    match payload.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_str_reads_strings_and_numbers() {
        let payload = json!({"name": "Aanur", "level": 7, "flag": true});
        assert_eq!(field_str(&payload, "name").as_deref(), Some("Aanur"));
        assert_eq!(field_str(&payload, "level").as_deref(), Some("7"));
        assert_eq!(field_str(&payload, "flag").as_deref(), Some("true"));
    }

    #[test]
    fn field_str_treats_null_and_missing_as_absent() {
        let payload = json!({"notes": null});
        assert_eq!(field_str(&payload, "notes"), None);
        assert_eq!(field_str(&payload, "missing"), None);
    }

    #[test]
    fn field_str_ignores_nested_values() {
        let payload = json!({"name": {"nested": true}});
        assert_eq!(field_str(&payload, "name"), None);
    }
}
