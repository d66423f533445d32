use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use plotgod_core::validate::ValidationError;
use plotgod_store::StoreError;

/// Error taxonomy for the HTTP surface. Every failure body is
/// `{"ok": false, "error": message}` with the status below. Generative-call
/// failures never reach this type; they are embedded inline in the page
/// content instead.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A user-supplied field failed validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The requested entity (scoped by parent where applicable) does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The storage engine failed; the cause message is surfaced as-is.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({"ok": false, "error": self.to_string()}));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        let invalid = ApiError::Invalid(ValidationError::Required {
            field: "name".into(),
        });
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);

        assert_eq!(
            ApiError::not_found("Campaign not found.").status_code(),
            StatusCode::NOT_FOUND
        );

        let storage = ApiError::Storage(StoreError::Database("disk gone".into()));
        assert_eq!(storage.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn messages_pass_through() {
        let err = ApiError::not_found("Session not found.");
        assert_eq!(err.to_string(), "Session not found.");

        let err = ApiError::Invalid(ValidationError::Required {
            field: "name".into(),
        });
        assert_eq!(err.to_string(), "name is required.");
    }
}
