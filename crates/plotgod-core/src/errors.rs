/// Typed errors for the generative-text collaborator.
///
/// The session-prep call is made once per request with no retries, so there
/// is no retryable/fatal split; every variant surfaces to the caller, which
/// renders it inline rather than failing the request.
#[derive(Clone, Debug, thiserror::Error)]
pub enum LlmError {
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("rate limited")]
    RateLimited,

    #[error("server error {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("network error: {0}")]
    NetworkError(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl LlmError {
    /// Classify an HTTP status code into the appropriate error variant.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => Self::AuthenticationFailed(body),
            400 => Self::InvalidRequest(body),
            429 => Self::RateLimited,
            500..=599 => Self::ServerError { status, body },
            _ => Self::InvalidRequest(format!("unexpected status {status}: {body}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_status_mapping() {
        assert!(matches!(
            LlmError::from_status(401, "unauthorized".into()),
            LlmError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            LlmError::from_status(403, "forbidden".into()),
            LlmError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            LlmError::from_status(400, "bad request".into()),
            LlmError::InvalidRequest(_)
        ));
        assert!(matches!(
            LlmError::from_status(429, "slow down".into()),
            LlmError::RateLimited
        ));
        assert!(matches!(
            LlmError::from_status(502, "bad gateway".into()),
            LlmError::ServerError { status: 502, .. }
        ));
        assert!(matches!(
            LlmError::from_status(302, "redirect".into()),
            LlmError::InvalidRequest(_)
        ));
    }

    #[test]
    fn display_carries_cause() {
        let err = LlmError::ServerError {
            status: 500,
            body: "boom".into(),
        };
        assert_eq!(err.to_string(), "server error 500: boom");
    }
}
