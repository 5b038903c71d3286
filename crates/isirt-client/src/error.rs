use reqwest::StatusCode;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Auth,
    Server,
    Client,
    Timeout,
    Malformed,
    Transport,
    InvalidRequest,
}

impl ErrorKind {
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            401 => Self::Auth,
            500..=599 => Self::Server,
            _ => Self::Client,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Server | Self::Timeout | Self::Transport)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("not authenticated ({status}): {message}")]
    Auth { status: u16, message: String },
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("request rejected ({status}): {message}")]
    Client { status: u16, message: String },
    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    #[error("malformed response ({status}): {message}")]
    Malformed { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// Builds the error for a non-2xx response from its status and raw body.
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let message = error_message(status, body);
        let kind = ErrorKind::from_status(status);
        let status = status.as_u16();
        match kind {
            ErrorKind::Auth => Self::Auth { status, message },
            ErrorKind::Server => Self::Server { status, message },
            _ => Self::Client { status, message },
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout { timeout_ms }
        } else if err.is_builder() {
            Self::InvalidRequest(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Auth { .. } => ErrorKind::Auth,
            Self::Server { .. } => ErrorKind::Server,
            Self::Client { .. } => ErrorKind::Client,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Malformed { .. } => ErrorKind::Malformed,
            Self::Transport(_) => ErrorKind::Transport,
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth { status, .. }
            | Self::Server { status, .. }
            | Self::Client { status, .. }
            | Self::Malformed { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }

    pub fn is_auth(&self) -> bool {
        self.kind() == ErrorKind::Auth
    }

    /// The human-readable part, without the kind prefix.
    pub fn message(&self) -> String {
        match self {
            Self::Auth { message, .. }
            | Self::Server { message, .. }
            | Self::Client { message, .. }
            | Self::Malformed { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// `detail` wins (structured details are JSON-encoded), then the raw body,
/// then a generic status line.
pub(crate) fn error_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        match value.get("detail") {
            Some(Value::String(detail)) => return detail.clone(),
            Some(Value::Null) | None => {}
            Some(structured) => return structured.to_string(),
        }
    }

    let text = String::from_utf8_lossy(body).trim().to_string();
    if !text.is_empty() {
        return text;
    }

    format!(
        "Server error: {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or_default()
    )
    .trim_end()
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert_eq!(ErrorKind::from_status(StatusCode::UNAUTHORIZED), ErrorKind::Auth);
        assert_eq!(ErrorKind::from_status(StatusCode::FORBIDDEN), ErrorKind::Client);
        assert_eq!(ErrorKind::from_status(StatusCode::NOT_FOUND), ErrorKind::Client);
        assert_eq!(
            ErrorKind::from_status(StatusCode::SERVICE_UNAVAILABLE),
            ErrorKind::Server
        );
    }

    #[test]
    fn retryable_kinds() {
        assert!(ErrorKind::Server.is_retryable());
        assert!(ErrorKind::Timeout.is_retryable());
        assert!(ErrorKind::Transport.is_retryable());
        assert!(!ErrorKind::Auth.is_retryable());
        assert!(!ErrorKind::Client.is_retryable());
        assert!(!ErrorKind::Malformed.is_retryable());
    }

    #[test]
    fn message_prefers_string_detail() {
        let msg = error_message(StatusCode::BAD_REQUEST, br#"{"detail":"Email already registered"}"#);
        assert_eq!(msg, "Email already registered");
    }

    #[test]
    fn structured_detail_is_json_encoded() {
        let msg = error_message(
            StatusCode::UNPROCESSABLE_ENTITY,
            br#"{"detail":[{"loc":["body","email"],"msg":"field required"}]}"#,
        );
        assert_eq!(msg, r#"[{"loc":["body","email"],"msg":"field required"}]"#);
    }

    #[test]
    fn falls_back_to_body_then_status() {
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, b"upstream down"),
            "upstream down"
        );
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, b""),
            "Server error: 500 Internal Server Error"
        );
    }

    #[test]
    fn from_response_carries_status() {
        let err = ApiError::from_response(StatusCode::UNAUTHORIZED, br#"{"detail":"Not authenticated"}"#);
        assert!(err.is_auth());
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.message(), "Not authenticated");
        assert!(!err.is_retryable());
    }
}
