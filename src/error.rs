use thiserror::Error;

/// Main error type for row API operations
#[derive(Debug, Error)]
pub enum Error {
    /// Server answered with a non-2xx status
    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    /// Connection, DNS, timeout or body read failure from the HTTP client
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Query parameter rejected before the request was sent
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// A credential provider could not produce a url/token pair
    #[error("credentials unavailable: {0}")]
    Credentials(String),

    /// Client configuration error
    #[error("invalid configuration: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new HTTP status error
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Error::Http {
            status,
            body: body.into(),
        }
    }

    /// Get the HTTP status code if the server answered
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            Error::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Get the response body of a non-2xx answer
    pub fn body(&self) -> Option<&str> {
        match self {
            Error::Http { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Check if this error is an unauthorized error (401)
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Http { status: 401, .. })
    }

    /// Check if this error is a permission denied error (403)
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Error::Http { status: 403, .. })
    }

    /// Check if this error is a not found error (404)
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Http { status: 404, .. })
    }
}

/// Result type for row API operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_not_found() {
        let error = Error::http(404, r#"{"error":"ERROR_ROW_DOES_NOT_EXIST"}"#);
        assert!(error.is_not_found());
        assert!(!error.is_permission_denied());
        assert_eq!(error.status_code(), Some(404));
    }

    #[test]
    fn test_error_permission_denied() {
        let error = Error::http(403, "");
        assert!(error.is_permission_denied());
        assert_eq!(error.body(), Some(""));
    }

    #[test]
    fn test_error_display() {
        let error = Error::http(500, "boom");
        assert_eq!(error.to_string(), "HTTP error 500: boom");
    }

    #[test]
    fn test_non_http_error_has_no_status() {
        let error = Error::InvalidParam("search".to_string());
        assert_eq!(error.status_code(), None);
        assert!(!error.is_not_found());
    }
}
