//! Error types for the relay

use hyper::StatusCode;

/// Main error type for relay operations
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Malformed request payload; recovered at the boundary as a 400.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The remote store rejected the request. `detail` carries the raw
    /// upstream body for diagnostics; this is an internal/demo service,
    /// not a hardened boundary, so it is surfaced unsanitized.
    #[error("Upstream store error ({status}): {detail}")]
    UpstreamStore { status: u16, detail: String },

    /// Network-level failure reaching the store.
    #[error("Upstream store unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Required configuration absent; every request fails uniformly until
    /// the deployment is corrected.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RelayError {
    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::UpstreamStore { .. } | Self::UpstreamUnavailable(_) | Self::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// JSON body for the HTTP layer: `{error}` for client errors,
    /// `{error, detail}` for upstream failures.
    pub fn to_body(&self) -> String {
        let body = match self {
            Self::InvalidInput(message) => serde_json::json!({ "error": message }),
            Self::UpstreamStore { status, detail } => serde_json::json!({
                "error": format!("upstream store rejected the request ({status})"),
                "detail": detail,
            }),
            Self::UpstreamUnavailable(message) => serde_json::json!({
                "error": "upstream store unreachable",
                "detail": message,
            }),
            Self::Config(message) => serde_json::json!({
                "error": format!("configuration error: {message}"),
            }),
        };
        body.to_string()
    }

    /// Convert to status code and body tuple for HTTP response
    pub fn into_status_code_and_body(self) -> (StatusCode, String) {
        let status = self.status_code();
        let body = self.to_body();
        (status, body)
    }
}

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, RelayError>;
