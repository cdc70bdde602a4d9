use reqwest::StatusCode;

/// Errors from the client layer.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (connection refused, DNS, TLS, bad body).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// The server's `error` field, or a generic message naming the status.
        message: String,
    },

    /// Reading or writing the token file failed.
    #[error("Session storage error: {0}")]
    Session(#[from] std::io::Error),
}

impl ClientError {
    /// Whether the server rejected the credentials or token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Api { status, .. } if *status == StatusCode::UNAUTHORIZED.as_u16())
    }

    /// Whether the server reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Api { status, .. } if *status == StatusCode::NOT_FOUND.as_u16())
    }
}
