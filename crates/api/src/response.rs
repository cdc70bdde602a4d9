//! Shared response bodies for API handlers.

use serde::Serialize;

/// `{ "message": "..." }` acknowledgement returned by delete, logout and
/// attach/detach endpoints.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
