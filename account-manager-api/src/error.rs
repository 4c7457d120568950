use serde::{Deserialize, Serialize};

/// Public API error envelope.
///
/// `success` is always `false`; `error` is a stable machine-readable code and
/// `message` is safe to show to end users.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            message: message.into(),
        }
    }
}
