use serde::{Deserialize, Serialize};

/// HTTP status codes represented as an enum
/// This is WASM-compatible and doesn't depend on axum::http::StatusCode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusCode {
    Ok = 200,
    Created = 201,
    BadRequest = 400,
    Unauthorized = 401,
    NotFound = 404,
    Conflict = 409,
    InternalServerError = 500,
}

impl StatusCode {
    pub fn as_u16(self) -> u16 {
        self as u16
    }
}

/// Success envelope shared by every endpoint.
///
/// The backend wraps this in a type that implements Axum's IntoResponse trait.
///
/// # Examples
///
/// ```rust
/// use account_manager_api::{AppResponse, StatusCode};
///
/// let response = AppResponse::ok("data").with_message("Fetched");
/// assert!(response.success);
///
/// let response = AppResponse::created("new_resource");
/// assert_eq!(response.status, StatusCode::Created);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppResponse<T> {
    pub success: bool,
    pub status: StatusCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub message: String,
}

impl<T> AppResponse<T> {
    /// Creates a new response with a status code and data
    pub fn new(status: StatusCode, data: T) -> Self {
        Self {
            success: true,
            status,
            data: Some(data),
            message: "Success".to_string(),
        }
    }

    /// Replaces the default message
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// 200 OK with data
    pub fn ok(data: T) -> Self {
        Self::new(StatusCode::Ok, data)
    }

    /// 201 Created with data
    pub fn created(data: T) -> Self {
        Self::new(StatusCode::Created, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
    struct TestData {
        message: String,
    }

    #[test]
    fn test_ok_response() {
        let data = TestData {
            message: "success".to_string(),
        };
        let response = AppResponse::ok(data.clone());
        assert_eq!(response.status, StatusCode::Ok);
        assert_eq!(response.data, Some(data));
        assert!(response.success);
    }

    #[test]
    fn test_created_response() {
        let response = AppResponse::created(TestData {
            message: "created".to_string(),
        });
        assert_eq!(response.status, StatusCode::Created);
        assert_eq!(response.status.as_u16(), 201);
    }

    #[test]
    fn test_with_message() {
        let response = AppResponse::ok(()).with_message("User logged out");
        assert_eq!(response.message, "User logged out");
    }

    #[test]
    fn test_serialization() {
        let response = AppResponse::ok(TestData {
            message: "test".to_string(),
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["message"], "test");
        assert_eq!(json["message"], "Success");
    }
}
