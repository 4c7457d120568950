use account_manager_api::{AppResponse as ApiResponse, StatusCode as ApiStatusCode};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Backend wrapper for account-manager-api's AppResponse that adds Axum integration.
///
/// The whole envelope (`success`, `status`, `data`, `message`) is written as
/// the JSON body and the HTTP status mirrors `status`.
///
/// # Examples
///
/// ```rust,ignore
/// use crate::response::AppResponse;
///
/// AppResponse::ok(user_data).with_message("User fetched")
/// AppResponse::created(new_user)
/// ```
pub struct AppResponse<T> {
    inner: ApiResponse<T>,
}

impl<T> AppResponse<T>
where
    T: Serialize,
{
    /// 200 OK with data
    pub fn ok(data: T) -> Self {
        Self {
            inner: ApiResponse::ok(data),
        }
    }

    /// 201 Created with data
    pub fn created(data: T) -> Self {
        Self {
            inner: ApiResponse::created(data),
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.inner = self.inner.with_message(message);
        self
    }
}

/// Converts API StatusCode to Axum's StatusCode
fn convert_status(api_status: ApiStatusCode) -> StatusCode {
    StatusCode::from_u16(api_status.as_u16()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Implements Axum's IntoResponse trait for our wrapper
impl<T> IntoResponse for AppResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        let status = convert_status(self.inner.status);
        (status, Json(self.inner)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct TestData {
        message: String,
    }

    #[test]
    fn test_status_conversion() {
        assert_eq!(convert_status(ApiStatusCode::Ok), StatusCode::OK);
        assert_eq!(convert_status(ApiStatusCode::Created), StatusCode::CREATED);
        assert_eq!(
            convert_status(ApiStatusCode::Unauthorized),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            convert_status(ApiStatusCode::InternalServerError),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn created_response_writes_envelope() {
        let response = AppResponse::created(TestData {
            message: "created".to_string(),
        })
        .with_message("User registered successfully")
        .into_response();

        assert_eq!(response.status(), StatusCode::CREATED);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["message"], "created");
        assert_eq!(body["message"], "User registered successfully");
    }
}
