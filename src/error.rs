// src/error.rs

use account_manager_api::ErrorResponse;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Catégorie d'une erreur, indépendante du code HTTP exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    Unauthenticated,
    Upstream,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppError {
    // === Erreurs Repository ===
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    Duplicate(String),
    #[error("Database error: {0}")]
    DatabaseError(String),

    // === Erreurs d'Authentification ===
    #[error("Invalid user credentials")]
    InvalidPassword,
    #[error("User with the same email or username already exists")]
    UserAlreadyExists,
    #[error("Unauthorized request")]
    MissingToken,
    #[error("Invalid access token")]
    InvalidAccessToken,
    #[error("Invalid refresh token")]
    InvalidRefreshToken,
    #[error("Refresh token expired")]
    RefreshTokenExpired,
    #[error("Refresh token is expired or used")]
    TokenMismatch,

    // === Erreurs de Hashing/Cryptographie ===
    #[error("Password hashing failed: {0}")]
    PasswordHashingFailed(String),
    #[error("Token generation failed: {0}")]
    TokenGenerationFailed(String),

    // === Erreurs de Validation ===
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Invalid email format")]
    InvalidEmail,
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // === Erreurs de services externes ===
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    // === Erreurs internes ===
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, message, internal_detail) = self.get_error_info();

        if let Some(ref detail) = internal_detail {
            tracing::error!(error_code, %status, detail, "Internal server error");
        } else {
            tracing::debug!(error_code, kind = ?self.kind(), %status, %message, "Request rejected");
        }

        (status, Json(ErrorResponse::new(error_code, message))).into_response()
    }
}

impl AppError {
    /// Récupère les informations d'erreur formatées pour la réponse HTTP
    fn get_error_info(&self) -> (StatusCode, &'static str, String, Option<String>) {
        match self {
            // 404 Not Found
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),

            // 409 Conflict
            AppError::Duplicate(msg) => {
                (StatusCode::CONFLICT, "DUPLICATE_ENTRY", msg.clone(), None)
            }
            AppError::UserAlreadyExists => (
                StatusCode::CONFLICT,
                "USER_EXISTS",
                self.to_string(),
                None,
            ),

            // 401 Unauthorized
            AppError::InvalidPassword => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                self.to_string(),
                None,
            ),
            AppError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "MISSING_TOKEN",
                self.to_string(),
                None,
            ),
            AppError::InvalidAccessToken | AppError::InvalidRefreshToken => (
                StatusCode::UNAUTHORIZED,
                "INVALID_TOKEN",
                self.to_string(),
                None,
            ),
            AppError::RefreshTokenExpired => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_EXPIRED",
                self.to_string(),
                None,
            ),
            AppError::TokenMismatch => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_MISMATCH",
                self.to_string(),
                None,
            ),

            // 400 Bad Request
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                None,
            ),
            AppError::InvalidEmail => (
                StatusCode::BAD_REQUEST,
                "INVALID_EMAIL",
                self.to_string(),
                None,
            ),
            AppError::InvalidInput(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT", msg.clone(), None)
            }

            // 500 Internal Server Error
            AppError::UploadFailed(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "UPLOAD_FAILED",
                "Failed to upload avatar image".to_string(),
                Some(msg.clone()),
            ),
            AppError::PasswordHashingFailed(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "HASHING_ERROR",
                "An error occurred while processing your request".to_string(),
                Some(msg.clone()),
            ),
            AppError::TokenGenerationFailed(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "TOKEN_ERROR",
                "Something went wrong while generating tokens".to_string(),
                Some(msg.clone()),
            ),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "An error occurred with the database".to_string(),
                Some(msg.clone()),
            ),
            AppError::InternalServerError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal server error occurred".to_string(),
                Some(msg.clone()),
            ),
        }
    }

    /// Catégorie de l'erreur
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::ValidationError(_) | AppError::InvalidEmail | AppError::InvalidInput(_) => {
                ErrorKind::Validation
            }
            AppError::Duplicate(_) | AppError::UserAlreadyExists => ErrorKind::Conflict,
            AppError::NotFound(_)
            | AppError::InvalidPassword
            | AppError::MissingToken
            | AppError::InvalidAccessToken
            | AppError::InvalidRefreshToken
            | AppError::RefreshTokenExpired
            | AppError::TokenMismatch => ErrorKind::Unauthenticated,
            AppError::DatabaseError(_)
            | AppError::UploadFailed(_)
            | AppError::PasswordHashingFailed(_)
            | AppError::TokenGenerationFailed(_)
            | AppError::InternalServerError(_) => ErrorKind::Upstream,
        }
    }

    /// Retourne le code de statut HTTP
    pub fn status_code(&self) -> StatusCode {
        self.get_error_info().0
    }

    // === Constructeurs helpers ===
    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        AppError::DatabaseError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::InternalServerError(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::ValidationError(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        AppError::InvalidInput(msg.into())
    }

    pub fn upload_failed(msg: impl Into<String>) -> Self {
        AppError::UploadFailed(msg.into())
    }
}

// === Conversions automatiques depuis d'autres types d'erreurs ===

impl From<crate::db::error::RepositoryError> for AppError {
    fn from(err: crate::db::error::RepositoryError) -> Self {
        use crate::db::error::RepositoryError;

        match err {
            RepositoryError::UniqueViolation(msg) => AppError::Duplicate(msg),
            RepositoryError::PoolError(msg) | RepositoryError::DatabaseError(msg) => {
                AppError::database(msg)
            }
        }
    }
}

// Depuis JwtError: seules les erreurs de signature sont exposées au client
impl From<crate::auth::jwt::JwtError> for AppError {
    fn from(err: crate::auth::jwt::JwtError) -> Self {
        use crate::auth::jwt::JwtError;

        match err {
            JwtError::GenerationFailed(e) => AppError::TokenGenerationFailed(e.to_string()),
            JwtError::Expired => AppError::RefreshTokenExpired,
            JwtError::VerificationFailed(_) => AppError::InvalidRefreshToken,
        }
    }
}

impl From<crate::auth::password::PasswordError> for AppError {
    fn from(err: crate::auth::password::PasswordError) -> Self {
        AppError::PasswordHashingFailed(err.to_string())
    }
}

impl From<crate::media::MediaError> for AppError {
    fn from(err: crate::media::MediaError) -> Self {
        AppError::upload_failed(err.to_string())
    }
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(err: axum::extract::rejection::JsonRejection) -> Self {
        AppError::invalid_input(format!("Invalid JSON: {err}"))
    }
}

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        AppError::invalid_input(format!("Invalid multipart body: {err}"))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::invalid_input(format!("JSON error: {err}"))
    }
}
