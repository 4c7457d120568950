use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use tower_cookies::Cookies;

use crate::app::AppState;
use crate::auth::jwt::Claims;
use crate::error::AppError;
use crate::handlers::auth::ACCESS_TOKEN_COOKIE;

/// Extracteur d'authentification pour les routes protégées.
/// Lit l'access token depuis `Authorization: Bearer <JWT>` ou, à défaut,
/// depuis le cookie `accessToken`, puis le vérifie via le `TokenService`.
#[derive(Debug, Clone)]
pub struct AuthClaims {
    pub sub: uuid::Uuid,
}

impl From<Claims> for AuthClaims {
    fn from(c: Claims) -> Self {
        Self { sub: c.sub }
    }
}

impl FromRequestParts<AppState> for AuthClaims {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = match bearer_token(parts)? {
            Some(token) => token,
            None => Cookies::from_request_parts(parts, state)
                .await
                .map_err(|(_, msg)| AppError::internal(msg))?
                .get(ACCESS_TOKEN_COOKIE)
                .map(|cookie| cookie.value().to_string())
                .filter(|value| !value.is_empty())
                .ok_or(AppError::MissingToken)?,
        };

        // Vérifie et décode le token
        let claims = state.auth.tokens().verify_access(&token)?;

        Ok(AuthClaims::from(claims))
    }
}

fn bearer_token(parts: &Parts) -> Result<Option<String>, AppError> {
    const BEARER: &str = "Bearer ";

    let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::InvalidAccessToken)?;

    // Doit être de type Bearer
    auth_str
        .strip_prefix(BEARER)
        .map(|token| Some(token.trim().to_string()))
        .ok_or(AppError::InvalidAccessToken)
}
