// src/handlers/auth.rs

use account_manager_api::{
    LoginRequest, LoginResponse, RefreshTokenRequest, TokenPairResponse, UserResponse,
};
use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use tower_cookies::{Cookie, Cookies};

use crate::app::AppState;
use crate::auth::extractors::AuthClaims;
use crate::auth::services::RegisterForm;
use crate::auth::tokens::TokenPair;
use crate::error::AppError;
use crate::media::TempUpload;
use crate::response::AppResponse;

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// POST /api/v1/users/register
/// Inscription (multipart: champs texte + fichiers `avatar` et `coverImage`)
pub async fn register(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<AppResponse<UserResponse>, AppError> {
    let mut form = RegisterForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "avatar" | "coverImage" => {
                let file_name = field.file_name().unwrap_or(&name).to_string();
                let content_type = field.content_type().map(str::to_owned);
                let bytes = field.bytes().await?;
                if bytes.is_empty() {
                    continue;
                }

                let upload = TempUpload::write(&state.upload_dir, &file_name, content_type, &bytes)
                    .map_err(|e| AppError::internal(format!("Failed to store upload: {e}")))?;

                if name == "avatar" {
                    form.avatar = Some(upload);
                } else {
                    form.cover_image = Some(upload);
                }
            }
            "fullName" => form.fields.full_name = Some(field.text().await?),
            "email" => form.fields.email = Some(field.text().await?),
            "username" => form.fields.username = Some(field.text().await?),
            "password" => form.fields.password = Some(field.text().await?),
            other => tracing::debug!(field = other, "Ignoring unknown multipart field"),
        }
    }

    let user = state.auth.register(form).await?;
    Ok(AppResponse::created(user).with_message("User registered successfully"))
}

/// POST /api/v1/users/login
/// Connexion: renvoie les tokens et les pose en cookies
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<AppResponse<LoginResponse>, AppError> {
    let Json(payload) = payload?;

    let response = state.auth.login(&payload)?;

    set_token_cookies(
        &cookies,
        &TokenPair {
            access_token: response.access_token.clone(),
            refresh_token: response.refresh_token.clone(),
        },
        state.cookie_secure,
    );

    Ok(AppResponse::ok(response).with_message("User logged in successfully"))
}

/// POST /api/v1/users/logout
/// Déconnexion: efface le refresh token stocké et les cookies
pub async fn logout(
    claims: AuthClaims,
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<AppResponse<serde_json::Value>, AppError> {
    state.auth.logout(claims.sub)?;

    // Cookie de suppression explicite: `remove` n'émet rien si le client n'a pas envoyé le cookie
    for name in [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE] {
        let mut cookie = Cookie::build((name, ""))
            .http_only(true)
            .secure(state.cookie_secure)
            .path("/")
            .build();
        cookie.make_removal();
        cookies.add(cookie);
    }

    Ok(AppResponse::ok(serde_json::json!({})).with_message("User logged out"))
}

/// POST /api/v1/users/refresh-token
/// Rotation des tokens: refresh token lu depuis le cookie, sinon depuis le body
pub async fn refresh_token(
    State(state): State<AppState>,
    cookies: Cookies,
    body: Bytes,
) -> Result<AppResponse<TokenPairResponse>, AppError> {
    let from_cookie = cookies
        .get(REFRESH_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty());

    let presented = match from_cookie {
        Some(token) => token,
        None if body.is_empty() => return Err(AppError::MissingToken),
        None => serde_json::from_slice::<RefreshTokenRequest>(&body)?
            .refresh_token
            .ok_or(AppError::MissingToken)?,
    };

    let pair = state.auth.refresh(&presented)?;
    set_token_cookies(&cookies, &pair, state.cookie_secure);

    Ok(AppResponse::ok(TokenPairResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    })
    .with_message("Access token refreshed"))
}

fn set_token_cookies(cookies: &Cookies, pair: &TokenPair, secure: bool) {
    for (name, value) in [
        (ACCESS_TOKEN_COOKIE, &pair.access_token),
        (REFRESH_TOKEN_COOKIE, &pair.refresh_token),
    ] {
        cookies.add(
            Cookie::build((name, value.clone()))
                .http_only(true)
                .secure(secure)
                .path("/")
                .build(),
        );
    }
}
