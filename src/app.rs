// src/app.rs

use std::any::Any;
use std::path::PathBuf;
use std::sync::Arc;

use account_manager_api::ErrorResponse;
use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_cookies::CookieManagerLayer;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::services::AuthService;
use crate::handlers::auth::{login, logout, refresh_token, register};
use crate::handlers::health::health;
use crate::handlers::user::get_current_user;

/// État partagé par tous les handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub upload_dir: PathBuf,
    pub cookie_secure: bool,
}

/// Paramètres HTTP de l'application
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub cors_origin: Option<String>,
    pub max_upload_bytes: usize,
}

/// Configure les routes utilisateur
pub fn user_routes(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route(
            "/register",
            post(register).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/login", post(login))
        .route("/refresh-token", post(refresh_token))
        // Routes protégées: l'extracteur AuthClaims lit l'état
        .route("/logout", post(logout))
        .route("/current-user", get(get_current_user))
        .with_state(state)
}

/// Construit l'application complète
pub fn build_router(state: AppState, settings: &HttpSettings) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .nest("/api/v1/users", user_routes(state, settings.max_upload_bytes))
        .layer(CookieManagerLayer::new())
        .layer(CatchPanicLayer::custom(panic_response))
        // Middleware global de tracing
        .layer(TraceLayer::new_for_http());

    match cors_layer(settings.cors_origin.as_deref()) {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

fn cors_layer(origin: Option<&str>) -> Option<CorsLayer> {
    let origin = origin?;
    let Ok(origin) = HeaderValue::from_str(origin) else {
        tracing::warn!(origin, "Invalid CORS origin, CORS disabled");
        return None;
    };

    Some(
        CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
    )
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(detail, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(
            "INTERNAL_ERROR",
            "An internal server error occurred",
        )),
    )
        .into_response()
}
