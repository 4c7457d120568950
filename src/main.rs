use std::env;
use std::sync::Arc;

mod app;
mod auth;
mod config;
mod db;
mod error;
mod handlers;
mod media;
mod response;

use app::{AppState, HttpSettings, build_router};
use auth::jwt::JwtManager;
use auth::services::AuthService;
use auth::tokens::TokenService;
use config::{Config, StorageBackend};
use db::repositories::{InMemoryUserRepository, PgUserRepository};
use db::store::UserStore;
use media::cloudinary::CloudinaryUploader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub fn setup_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // Si RUST_LOG n'est pas défini, utiliser ces règles par défaut
        tracing_subscriber::EnvFilter::new(
            "info,account_manager=debug,hyper_util=warn,tower_http=info",
        )
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn build_store(config: &Config) -> anyhow::Result<Arc<dyn UserStore>> {
    match config.storage_backend {
        StorageBackend::Postgres => {
            let pool =
                db::connection::create_pool(&config.database_url, db::connection::DEFAULT_POOL_SIZE)?;
            Ok(Arc::new(PgUserRepository::new(pool)))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory user store: accounts are lost on restart");
            Ok(Arc::new(InMemoryUserRepository::new()))
        }
    }
}

fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let store = build_store(config)?;

    let tokens = TokenService::new(
        JwtManager::new(
            &config.access_token_secret,
            chrono::Duration::minutes(config.access_token_expiry_minutes),
        ),
        JwtManager::new(
            &config.refresh_token_secret,
            chrono::Duration::days(config.refresh_token_expiry_days),
        ),
        store.clone(),
    );
    let uploader = Arc::new(CloudinaryUploader::new(config.cloudinary.clone()));

    std::fs::create_dir_all(&config.upload_dir)?;

    Ok(AppState {
        auth: Arc::new(AuthService::new(store, uploader, tokens)),
        upload_dir: config.upload_dir.clone(),
        cookie_secure: config.cookie_secure,
    })
}

// ----------------- Main -----------------

#[tokio::main]
async fn main() -> Result<(), lambda_http::Error> {
    // Initialize logging for all environments
    setup_logging();
    tracing::info!("Starting account-manager...");

    let config = Config::from_env()?;
    if !config.is_production() && !config.cookie_secure {
        tracing::warn!("COOKIE_SECURE=false: token cookies will be sent over plain HTTP");
    }

    let state = build_state(&config)?;
    let app = build_router(
        state,
        &HttpSettings {
            cors_origin: config.cors_origin.clone(),
            max_upload_bytes: config.max_upload_bytes,
        },
    );

    if env::var("AWS_LAMBDA_FUNCTION_NAME").is_ok() {
        tracing::info!("Running in Lambda mode");
        lambda_http::run(app).await
    } else {
        tracing::info!("Running in local HTTP server mode");
        let addr = format!("{}:{}", config.server_host, config.server_port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!("🚀 Server running at http://{}", addr);
        axum::serve(listener, app).await?;

        Ok(())
    }
}
