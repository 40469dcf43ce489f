pub mod auth;
pub mod config;
pub mod db;
pub mod error;

use actix_web::HttpResponse;
use std::sync::Arc;

pub use error::{AppError, AuthError, ErrorKind, StoreError};
pub type Result<T> = std::result::Result<T, AppError>;
pub use config::Settings;

pub use auth::AuthService;
pub use db::{App, SqlStorage, User};

/// Health check endpoint handler
/// Returns a JSON response with server status and timestamp
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Application state shared across all components.
///
/// One [`SqlStorage`] instance satisfies all three capability traits the
/// authentication service consumes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub storage: Arc<SqlStorage>,
    pub auth_service: Arc<AuthService>,
}

impl AppState {
    pub async fn new(config: Settings) -> Result<Self> {
        let storage = SqlStorage::connect(&config.database.path, config.database.max_connections)
            .await?;
        storage.run_migrations().await?;
        let storage = Arc::new(storage);

        let token_ttl = chrono::Duration::seconds(config.auth.token_ttl_secs);
        let auth_service = Arc::new(AuthService::new(
            storage.clone(),
            storage.clone(),
            storage.clone(),
            token_ttl,
        ));

        Ok(Self {
            config: Arc::new(config),
            storage,
            auth_service,
        })
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.storage.close().await;
        Ok(())
    }
}
