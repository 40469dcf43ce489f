use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use std::fmt;
use thiserror::Error;

/// Domain-level error classification for the authentication service.
///
/// The `Display` text of each kind is the message callers are allowed to
/// see. `InvalidCredentials` never reveals whether the email exists;
/// `Internal` reveals nothing at all (details stay in server-side logs).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("unknown application id")]
    InvalidAppId,

    #[error("user already exists")]
    UserAlreadyExists,

    #[error("user not found")]
    UserNotFound,

    #[error("internal error")]
    Internal,
}

/// Error returned by [`crate::auth::AuthService`] operations.
///
/// Carries the kind, the operation that produced it, and an optional cause,
/// so callers match on structure instead of parsing message strings.
#[derive(Debug)]
pub struct AuthError {
    kind: ErrorKind,
    op: &'static str,
    source: Option<anyhow::Error>,
}

impl AuthError {
    pub fn new(op: &'static str, kind: ErrorKind) -> Self {
        Self { kind, op, source: None }
    }

    pub fn internal(op: &'static str, source: impl Into<anyhow::Error>) -> Self {
        Self {
            kind: ErrorKind::Internal,
            op,
            source: Some(source.into()),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn op(&self) -> &'static str {
        self.op
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The cause is deliberately not formatted here; it stays reachable
        // through `source()` for logging.
        write!(f, "{}: {}", self.op, self.kind)
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|cause| -> &(dyn std::error::Error + 'static) { cause.as_ref() })
    }
}

/// Low-level failures raised by the credential store. The authentication
/// service is the only place these are reclassified into [`ErrorKind`]s.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("user already exists")]
    UserExists,

    #[error("user not found")]
    UserNotFound,

    #[error("application not found")]
    AppNotFound,

    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("database failure: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("authentication error: {0}")]
    AuthError(#[from] AuthError),

    #[error("database error: {0}")]
    DatabaseError(#[from] StoreError),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("internal server error: {0}")]
    InternalError(String),

    #[error("validation error: {0}")]
    ValidationError(String),
}

// Implement conversion from config::ConfigError
impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

// Add conversion from std::io::Error
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(err.to_string())
    }
}

// Implement actix_web::ResponseError for AppError
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        // Only the non-leaking message leaves the process; operation names
        // and causes stay in logs.
        let message = match self {
            AppError::AuthError(e) => e.kind().to_string(),
            AppError::ValidationError(msg) => msg.clone(),
            _ => ErrorKind::Internal.to_string(),
        };
        let response = json!({
            "error": {
                "status": status.as_u16(),
                "message": message
            }
        });
        HttpResponse::build(status).json(response)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::AuthError(e) => match e.kind() {
                ErrorKind::InvalidCredentials => StatusCode::UNAUTHORIZED,
                ErrorKind::InvalidAppId => StatusCode::BAD_REQUEST,
                ErrorKind::UserAlreadyExists => StatusCode::CONFLICT,
                ErrorKind::UserNotFound => StatusCode::NOT_FOUND,
                ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
