use crate::auth::token;
use crate::db::models::{App, User};
use crate::error::{AuthError, ErrorKind, StoreError};
use async_trait::async_trait;
use chrono::Duration;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Persists a new user record. Fails with [`StoreError::UserExists`] when
/// the email is already taken; uniqueness is the store's job, not ours.
#[async_trait]
pub trait UserSaver: Send + Sync {
    async fn save_user(&self, email: &str, pass_hash: &str) -> Result<i64, StoreError>;
}

/// Read access to user records.
#[async_trait]
pub trait UserProvider: Send + Sync {
    async fn user_by_email(&self, email: &str) -> Result<User, StoreError>;
    async fn is_admin(&self, user_id: i64) -> Result<bool, StoreError>;
}

/// Read access to application records.
#[async_trait]
pub trait AppProvider: Send + Sync {
    async fn app(&self, app_id: i64) -> Result<App, StoreError>;
}

/// The authentication core: registration, login, and privilege lookup.
///
/// Stateless: holds only its dependencies and the token TTL, so concurrent
/// requests need no locking. All reclassification of store failures into
/// the domain error kinds happens here and nowhere else. Nothing is retried.
#[derive(Clone)]
pub struct AuthService {
    user_saver: Arc<dyn UserSaver>,
    user_provider: Arc<dyn UserProvider>,
    app_provider: Arc<dyn AppProvider>,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(
        user_saver: Arc<dyn UserSaver>,
        user_provider: Arc<dyn UserProvider>,
        app_provider: Arc<dyn AppProvider>,
        token_ttl: Duration,
    ) -> Self {
        Self {
            user_saver,
            user_provider,
            app_provider,
            token_ttl,
        }
    }

    /// Registers a new user and returns its store-assigned id.
    ///
    /// The password is hashed with bcrypt at the default cost on the
    /// blocking pool. A duplicate email surfaces as `UserAlreadyExists`;
    /// hash failures (e.g. a password over bcrypt's input limit) and any
    /// other store failure surface as `Internal`.
    pub async fn register(&self, email: &str, password: &str) -> Result<i64, AuthError> {
        const OP: &str = "auth.register";

        info!(email, "registering user");

        let password = password.to_owned();
        let pass_hash = tokio::task::spawn_blocking(move || {
            bcrypt::hash(password, bcrypt::DEFAULT_COST)
        })
        .await
        .map_err(|err| AuthError::internal(OP, err))?
        .map_err(|err| {
            error!(email, error = %err, "failed to hash password");
            AuthError::internal(OP, err)
        })?;

        match self.user_saver.save_user(email, &pass_hash).await {
            Ok(user_id) => {
                info!(email, user_id, "user registered");
                Ok(user_id)
            }
            Err(StoreError::UserExists) => {
                warn!(email, "user already exists");
                Err(AuthError::new(OP, ErrorKind::UserAlreadyExists))
            }
            Err(err) => {
                error!(email, error = %err, "failed to save user");
                Err(AuthError::internal(OP, err))
            }
        }
    }

    /// Authenticates a user and issues a token scoped to `app_id`.
    ///
    /// An unknown email and a wrong password both fail with
    /// `InvalidCredentials` so callers cannot probe which emails are
    /// registered. Credentials are checked before the app is resolved; an
    /// unknown app fails with the distinct `InvalidAppId`.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        app_id: i64,
    ) -> Result<String, AuthError> {
        const OP: &str = "auth.login";

        info!(email, app_id, "login attempt");

        let user = match self.user_provider.user_by_email(email).await {
            Ok(user) => user,
            Err(StoreError::UserNotFound) => {
                warn!(email, "login for unknown email");
                return Err(AuthError::new(OP, ErrorKind::InvalidCredentials));
            }
            Err(err) => {
                error!(email, error = %err, "failed to fetch user");
                return Err(AuthError::internal(OP, err));
            }
        };

        let password = password.to_owned();
        let pass_hash = user.pass_hash.clone();
        let password_matches =
            tokio::task::spawn_blocking(move || bcrypt::verify(password, &pass_hash))
                .await
                .map_err(|err| AuthError::internal(OP, err))?
                .map_err(|err| {
                    error!(email, error = %err, "failed to verify password");
                    AuthError::internal(OP, err)
                })?;

        if !password_matches {
            info!(email, "password mismatch");
            return Err(AuthError::new(OP, ErrorKind::InvalidCredentials));
        }

        let app = match self.app_provider.app(app_id).await {
            Ok(app) => app,
            Err(StoreError::AppNotFound) => {
                warn!(app_id, "login for unknown application");
                return Err(AuthError::new(OP, ErrorKind::InvalidAppId));
            }
            Err(err) => {
                error!(app_id, error = %err, "failed to fetch application");
                return Err(AuthError::internal(OP, err));
            }
        };

        let token = token::issue(&user, &app, self.token_ttl).map_err(|err| {
            error!(email, app_id, error = %err, "failed to sign token");
            AuthError::internal(OP, err)
        })?;

        info!(email, user_id = user.id, app_id, "user logged in");

        Ok(token)
    }

    /// Reports whether `user_id` holds the admin privilege.
    ///
    /// Unlike login, a missing user is reported openly as `UserNotFound`:
    /// the anti-enumeration rationale applies to the credential path only.
    pub async fn is_admin(&self, user_id: i64) -> Result<bool, AuthError> {
        const OP: &str = "auth.is_admin";

        info!(user_id, "checking admin privilege");

        match self.user_provider.is_admin(user_id).await {
            Ok(is_admin) => {
                info!(user_id, is_admin, "privilege checked");
                Ok(is_admin)
            }
            Err(StoreError::UserNotFound) => {
                warn!(user_id, "privilege check for unknown user");
                Err(AuthError::new(OP, ErrorKind::UserNotFound))
            }
            Err(err) => {
                error!(user_id, error = %err, "failed to check privilege");
                Err(AuthError::internal(OP, err))
            }
        }
    }
}
