use crate::error::AppError;
use crate::AppState;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub app_id: i64,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct AdminResponse {
    pub user_id: i64,
    pub is_admin: bool,
}

// Shape validation lives here, in front of the core: the service assumes
// its inputs are non-empty and only classifies what the store reports.

pub async fn register(
    req: web::Json<RegisterRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!(email = %req.email, "received registration request");

    if req.email.is_empty() {
        return Err(AppError::ValidationError("email is required".into()));
    }
    if req.password.is_empty() {
        return Err(AppError::ValidationError("password is required".into()));
    }

    match state.auth_service.register(&req.email, &req.password).await {
        Ok(user_id) => Ok(HttpResponse::Created().json(RegisterResponse { user_id })),
        Err(e) => {
            warn!(email = %req.email, error = %e, "registration failed");
            Err(e.into())
        }
    }
}

pub async fn login(
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!(email = %req.email, app_id = req.app_id, "received login request");

    if req.email.is_empty() {
        return Err(AppError::ValidationError("email is required".into()));
    }
    if req.password.is_empty() {
        return Err(AppError::ValidationError("password is required".into()));
    }
    if req.app_id == 0 {
        return Err(AppError::ValidationError("app id is required".into()));
    }

    match state
        .auth_service
        .login(&req.email, &req.password, req.app_id)
        .await
    {
        Ok(token) => Ok(HttpResponse::Ok().json(LoginResponse { token })),
        Err(e) => {
            warn!(email = %req.email, error = %e, "login failed");
            Err(e.into())
        }
    }
}

pub async fn is_admin(
    path: web::Path<i64>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    info!(user_id, "received admin privilege request");

    if user_id == 0 {
        return Err(AppError::ValidationError("user id is required".into()));
    }

    let is_admin = state.auth_service.is_admin(user_id).await?;
    Ok(HttpResponse::Ok().json(AdminResponse { user_id, is_admin }))
}
