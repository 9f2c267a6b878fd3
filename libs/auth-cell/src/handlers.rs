use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_models::session::AdminSession;
use shared_utils::token::SESSION_TTL_HOURS;

use crate::models::{AuthError, ChangePasswordRequest, CreateAdminRequest, LoginRequest};
use crate::services::accounts::AdminAccountService;

fn map_error(e: AuthError) -> AppError {
    match e {
        AuthError::MissingFields
        | AuthError::PasswordTooShort(_)
        | AuthError::NewPasswordTooShort(_) => AppError::BadRequest(e.to_string()),
        AuthError::UserNotFound | AuthError::WrongPassword | AuthError::WrongCurrentPassword => {
            AppError::Auth(e.to_string())
        }
        AuthError::UserExists => AppError::Conflict(e.to_string()),
        AuthError::Token(msg) | AuthError::Hashing(msg) => AppError::Internal(msg),
        AuthError::Database(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AdminAccountService::new(&state);
    let (token, admin) = service.login(request).await.map_err(map_error)?;

    Ok(Json(json!({
        "success": true,
        "token": token,
        "admin": admin,
        "expires_in_hours": SESSION_TTL_HOURS
    })))
}

/// Sessions are stateless; logout exists so the client has a uniform
/// endpoint to call while discarding its token.
#[axum::debug_handler]
pub async fn logout() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Sesión cerrada"
    }))
}

#[axum::debug_handler]
pub async fn change_password(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AdminAccountService::new(&state);
    service.change_password(request).await.map_err(map_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Contraseña actualizada correctamente"
    })))
}

/// Echo of the session injected by the admin middleware. The client uses
/// it to re-validate a stored token on page load.
#[axum::debug_handler]
pub async fn current_session(Extension(session): Extension<AdminSession>) -> Json<Value> {
    Json(json!({
        "success": true,
        "session": session
    }))
}

#[axum::debug_handler]
pub async fn list_admins(State(state): State<Arc<AppConfig>>) -> Result<Json<Value>, AppError> {
    let service = AdminAccountService::new(&state);
    let admins = service.list_admins().await.map_err(map_error)?;

    Ok(Json(json!({
        "success": true,
        "administrators": admins
    })))
}

#[axum::debug_handler]
pub async fn create_admin(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<CreateAdminRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AdminAccountService::new(&state);
    let admin = service.create_admin(request).await.map_err(map_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Administrador creado correctamente",
        "admin": admin
    })))
}
