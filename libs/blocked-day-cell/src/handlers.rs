use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{BlockDayRequest, BlockedDayError};
use crate::services::registry::BlockedDayRegistry;

fn map_error(e: BlockedDayError) -> AppError {
    match e {
        BlockedDayError::MissingDate
        | BlockedDayError::InvalidDate
        | BlockedDayError::NotFriday => AppError::BadRequest(e.to_string()),
        BlockedDayError::AlreadyBlocked => AppError::Conflict(e.to_string()),
        BlockedDayError::NotFound => AppError::NotFound(e.to_string()),
        BlockedDayError::Database(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn list_blocked_days(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let registry = BlockedDayRegistry::new(&state);
    let days = registry.list().await.map_err(map_error)?;

    Ok(Json(json!({
        "success": true,
        "blocked_days": days
    })))
}

#[axum::debug_handler]
pub async fn block_day(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<BlockDayRequest>,
) -> Result<Json<Value>, AppError> {
    let registry = BlockedDayRegistry::new(&state);
    let blocked = registry.block(request).await.map_err(map_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Día vetado exitosamente",
        "id": blocked.id
    })))
}

#[axum::debug_handler]
pub async fn unblock_day(
    State(state): State<Arc<AppConfig>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let registry = BlockedDayRegistry::new(&state);
    registry.unblock(id).await.map_err(map_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Día desvetado correctamente"
    })))
}
