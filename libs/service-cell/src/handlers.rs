use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{CreateServiceRequest, ServiceError};
use crate::services::catalog::ServiceCatalog;

fn map_error(e: ServiceError) -> AppError {
    match e {
        ServiceError::MissingTitle => AppError::BadRequest(e.to_string()),
        ServiceError::Database(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn list_services(State(state): State<Arc<AppConfig>>) -> Result<Json<Value>, AppError> {
    let catalog = ServiceCatalog::new(&state);
    let services = catalog.list().await.map_err(map_error)?;

    Ok(Json(json!({
        "success": true,
        "services": services
    })))
}

#[axum::debug_handler]
pub async fn create_service(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<CreateServiceRequest>,
) -> Result<Json<Value>, AppError> {
    let catalog = ServiceCatalog::new(&state);
    let service = catalog.create(request).await.map_err(map_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Servicio creado correctamente",
        "service": service
    })))
}
