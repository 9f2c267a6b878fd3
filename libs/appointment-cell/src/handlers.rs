use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{
    AppointmentError, CreateAppointmentRequest, DeleteAppointmentRequest,
    RescheduleAppointmentRequest, UpdateAppointmentRequest,
};
use crate::services::availability::AvailabilityService;
use crate::services::booking::AppointmentBookingService;

const EMAIL_WARNING: &str = "La cita se guardó pero el email no pudo enviarse";

fn map_error(e: AppointmentError) -> AppError {
    match e {
        AppointmentError::MissingFields
        | AppointmentError::InvalidDate
        | AppointmentError::InvalidTime
        | AppointmentError::InvalidEmail
        | AppointmentError::NotBookableWeekday => AppError::BadRequest(e.to_string()),
        AppointmentError::DayBlocked
        | AppointmentError::EmailTakenForDay
        | AppointmentError::Conflict => AppError::Conflict(e.to_string()),
        AppointmentError::ChairTaken(_) => AppError::Conflict(e.to_string()),
        AppointmentError::NotFound => AppError::NotFound(e.to_string()),
        AppointmentError::Database(msg) => AppError::Database(msg),
    }
}

fn parse_date_param(date: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest("Formato de fecha inválido (use YYYY-MM-DD)".to_string()))
}

/// Public booking endpoint. A failed confirmation email downgrades to a
/// warning in the response; the appointment itself is already stored.
#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(&state);
    let (appointment, email_sent) = service
        .create_appointment(request)
        .await
        .map_err(map_error)?;

    let mut body = json!({
        "success": true,
        "message": "Cita creada exitosamente",
        "id": appointment.id,
        "email_sent": email_sent
    });
    if !email_sent {
        body["warning"] = json!(EMAIL_WARNING);
    }

    Ok(Json(body))
}

/// Public availability view for one date.
#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<Arc<AppConfig>>,
    Path(date): Path<String>,
) -> Result<Json<Value>, AppError> {
    let date = parse_date_param(&date)?;
    let service = AvailabilityService::new(&state);
    let availability = service.evaluate_day(date).await.map_err(map_error)?;

    Ok(Json(json!({
        "success": true,
        "availability": availability
    })))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(&state);
    let appointments = service.list_appointments().await.map_err(map_error)?;

    Ok(Json(json!({
        "success": true,
        "appointments": appointments
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(&state);
    let appointment = service
        .get_appointment(appointment_id)
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

/// Administrative day view: every record for the date, cancelled included.
#[axum::debug_handler]
pub async fn appointments_by_date(
    State(state): State<Arc<AppConfig>>,
    Path(date): Path<String>,
) -> Result<Json<Value>, AppError> {
    let date = parse_date_param(&date)?;
    let service = AppointmentBookingService::new(&state);
    let appointments = service
        .appointments_by_date(date)
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "success": true,
        "appointments": appointments
    })))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(&state);
    let appointment = service
        .update_appointment(appointment_id, request)
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Cita actualizada correctamente",
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(&state);
    let (appointment, email_sent) = service
        .reschedule_appointment(appointment_id, request)
        .await
        .map_err(map_error)?;

    let mut body = json!({
        "success": true,
        "message": "Cita modificada correctamente",
        "appointment": appointment,
        "email_sent": email_sent
    });
    if !email_sent {
        body["warning"] = json!(EMAIL_WARNING);
    }

    Ok(Json(body))
}

/// The body is optional: a bare DELETE cancels without a stated reason.
#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let request: DeleteAppointmentRequest = if body.is_empty() {
        DeleteAppointmentRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|_| AppError::BadRequest("Cuerpo JSON inválido".to_string()))?
    };

    let service = AppointmentBookingService::new(&state);
    let email_sent = service
        .delete_appointment(appointment_id, request.reason)
        .await
        .map_err(map_error)?;

    let mut body = json!({
        "success": true,
        "message": "Cita eliminada correctamente",
        "email_sent": email_sent
    });
    if !email_sent {
        body["warning"] = json!("La cita se eliminó pero el email no pudo enviarse");
    }

    Ok(Json(body))
}
