use std::sync::{Arc, OnceLock};

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{DbError, PostgrestClient};
use shared_models::slots::is_bookable_weekday;

use notification_cell::models::{CancellationNotice, ConfirmationNotice, RescheduleNotice};
use notification_cell::NotificationService;

use crate::models::{
    hhmm_time, Appointment, AppointmentError, AppointmentStatus, CreateAppointmentRequest,
    RescheduleAppointmentRequest, UpdateAppointmentRequest,
};
use crate::services::availability::{email_has_appointment, is_slot_free, AvailabilityService};

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"))
}

/// CRUD over appointment records, enforcing the slot and email-per-day
/// invariants at create and reschedule time. Notifications are best-effort
/// side effects; their failure is reported as a warning flag, never as an
/// error.
pub struct AppointmentBookingService {
    postgrest: Arc<PostgrestClient>,
    availability: AvailabilityService,
    notifier: NotificationService,
    enforce_weekday: bool,
}

impl AppointmentBookingService {
    pub fn new(config: &AppConfig) -> Self {
        let postgrest = Arc::new(PostgrestClient::new(config));
        Self {
            availability: AvailabilityService::with_client(Arc::clone(&postgrest)),
            notifier: NotificationService::new(config),
            enforce_weekday: config.enforce_weekday_on_booking,
            postgrest,
        }
    }

    /// Create a pending appointment. Returns the persisted record and
    /// whether the confirmation email went out.
    pub async fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
    ) -> Result<(Appointment, bool), AppointmentError> {
        let name = request.name.trim().to_string();
        let email = request.email.trim().to_string();

        if request.date.trim().is_empty()
            || request.time.trim().is_empty()
            || name.is_empty()
            || email.is_empty()
        {
            return Err(AppointmentError::MissingFields);
        }

        let date = parse_date(&request.date)?;
        let time = parse_time(&request.time)?;

        if !email_regex().is_match(&email) {
            return Err(AppointmentError::InvalidEmail);
        }

        if self.enforce_weekday && !is_bookable_weekday(date) {
            return Err(AppointmentError::NotBookableWeekday);
        }

        if self.availability.is_day_blocked(date).await? {
            return Err(AppointmentError::DayBlocked);
        }

        let day_rows = self.availability.day_appointments(date).await?;

        if email_has_appointment(&email, &day_rows, None) {
            return Err(AppointmentError::EmailTakenForDay);
        }

        if let Some(chair) = request.chair {
            if !is_slot_free(time, chair, &day_rows, None) {
                return Err(AppointmentError::ChairTaken(chair));
            }
        }

        let notes = request
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let row = json!({
            "date": date,
            "time": time.format("%H:%M").to_string(),
            "name": name,
            "email": email,
            "chair": request.chair,
            "notes": notes,
            "status": AppointmentStatus::Pending,
        });

        let appointment: Appointment = self
            .postgrest
            .insert_returning("appointments", row)
            .await
            .map_err(map_insert_error)?;

        info!(
            "Appointment {} created for {} on {} at {}",
            appointment.id, appointment.email, appointment.date, request.time
        );

        let email_sent = self
            .notifier
            .send_confirmation(&ConfirmationNotice {
                name: appointment.name.clone(),
                email: appointment.email.clone(),
                date: appointment.date,
                time: appointment.time.format("%H:%M").to_string(),
                chair: appointment.chair.map(|c| c.to_string()),
            })
            .await;

        if !email_sent {
            warn!(
                "Confirmation email for appointment {} could not be delivered",
                appointment.id
            );
        }

        Ok((appointment, email_sent))
    }

    /// Non-cancelled appointments, newest session first.
    pub async fn list_appointments(&self) -> Result<Vec<Appointment>, AppointmentError> {
        self.postgrest
            .request(
                Method::GET,
                "/rest/v1/appointments?status=neq.cancelada&order=date.desc,time.desc",
                None,
            )
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))
    }

    pub async fn get_appointment(&self, id: Uuid) -> Result<Appointment, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", id);
        let mut rows: Vec<Appointment> = self
            .postgrest
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        rows.pop().ok_or(AppointmentError::NotFound)
    }

    /// Administrative day view: every record for the date, cancelled
    /// included, time ascending.
    pub async fn appointments_by_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!("/rest/v1/appointments?date=eq.{}&order=time.asc", date);
        self.postgrest
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))
    }

    /// Direct field update (status, optional chair/notes). No conflict
    /// re-check: the caller owns the consequences, as in the original
    /// administrative flow.
    pub async fn update_appointment(
        &self,
        id: Uuid,
        request: UpdateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let mut fields = serde_json::Map::new();
        fields.insert("status".to_string(), json!(request.status));
        if let Some(chair) = request.chair {
            fields.insert("chair".to_string(), json!(chair));
        }
        if let Some(notes) = request.notes {
            fields.insert("notes".to_string(), json!(notes.trim()));
        }

        debug!("Updating appointment {}: {:?}", id, fields);
        self.patch_returning(id, serde_json::Value::Object(fields))
            .await
    }

    /// Move an appointment to a new (date, time, chair). The target slot
    /// must satisfy the same invariants as a fresh booking, with the
    /// record being moved excluded from the checks.
    pub async fn reschedule_appointment(
        &self,
        id: Uuid,
        request: RescheduleAppointmentRequest,
    ) -> Result<(Appointment, bool), AppointmentError> {
        if request.date.trim().is_empty() || request.time.trim().is_empty() {
            return Err(AppointmentError::MissingFields);
        }

        let new_date = parse_date(&request.date)?;
        let new_time = parse_time(&request.time)?;

        let current = self.get_appointment(id).await?;

        if self.enforce_weekday && !is_bookable_weekday(new_date) {
            return Err(AppointmentError::NotBookableWeekday);
        }

        if self.availability.is_day_blocked(new_date).await? {
            return Err(AppointmentError::DayBlocked);
        }

        let day_rows = self.availability.day_appointments(new_date).await?;

        if email_has_appointment(&current.email, &day_rows, Some(id)) {
            return Err(AppointmentError::EmailTakenForDay);
        }

        if !is_slot_free(new_time, request.chair, &day_rows, Some(id)) {
            return Err(AppointmentError::ChairTaken(request.chair));
        }

        let updated = self
            .patch_returning(
                id,
                json!({
                    "date": new_date,
                    "time": new_time.format("%H:%M").to_string(),
                    "chair": request.chair,
                }),
            )
            .await?;

        info!(
            "Appointment {} rescheduled from {} {} to {} {}",
            id,
            current.date,
            current.time.format("%H:%M"),
            updated.date,
            updated.time.format("%H:%M")
        );

        let email_sent = self
            .notifier
            .send_reschedule(&RescheduleNotice {
                name: current.name.clone(),
                email: current.email.clone(),
                old_date: current.date,
                old_time: current.time.format("%H:%M").to_string(),
                old_chair: current.chair.map(|c| c.to_string()),
                new_date: updated.date,
                new_time: updated.time.format("%H:%M").to_string(),
                new_chair: updated.chair.map(|c| c.to_string()),
            })
            .await;

        Ok((updated, email_sent))
    }

    /// Hard-delete. The record is fetched first for the cancellation
    /// notice; a missing id is reported as not-found and nothing fires.
    pub async fn delete_appointment(
        &self,
        id: Uuid,
        reason: Option<String>,
    ) -> Result<bool, AppointmentError> {
        let current = self.get_appointment(id).await?;

        let path = format!("/rest/v1/appointments?id=eq.{}", id);
        let _: serde_json::Value = self
            .postgrest
            .request(Method::DELETE, &path, None)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        info!("Appointment {} deleted", id);

        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| "No especificado".to_string());

        let email_sent = self
            .notifier
            .send_cancellation(&CancellationNotice {
                name: current.name,
                email: current.email,
                date: current.date,
                time: current.time.format("%H:%M").to_string(),
                reason,
            })
            .await;

        Ok(email_sent)
    }

    async fn patch_returning(
        &self,
        id: Uuid,
        body: serde_json::Value,
    ) -> Result<Appointment, AppointmentError> {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let path = format!("/rest/v1/appointments?id=eq.{}", id);
        let mut rows: Vec<Appointment> = self
            .postgrest
            .request_with_headers(Method::PATCH, &path, Some(body), Some(headers))
            .await
            .map_err(|e| match e {
                DbError::Conflict(_) => AppointmentError::Conflict,
                other => AppointmentError::Database(other.to_string()),
            })?;

        rows.pop().ok_or(AppointmentError::NotFound)
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, AppointmentError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| AppointmentError::InvalidDate)
}

fn parse_time(value: &str) -> Result<NaiveTime, AppointmentError> {
    hhmm_time::parse(value.trim()).ok_or(AppointmentError::InvalidTime)
}

fn map_insert_error(e: DbError) -> AppointmentError {
    match e {
        DbError::Conflict(_) => AppointmentError::Conflict,
        other => AppointmentError::Database(other.to_string()),
    }
}
