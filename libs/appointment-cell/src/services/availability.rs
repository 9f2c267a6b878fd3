use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use reqwest::Method;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::PostgrestClient;
use shared_models::slots::{catalog_times, is_bookable_weekday, Chair};

use blocked_day_cell::services::registry::BlockedDayRegistry;

use crate::models::{Appointment, AppointmentError, DayAvailability, TimeAvailability};

// ==============================================================================
// PURE EVALUATION CORE
//
// These functions take a snapshot of one date's appointments and never
// touch the store. Availability is recomputed from the snapshot on every
// call; there is no cached availability state to invalidate.
// ==============================================================================

/// Whether the exact (time, chair) slot is free among the given same-date
/// appointments. `exclude_id` lets a reschedule ignore the record being
/// moved.
pub fn is_slot_free(
    time: NaiveTime,
    chair: Chair,
    appointments: &[Appointment],
    exclude_id: Option<Uuid>,
) -> bool {
    !appointments.iter().any(|a| {
        a.is_active()
            && Some(a.id) != exclude_id
            && a.time == time
            && a.chair == Some(chair)
    })
}

/// Chairs still open at the given time. Empty means fully booked.
pub fn free_chairs_at(
    time: NaiveTime,
    appointments: &[Appointment],
    exclude_id: Option<Uuid>,
) -> Vec<Chair> {
    Chair::ALL
        .into_iter()
        .filter(|chair| is_slot_free(time, *chair, appointments, exclude_id))
        .collect()
}

/// Whether the email already holds a non-cancelled appointment among the
/// given same-date rows.
pub fn email_has_appointment(
    email: &str,
    appointments: &[Appointment],
    exclude_id: Option<Uuid>,
) -> bool {
    appointments.iter().any(|a| {
        a.is_active() && Some(a.id) != exclude_id && a.email.eq_ignore_ascii_case(email)
    })
}

/// Open slots for every catalog time on the date. A blocked or off-weekday
/// date is wholly unavailable; the weekday is re-checked here even though
/// the registry only accepts allowed-weekday dates.
pub fn day_availability(
    date: NaiveDate,
    appointments: &[Appointment],
    blocked: bool,
) -> DayAvailability {
    let bookable_weekday = is_bookable_weekday(date);
    let unavailable = blocked || !bookable_weekday;

    let times = catalog_times()
        .into_iter()
        .map(|time| {
            let free_chairs = if unavailable {
                Vec::new()
            } else {
                free_chairs_at(time, appointments, None)
            };
            TimeAvailability {
                time,
                fully_booked: free_chairs.is_empty(),
                free_chairs,
            }
        })
        .collect();

    DayAvailability {
        date,
        blocked,
        bookable_weekday,
        times,
    }
}

// ==============================================================================
// SERVICE WRAPPER
// ==============================================================================

/// Fetches the date snapshot from the store and runs the pure core.
pub struct AvailabilityService {
    postgrest: Arc<PostgrestClient>,
    blocked_days: BlockedDayRegistry,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        let postgrest = Arc::new(PostgrestClient::new(config));
        let blocked_days = BlockedDayRegistry::with_client(Arc::clone(&postgrest));
        Self {
            postgrest,
            blocked_days,
        }
    }

    pub fn with_client(postgrest: Arc<PostgrestClient>) -> Self {
        let blocked_days = BlockedDayRegistry::with_client(Arc::clone(&postgrest));
        Self {
            postgrest,
            blocked_days,
        }
    }

    /// Non-cancelled appointments for the date, time ascending.
    pub async fn day_appointments(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?date=eq.{}&status=neq.cancelada&order=time.asc",
            date
        );
        self.postgrest
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))
    }

    pub async fn is_day_blocked(&self, date: NaiveDate) -> Result<bool, AppointmentError> {
        self.blocked_days
            .is_blocked(date)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))
    }

    pub async fn evaluate_day(&self, date: NaiveDate) -> Result<DayAvailability, AppointmentError> {
        let blocked = self.is_day_blocked(date).await?;
        let appointments = if blocked {
            Vec::new()
        } else {
            self.day_appointments(date).await?
        };

        debug!(
            "Evaluated availability for {}: blocked={}, {} active appointments",
            date,
            blocked,
            appointments.len()
        );
        Ok(day_availability(date, &appointments, blocked))
    }
}
