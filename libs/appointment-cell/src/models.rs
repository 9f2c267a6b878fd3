use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::slots::Chair;

// ==============================================================================
// CORE APPOINTMENT MODEL
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "hhmm_time")]
    pub time: NaiveTime,
    pub name: String,
    pub email: String,
    pub chair: Option<Chair>,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Cancelled appointments free their slot; every other status holds it.
    pub fn is_active(&self) -> bool {
        self.status != AppointmentStatus::Cancelled
    }
}

/// Appointment status with the legacy Spanish wire values. The historical
/// system stored a duplicate spelling for "completed"; `completado` is
/// accepted on input and normalized to `completada` on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentStatus {
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "confirmada")]
    Confirmed,
    #[serde(rename = "completada", alias = "completado")]
    Completed,
    #[serde(rename = "presente")]
    Present,
    #[serde(rename = "cancelada")]
    Cancelled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pendiente"),
            AppointmentStatus::Confirmed => write!(f, "confirmada"),
            AppointmentStatus::Completed => write!(f, "completada"),
            AppointmentStatus::Present => write!(f, "presente"),
            AppointmentStatus::Cancelled => write!(f, "cancelada"),
        }
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

/// Public booking request. Date and time arrive as strings so format
/// errors get their own messages before anything touches the store.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAppointmentRequest {
    pub date: String,
    pub time: String,
    pub name: String,
    pub email: String,
    pub chair: Option<Chair>,
    pub notes: Option<String>,
}

/// Administrative field update. The typed status rejects unknown values at
/// the boundary, before any write happens.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub status: AppointmentStatus,
    pub chair: Option<Chair>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub date: String,
    pub time: String,
    pub chair: Chair,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteAppointmentRequest {
    pub reason: Option<String>,
}

// ==============================================================================
// AVAILABILITY MODELS
// ==============================================================================

/// Open slots for one catalog time on a given date. An empty chair set
/// means the time is fully booked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeAvailability {
    #[serde(with = "hhmm_time")]
    pub time: NaiveTime,
    pub free_chairs: Vec<Chair>,
    pub fully_booked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub blocked: bool,
    pub bookable_weekday: bool,
    pub times: Vec<TimeAvailability>,
}

impl DayAvailability {
    pub fn is_wholly_unavailable(&self) -> bool {
        self.blocked || !self.bookable_weekday
    }
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("Faltan datos requeridos")]
    MissingFields,

    #[error("Formato de fecha inválido (use YYYY-MM-DD)")]
    InvalidDate,

    #[error("Formato de hora inválido (use HH:MM)")]
    InvalidTime,

    #[error("Email inválido")]
    InvalidEmail,

    #[error("Las citas solo pueden reservarse en viernes")]
    NotBookableWeekday,

    #[error("Este día no está disponible")]
    DayBlocked,

    #[error("Ya tienes una cita registrada para este día")]
    EmailTakenForDay,

    #[error("El sillón {0} ya está reservado para esta hora")]
    ChairTaken(Chair),

    /// Raised when a storage-level unique constraint rejects a write that
    /// passed the pre-checks (two requests racing for the same slot).
    #[error("La cita entra en conflicto con otra reserva existente")]
    Conflict,

    #[error("Cita no encontrada")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),
}

// ==============================================================================
// TIME SERDE
// ==============================================================================

/// Times travel as `HH:MM`. Legacy rows may carry seconds (`HH:MM:SS`);
/// both are accepted on input and the seconds are stripped on output.
pub mod hhmm_time {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn parse(value: &str) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(value, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
            .ok()
    }

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        parse(&value).ok_or_else(|| serde::de::Error::custom(format!("invalid time: {}", value)))
    }
}
