use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reason stored when the administrator blocks a day without giving one.
pub const DEFAULT_BLOCK_REASON: &str = "Día no disponible";

/// A calendar date removed from the bookable set regardless of slot
/// occupancy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockedDay {
    pub id: Uuid,
    pub date: NaiveDate,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockDayRequest {
    pub date: String,
    pub reason: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum BlockedDayError {
    #[error("La fecha es requerida")]
    MissingDate,

    #[error("Formato de fecha inválido (use YYYY-MM-DD)")]
    InvalidDate,

    #[error("Solo se pueden vetar viernes")]
    NotFriday,

    #[error("Este día ya está vetado")]
    AlreadyBlocked,

    #[error("Día vetado no encontrado")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),
}
