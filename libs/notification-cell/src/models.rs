use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Details for a booking-confirmation notice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationNotice {
    pub name: String,
    pub email: String,
    pub date: NaiveDate,
    pub time: String,
    pub chair: Option<String>,
}

/// Details for a cancellation notice. The reason is free text supplied by
/// the administrator deleting the appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancellationNotice {
    pub name: String,
    pub email: String,
    pub date: NaiveDate,
    pub time: String,
    pub reason: String,
}

/// Details for a reschedule notice carrying both the prior and new slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleNotice {
    pub name: String,
    pub email: String,
    pub old_date: NaiveDate,
    pub old_time: String,
    pub old_chair: Option<String>,
    pub new_date: NaiveDate,
    pub new_time: String,
    pub new_chair: Option<String>,
}
