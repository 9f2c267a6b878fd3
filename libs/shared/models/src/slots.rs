use std::fmt;

use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// The clinic runs a single session per week; every appointment and every
/// blocked day falls on this weekday.
pub const BOOKABLE_WEEKDAY: Weekday = Weekday::Fri;

/// Fixed catalog of bookable times, as shown on the public form.
pub const TIME_SLOTS: [&str; 9] = [
    "15:15", "15:55", "16:35", "17:15", "17:55", "18:35", "19:15", "19:55", "20:35",
];

/// Treatment chairs, each independently schedulable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chair {
    Rojo,
    Azul,
    Amarillo,
}

impl Chair {
    pub const ALL: [Chair; 3] = [Chair::Rojo, Chair::Azul, Chair::Amarillo];
}

impl fmt::Display for Chair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chair::Rojo => write!(f, "Rojo"),
            Chair::Azul => write!(f, "Azul"),
            Chair::Amarillo => write!(f, "Amarillo"),
        }
    }
}

pub fn is_bookable_weekday(date: NaiveDate) -> bool {
    chrono::Datelike::weekday(&date) == BOOKABLE_WEEKDAY
}

/// Parse the slot catalog into times. The catalog is static and well
/// formed, so parsing cannot fail.
pub fn catalog_times() -> Vec<NaiveTime> {
    TIME_SLOTS
        .iter()
        .filter_map(|t| NaiveTime::parse_from_str(t, "%H:%M").ok())
        .collect()
}

pub fn is_catalog_time(time: NaiveTime) -> bool {
    catalog_times().contains(&time)
}
