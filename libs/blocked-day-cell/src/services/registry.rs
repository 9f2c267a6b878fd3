use std::sync::Arc;

use chrono::NaiveDate;
use reqwest::Method;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{DbError, PostgrestClient};
use shared_models::slots::is_bookable_weekday;

use crate::models::{BlockDayRequest, BlockedDay, BlockedDayError, DEFAULT_BLOCK_REASON};

/// CRUD over calendar exclusions. Only administrators reach the mutating
/// operations; the listing feeds the public booking form.
pub struct BlockedDayRegistry {
    postgrest: Arc<PostgrestClient>,
}

impl BlockedDayRegistry {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            postgrest: Arc::new(PostgrestClient::new(config)),
        }
    }

    pub fn with_client(postgrest: Arc<PostgrestClient>) -> Self {
        Self { postgrest }
    }

    /// All blocked dates, ascending.
    pub async fn list(&self) -> Result<Vec<BlockedDay>, BlockedDayError> {
        self.postgrest
            .request(Method::GET, "/rest/v1/blocked_days?order=date.asc", None)
            .await
            .map_err(|e| BlockedDayError::Database(e.to_string()))
    }

    pub async fn is_blocked(&self, date: NaiveDate) -> Result<bool, BlockedDayError> {
        let path = format!("/rest/v1/blocked_days?date=eq.{}", date);
        let rows: Vec<BlockedDay> = self
            .postgrest
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| BlockedDayError::Database(e.to_string()))?;
        Ok(!rows.is_empty())
    }

    pub async fn block(&self, request: BlockDayRequest) -> Result<BlockedDay, BlockedDayError> {
        if request.date.trim().is_empty() {
            return Err(BlockedDayError::MissingDate);
        }

        let date = NaiveDate::parse_from_str(request.date.trim(), "%Y-%m-%d")
            .map_err(|_| BlockedDayError::InvalidDate)?;

        if !is_bookable_weekday(date) {
            return Err(BlockedDayError::NotFriday);
        }

        if self.is_blocked(date).await? {
            return Err(BlockedDayError::AlreadyBlocked);
        }

        let reason = request
            .reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_BLOCK_REASON.to_string());

        let row = json!({
            "date": date,
            "reason": reason,
        });

        let blocked: BlockedDay = self
            .postgrest
            .insert_returning("blocked_days", row)
            .await
            .map_err(|e| match e {
                // The unique index on date catches a concurrent block.
                DbError::Conflict(_) => BlockedDayError::AlreadyBlocked,
                other => BlockedDayError::Database(other.to_string()),
            })?;

        info!("Blocked day {} ({})", blocked.date, blocked.reason);
        Ok(blocked)
    }

    /// Removing a block only re-opens the date for booking; existing
    /// appointments are untouched.
    pub async fn unblock(&self, id: Uuid) -> Result<(), BlockedDayError> {
        let path = format!("/rest/v1/blocked_days?id=eq.{}", id);
        let existing: Vec<BlockedDay> = self
            .postgrest
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| BlockedDayError::Database(e.to_string()))?;

        if existing.is_empty() {
            return Err(BlockedDayError::NotFound);
        }

        debug!("Unblocking day {}", id);
        let _: serde_json::Value = self
            .postgrest
            .request(Method::DELETE, &path, None)
            .await
            .map_err(|e| BlockedDayError::Database(e.to_string()))?;

        Ok(())
    }
}
