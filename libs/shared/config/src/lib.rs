use std::env;
use tracing::warn;

/// Legacy minimum accepted for administrator passwords. Kept at the
/// historical floor so raising it is a single-constant change.
pub const MIN_PASSWORD_LEN: usize = 4;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub postgrest_url: String,
    pub postgrest_api_key: String,
    pub session_jwt_secret: String,
    pub mail_relay_url: String,
    pub mail_relay_token: String,
    pub mail_from: String,
    /// Day blocking always enforces the Friday rule; booking historically
    /// did not. This toggle makes that inconsistency explicit instead of
    /// silently changing behavior.
    pub enforce_weekday_on_booking: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            postgrest_url: env::var("POSTGREST_URL")
                .unwrap_or_else(|_| {
                    warn!("POSTGREST_URL not set, using empty value");
                    String::new()
                }),
            postgrest_api_key: env::var("POSTGREST_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("POSTGREST_API_KEY not set, using empty value");
                    String::new()
                }),
            session_jwt_secret: env::var("SESSION_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SESSION_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            mail_relay_url: env::var("MAIL_RELAY_URL")
                .unwrap_or_else(|_| {
                    warn!("MAIL_RELAY_URL not set, email notifications disabled");
                    String::new()
                }),
            mail_relay_token: env::var("MAIL_RELAY_TOKEN")
                .unwrap_or_default(),
            mail_from: env::var("MAIL_FROM")
                .unwrap_or_else(|_| "Higiene Bucodental - Clínica Dental".to_string()),
            enforce_weekday_on_booking: env::var("ENFORCE_WEEKDAY_ON_BOOKING")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.postgrest_url.is_empty()
            && !self.postgrest_api_key.is_empty()
            && !self.session_jwt_secret.is_empty()
    }

    pub fn is_mailer_configured(&self) -> bool {
        !self.mail_relay_url.is_empty()
    }
}
