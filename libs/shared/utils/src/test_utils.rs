use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;
use uuid::Uuid;

use shared_config::AppConfig;

pub struct TestConfig {
    pub jwt_secret: String,
    pub postgrest_url: String,
    pub postgrest_api_key: String,
    pub mail_relay_url: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-session-tokens-must-be-long-enough".to_string(),
            postgrest_url: "http://localhost:54321".to_string(),
            postgrest_api_key: "test-api-key".to_string(),
            mail_relay_url: String::new(),
        }
    }
}

impl TestConfig {
    pub fn with_postgrest_url(url: &str) -> Self {
        Self {
            postgrest_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            postgrest_url: self.postgrest_url.clone(),
            postgrest_api_key: self.postgrest_api_key.clone(),
            session_jwt_secret: self.jwt_secret.clone(),
            mail_relay_url: self.mail_relay_url.clone(),
            mail_relay_token: String::new(),
            mail_from: "Clínica de pruebas".to_string(),
            enforce_weekday_on_booking: false,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct SessionTestUtils;

impl SessionTestUtils {
    /// Build a raw session token with an arbitrary expiry offset, so tests
    /// can produce both valid and already-expired tokens.
    pub fn create_token(username: &str, secret: &str, exp_hours: i64) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours);

        let header = json!({ "alg": "HS256", "typ": "JWT" });
        let claims = json!({
            "sub": Uuid::new_v4(),
            "username": username,
            "display_name": "Administrador",
            "iat": now.timestamp(),
            "exp": exp.timestamp(),
        });

        let header_b64 = URL_SAFE_NO_PAD.encode(header.to_string());
        let claims_b64 = URL_SAFE_NO_PAD.encode(claims.to_string());
        let signing_input = format!("{}.{}", header_b64, claims_b64);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        format!("{}.{}", signing_input, signature)
    }

    pub fn create_valid_token(secret: &str) -> String {
        Self::create_token("admin", secret, 24)
    }

    pub fn create_expired_token(secret: &str) -> String {
        Self::create_token("admin", secret, -1)
    }

    pub fn create_invalid_signature_token() -> String {
        Self::create_token("admin", "wrong-secret", 24)
    }
}

/// Canned PostgREST rows for wiremock-backed tests.
pub struct MockPostgrestRows;

impl MockPostgrestRows {
    pub fn appointment(
        id: Uuid,
        date: &str,
        time: &str,
        name: &str,
        email: &str,
        chair: Option<&str>,
        status: &str,
    ) -> Value {
        json!({
            "id": id,
            "date": date,
            "time": time,
            "name": name,
            "email": email,
            "chair": chair,
            "notes": null,
            "status": status,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339(),
        })
    }

    pub fn blocked_day(id: Uuid, date: &str, reason: &str) -> Value {
        json!({
            "id": id,
            "date": date,
            "reason": reason,
            "created_at": Utc::now().to_rfc3339(),
        })
    }

    pub fn administrator(id: Uuid, username: &str, password_hash: &str) -> Value {
        json!({
            "id": id,
            "username": username,
            "password_hash": password_hash,
            "display_name": "Administrador",
            "email": null,
            "active": true,
            "created_at": Utc::now().to_rfc3339(),
        })
    }

    pub fn service(id: Uuid, title: &str) -> Value {
        json!({
            "id": id,
            "title": title,
            "description": null,
            "category": null,
            "created_at": Utc::now().to_rfc3339(),
        })
    }
}
