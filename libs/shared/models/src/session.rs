use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenHeader {
    pub alg: String,
    pub typ: String,
}

/// Claims embedded in an administrator session token. Expiry lives in the
/// signed token itself, so validity is server-authoritative rather than
/// checked against a client-held timestamp.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

/// Validated administrator session, injected into request extensions by
/// the auth middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSession {
    pub admin_id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub issued_at: DateTime<Utc>,
}
