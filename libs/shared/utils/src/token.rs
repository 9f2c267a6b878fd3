use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, TimeZone, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use tracing::debug;
use uuid::Uuid;

use shared_models::session::{AdminSession, SessionClaims};

type HmacSha256 = Hmac<Sha256>;

/// Fixed session lifetime from issuance.
pub const SESSION_TTL_HOURS: i64 = 24;

/// Issue a signed session token for an authenticated administrator.
pub fn issue_session_token(
    admin_id: Uuid,
    username: &str,
    display_name: Option<&str>,
    jwt_secret: &str,
) -> Result<String, String> {
    if jwt_secret.is_empty() {
        return Err("Session secret is not set".to_string());
    }

    let now = Utc::now();
    let exp = now + Duration::hours(SESSION_TTL_HOURS);

    let header = json!({ "alg": "HS256", "typ": "JWT" });
    let claims = json!({
        "sub": admin_id,
        "username": username,
        "display_name": display_name,
        "iat": now.timestamp(),
        "exp": exp.timestamp(),
    });

    let header_b64 = URL_SAFE_NO_PAD.encode(header.to_string());
    let claims_b64 = URL_SAFE_NO_PAD.encode(claims.to_string());
    let signing_input = format!("{}.{}", header_b64, claims_b64);

    let mut mac = HmacSha256::new_from_slice(jwt_secret.as_bytes())
        .map_err(|_| "Failed to create HMAC".to_string())?;
    mac.update(signing_input.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{}.{}", signing_input, signature))
}

/// Validate a session token and return the administrator session it
/// carries. Rejects bad signatures and expired tokens.
pub fn validate_session_token(token: &str, jwt_secret: &str) -> Result<AdminSession, String> {
    if jwt_secret.is_empty() {
        return Err("Session secret is not set".to_string());
    }

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err("Invalid token format".to_string());
    }

    let header_b64 = parts[0];
    let claims_b64 = parts[1];
    let signature_b64 = parts[2];

    let signature = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| "Invalid signature encoding".to_string())?;

    let signing_input = format!("{}.{}", header_b64, claims_b64);

    let mut mac = HmacSha256::new_from_slice(jwt_secret.as_bytes())
        .map_err(|_| "Failed to create HMAC".to_string())?;
    mac.update(signing_input.as_bytes());

    if mac.verify_slice(&signature).is_err() {
        debug!("Session token signature verification failed");
        return Err("Invalid token signature".to_string());
    }

    let claims_json = URL_SAFE_NO_PAD
        .decode(claims_b64)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or_else(|| "Invalid claims encoding".to_string())?;

    let claims: SessionClaims = serde_json::from_str(&claims_json)
        .map_err(|_| "Invalid claims format".to_string())?;

    let now = Utc::now().timestamp();
    if claims.exp < now {
        debug!("Session token expired at {} (now: {})", claims.exp, now);
        return Err("Session expired".to_string());
    }

    let issued_at = Utc
        .timestamp_opt(claims.iat, 0)
        .single()
        .ok_or_else(|| "Invalid issue timestamp".to_string())?;

    let session = AdminSession {
        admin_id: claims.sub,
        username: claims.username,
        display_name: claims.display_name,
        issued_at,
    };

    debug!("Session token validated for administrator: {}", session.username);
    Ok(session)
}
