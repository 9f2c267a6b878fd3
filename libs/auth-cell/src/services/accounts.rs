use std::sync::Arc;

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString};
use argon2::{Argon2, PasswordVerifier};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::json;
use tracing::{info, warn};

use shared_config::{AppConfig, MIN_PASSWORD_LEN};
use shared_database::{DbError, PostgrestClient};
use shared_utils::token::issue_session_token;

use crate::models::{
    Administrator, AdministratorRow, AuthError, ChangePasswordRequest, CreateAdminRequest,
    LoginRequest,
};

/// Administrator accounts and session issuance. Passwords are stored as
/// argon2 hashes; a successful login returns a signed session token with
/// the expiry embedded in its claims.
pub struct AdminAccountService {
    postgrest: Arc<PostgrestClient>,
    jwt_secret: String,
}

impl AdminAccountService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            postgrest: Arc::new(PostgrestClient::new(config)),
            jwt_secret: config.session_jwt_secret.clone(),
        }
    }

    /// Verify credentials and issue a session token. Unknown usernames and
    /// wrong passwords get distinct messages, matching the established
    /// login flow.
    pub async fn login(
        &self,
        request: LoginRequest,
    ) -> Result<(String, Administrator), AuthError> {
        let username = request.username.trim();
        if username.is_empty() || request.password.is_empty() {
            return Err(AuthError::MissingFields);
        }

        let row = self
            .fetch_by_username(username)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !row.active {
            warn!("Login attempt for inactive administrator {}", username);
            return Err(AuthError::UserNotFound);
        }

        verify_password(&request.password, &row.password_hash)?;

        let token = issue_session_token(
            row.id,
            &row.username,
            row.display_name.as_deref(),
            &self.jwt_secret,
        )
        .map_err(AuthError::Token)?;

        info!("Administrator {} logged in", row.username);
        Ok((token, row.into()))
    }

    pub async fn create_admin(
        &self,
        request: CreateAdminRequest,
    ) -> Result<Administrator, AuthError> {
        let username = request.username.trim().to_string();
        if username.is_empty() || request.password.is_empty() {
            return Err(AuthError::MissingFields);
        }

        if request.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::PasswordTooShort(MIN_PASSWORD_LEN));
        }

        if self.fetch_by_username(&username).await?.is_some() {
            return Err(AuthError::UserExists);
        }

        let password_hash = hash_password(&request.password)?;

        let row = json!({
            "username": username,
            "password_hash": password_hash,
            "display_name": request.display_name,
            "email": request.email,
            "active": true,
        });

        let created: AdministratorRow = self
            .postgrest
            .insert_returning("administrators", row)
            .await
            .map_err(|e| match e {
                // The unique index on username catches a concurrent create.
                DbError::Conflict(_) => AuthError::UserExists,
                other => AuthError::Database(other.to_string()),
            })?;

        info!("Administrator {} created", created.username);
        Ok(created.into())
    }

    /// Change a password after re-verifying the current one. The session
    /// token is untouched; it simply ages out.
    pub async fn change_password(&self, request: ChangePasswordRequest) -> Result<(), AuthError> {
        let username = request.username.trim();
        if username.is_empty()
            || request.current_password.is_empty()
            || request.new_password.is_empty()
        {
            return Err(AuthError::MissingFields);
        }

        if request.new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::NewPasswordTooShort(MIN_PASSWORD_LEN));
        }

        let row = self
            .fetch_by_username(username)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        verify_password(&request.current_password, &row.password_hash)
            .map_err(|_| AuthError::WrongCurrentPassword)?;

        let password_hash = hash_password(&request.new_password)?;

        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let path = format!("/rest/v1/administrators?id=eq.{}", row.id);
        let updated: Vec<AdministratorRow> = self
            .postgrest
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(json!({ "password_hash": password_hash })),
                Some(headers),
            )
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        if updated.is_empty() {
            return Err(AuthError::UserNotFound);
        }

        info!("Password changed for administrator {}", username);
        Ok(())
    }

    pub async fn list_admins(&self) -> Result<Vec<Administrator>, AuthError> {
        let rows: Vec<AdministratorRow> = self
            .postgrest
            .request(
                Method::GET,
                "/rest/v1/administrators?order=username.asc",
                None,
            )
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(Administrator::from).collect())
    }

    async fn fetch_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AdministratorRow>, AuthError> {
        let path = format!("/rest/v1/administrators?username=eq.{}", username);
        let mut rows: Vec<AdministratorRow> = self
            .postgrest
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        Ok(rows.pop())
    }
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

fn verify_password(password: &str, stored_hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| AuthError::Hashing(e.to_string()))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::WrongPassword)
}
