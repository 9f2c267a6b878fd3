use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored administrator row. The password hash never leaves this cell;
/// handlers expose the `Administrator` view instead.
#[derive(Debug, Clone, Deserialize)]
pub struct AdministratorRow {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Administrator {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<AdministratorRow> for Administrator {
    fn from(row: AdministratorRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            display_name: row.display_name,
            email: row.email,
            active: row.active,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAdminRequest {
    pub username: String,
    pub password: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangePasswordRequest {
    pub username: String,
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Faltan datos requeridos")]
    MissingFields,

    #[error("Usuario no encontrado")]
    UserNotFound,

    #[error("Contraseña incorrecta")]
    WrongPassword,

    #[error("Contraseña actual incorrecta")]
    WrongCurrentPassword,

    #[error("La contraseña debe tener al menos {0} caracteres")]
    PasswordTooShort(usize),

    #[error("La nueva contraseña debe tener al menos {0} caracteres")]
    NewPasswordTooShort(usize),

    #[error("El usuario ya existe")]
    UserExists,

    #[error("Session token error: {0}")]
    Token(String),

    #[error("Password hashing error: {0}")]
    Hashing(String),

    #[error("Database error: {0}")]
    Database(String),
}
