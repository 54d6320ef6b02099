use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Socio,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Socio => "socio",
        }
    }

    /// Parse the stored/canonical representation.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "socio" => Some(Role::Socio),
            _ => None,
        }
    }

    /// Map free text typed into a spreadsheet onto a role.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    /// Unrecognized text yields `None` rather than a default role.
    pub fn from_alias(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "admin" | "administrador" | "adm" => Some(Role::Admin),
            "socio" | "sócio" | "associado" => Some(Role::Socio),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "invalid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, message = "name cannot be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "invalid email"))]
    pub email: Option<String>,
    pub role: Option<Role>,
    pub active: Option<bool>,
}

/// Emails are compared and stored case-insensitively.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
