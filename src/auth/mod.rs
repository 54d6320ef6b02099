use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use argon2::password_hash::{SaltString, rand_core::OsRng};
use chrono::Duration;
use cookie::{Cookie, SameSite};
use uuid::Uuid;

use crate::{
    config::AuthConfig,
    domain::User,
    error::{AppError, Result},
    repository::UserRepository,
};

pub mod token;

pub use token::TokenService;

/// Credential checks, session tokens and the identity half of the
/// authorization guard.
pub struct AuthService {
    tokens: TokenService,
    user_repo: Arc<dyn UserRepository>,
    cookie_name: String,
    cookie_secure: bool,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(config: &AuthConfig, user_repo: Arc<dyn UserRepository>) -> Result<Self> {
        Ok(Self {
            tokens: TokenService::new(&config.jwt_secret, &config.jwt_algorithm)?,
            user_repo,
            cookie_name: config.cookie_name.clone(),
            cookie_secure: config.cookie_secure,
            token_ttl: Duration::minutes(config.access_token_expire_minutes),
        })
    }

    pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;

        let argon2 = Argon2::default();

        Ok(argon2.verify_password(password.as_bytes(), &parsed_hash).is_ok())
    }

    pub async fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        Ok(password_hash.to_string())
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn issue_token(&self, user_id: Uuid) -> Result<String> {
        self.tokens.issue(user_id, self.token_ttl)
    }

    pub fn validate_token(&self, token: &str) -> Result<Uuid> {
        self.tokens.validate(token)
    }

    /// Check credentials and stamp the login time. Inactive accounts are
    /// refused even with the right password.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let user = self.user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !Self::verify_password(password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        if !user.active {
            return Err(AppError::Forbidden("Inactive user".to_string()));
        }

        self.user_repo.touch_last_login(user.id).await?;

        Ok(user)
    }

    /// Resolve the caller behind a session token.
    ///
    /// Missing token is `Unauthorized`, a bad or expired one `InvalidToken`,
    /// and a subject that no longer maps to an active user `UserNotFound`.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<User> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(AppError::Unauthorized)?;

        let user_id = self.validate_token(token)?;

        self.user_repo
            .find_by_id(user_id)
            .await?
            .filter(|user| user.active)
            .ok_or(AppError::UserNotFound)
    }

    pub fn create_session_cookie(&self, token: &str) -> Cookie<'static> {
        Cookie::build((self.cookie_name.clone(), token.to_string()))
            .path("/")
            .same_site(SameSite::Lax)
            .http_only(true)
            .secure(self.cookie_secure)
            .max_age(cookie::time::Duration::seconds(self.token_ttl.num_seconds()))
            .build()
    }

    pub fn create_logout_cookie(&self) -> Cookie<'static> {
        Cookie::build((self.cookie_name.clone(), ""))
            .path("/")
            .same_site(SameSite::Lax)
            .http_only(true)
            .secure(self.cookie_secure)
            .max_age(cookie::time::Duration::seconds(0))
            .build()
    }
}

/// Role half of the guard.
pub fn require_admin(user: User) -> Result<User> {
    if user.is_admin() {
        Ok(user)
    } else {
        Err(AppError::Forbidden("Admin access required".to_string()))
    }
}
