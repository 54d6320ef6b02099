use std::sync::Arc;
use uuid::Uuid;
use crate::{
    domain::*,
    error::{AppError, Result},
    repository::UserRepository,
};

pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.repo.list().await
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> Result<User> {
        ensure_name(&request.name)?;

        if self.repo.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let user = self.repo.create(request).await?;
        tracing::info!("Created user {} ({})", user.id, user.email);

        Ok(user)
    }

    pub async fn update_user(&self, id: Uuid, update: UpdateUserRequest) -> Result<User> {
        if let Some(name) = update.name.as_deref() {
            ensure_name(name)?;
        }

        let existing = self.repo.find_by_id(id).await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if let Some(email) = update.email.as_deref() {
            let email = normalize_email(email);
            if email != existing.email {
                if let Some(other) = self.repo.find_by_email(&email).await? {
                    if other.id != id {
                        return Err(AppError::Conflict("Email already exists".to_string()));
                    }
                }
            }
        }

        self.repo.update(id, update).await
    }

    pub async fn change_password(&self, id: Uuid, password: &str) -> Result<User> {
        let password = password.trim();
        if password.is_empty() {
            return Err(AppError::BadRequest("Invalid password".to_string()));
        }

        self.repo.find_by_id(id).await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        self.repo.set_password(id, password).await
    }

    /// Delete `id` on behalf of `acting`. An admin can never remove their own
    /// account.
    pub async fn delete_user(&self, id: Uuid, acting: &User) -> Result<()> {
        if id == acting.id {
            return Err(AppError::Forbidden("cannot delete self".to_string()));
        }

        self.repo.find_by_id(id).await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        self.repo.delete(id).await?;
        tracing::info!("User {} deleted by {}", id, acting.email);

        Ok(())
    }
}

/// Names are stored trimmed, so whitespace-only input counts as empty.
fn ensure_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }
    Ok(())
}
