use async_trait::async_trait;
use chrono::{DateTime, Utc, NaiveDateTime};
use sqlx::{SqlitePool, FromRow};
use uuid::Uuid;

use crate::{
    auth::AuthService,
    domain::{normalize_email, CreateUserRequest, Role, UpdateUserRequest, User},
    error::{AppError, Result},
    repository::UserRepository,
};

// Database row struct that matches SQLite schema
#[derive(FromRow)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    active: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
    last_login_at: Option<NaiveDateTime>,
}

const USER_COLUMNS: &str = r#"
    id, name, email, password_hash, role, active,
    created_at, updated_at, last_login_at
"#;

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: UserRow) -> Result<User> {
        Ok(User {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role: Role::from_str(&row.role)
                .ok_or_else(|| AppError::Database(format!("Invalid user role: {}", row.role)))?,
            active: row.active != 0,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
            last_login_at: row.last_login_at.map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc)),
        })
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, request: CreateUserRequest) -> Result<User> {
        let id = Uuid::new_v4();
        let password_hash = AuthService::hash_password(&request.password).await?;
        let email = normalize_email(&request.email);
        let now_naive = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO users (
                id, name, email, password_hash, role, active,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, 1, ?, ?)
            "#
        )
        .bind(id.to_string())
        .bind(request.name.trim())
        .bind(&email)
        .bind(&password_hash)
        .bind(request.role.as_str())
        .bind(now_naive)
        .bind(now_naive)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created user".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = ?",
            USER_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        row.map(Self::row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = ? COLLATE NOCASE",
            USER_COLUMNS
        ))
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        row.map(Self::row_to_user).transpose()
    }

    async fn list(&self) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users ORDER BY created_at DESC",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter()
            .map(Self::row_to_user)
            .collect()
    }

    async fn update(&self, id: Uuid, update: UpdateUserRequest) -> Result<User> {
        let role_str = update.role.map(|role| role.as_str());
        let email = update.email.as_deref().map(normalize_email);
        let name = update.name.as_deref().map(str::trim);
        let active_int = update.active.map(|a| if a { 1i32 } else { 0i32 });
        let now_naive = Utc::now().naive_utc();

        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = COALESCE(?, name),
                email = COALESCE(?, email),
                role = COALESCE(?, role),
                active = COALESCE(?, active),
                updated_at = ?
            WHERE id = ?
            "#
        )
        .bind(name)
        .bind(email)
        .bind(role_str)
        .bind(active_int)
        .bind(now_naive)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated user".to_string())
        })
    }

    async fn set_password(&self, id: Uuid, password: &str) -> Result<User> {
        let password_hash = AuthService::hash_password(password).await?;
        let now_naive = Utc::now().naive_utc();

        let result = sqlx::query(
            "UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?"
        )
        .bind(&password_hash)
        .bind(now_naive)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated user".to_string())
        })
    }

    async fn touch_last_login(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE users SET last_login_at = ? WHERE id = ?")
            .bind(Utc::now().naive_utc())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();
        let deletion_failed = |e: sqlx::Error| {
            tracing::error!("Deleting user {} failed: {}", id_str, e);
            AppError::Operation("error deleting user".to_string())
        };

        // Authored content outlives its author: clear the references, then
        // remove the account, all or nothing.
        let mut tx = self.pool.begin().await.map_err(deletion_failed)?;

        sqlx::query("UPDATE announcements SET created_by = NULL WHERE created_by = ?")
            .bind(&id_str)
            .execute(&mut *tx)
            .await
            .map_err(deletion_failed)?;

        sqlx::query("UPDATE courses SET created_by = NULL WHERE created_by = ?")
            .bind(&id_str)
            .execute(&mut *tx)
            .await
            .map_err(deletion_failed)?;

        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(&id_str)
            .execute(&mut *tx)
            .await
            .map_err(deletion_failed)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        tx.commit().await.map_err(deletion_failed)?;

        Ok(())
    }
}
