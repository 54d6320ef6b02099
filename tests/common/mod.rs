#![allow(dead_code)]

use std::sync::Arc;

use member_portal::{
    config::Settings,
    domain::{CreateUserRequest, Role, User},
    repository::{SqliteUserRepository, UserRepository},
    service::ServiceContext,
};
use rust_xlsxwriter::Workbook;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

/// Single-connection in-memory database with the schema applied. One
/// connection keeps every query on the same in-memory database.
pub async fn test_pool() -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.auth.jwt_secret = "test-secret".to_string();
    settings.admin.email = "admin@test.local".to_string();
    settings.admin.password = "admin-pass".to_string();
    settings
}

pub async fn test_context() -> anyhow::Result<Arc<ServiceContext>> {
    let pool = test_pool().await?;
    let context = ServiceContext::new(pool, &test_settings())?;
    context.seed_service.seed_all().await?;
    Ok(Arc::new(context))
}

pub async fn create_user(
    repo: &SqliteUserRepository,
    name: &str,
    email: &str,
    role: Role,
) -> anyhow::Result<User> {
    let user = repo.create(CreateUserRequest {
        name: name.to_string(),
        email: email.to_string(),
        password: "password123".to_string(),
        role,
    }).await?;

    Ok(user)
}

/// Build an .xlsx workbook whose first sheet holds `rows` verbatim.
pub fn xlsx(rows: &[&[&str]]) -> anyhow::Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            worksheet.write_string(r as u32, c as u16, *value)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}
