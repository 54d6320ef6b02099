use async_trait::async_trait;
use chrono::{DateTime, Utc, NaiveDateTime};
use sqlx::{SqlitePool, FromRow};
use uuid::Uuid;

use crate::{
    domain::{PortalLink, PortalLinkDefinition},
    error::{AppError, Result},
    repository::PortalLinkRepository,
};

#[derive(FromRow)]
struct PortalLinkRow {
    id: String,
    slug: String,
    title: String,
    description: String,
    body: String,
    link_url: String,
    is_active: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqlitePortalLinkRepository {
    pool: SqlitePool,
}

impl SqlitePortalLinkRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_link(row: PortalLinkRow) -> Result<PortalLink> {
        Ok(PortalLink {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            slug: row.slug,
            title: row.title,
            description: row.description,
            body: row.body,
            link_url: row.link_url,
            is_active: row.is_active != 0,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }
}

#[async_trait]
impl PortalLinkRepository for SqlitePortalLinkRepository {
    async fn list_active(&self) -> Result<Vec<PortalLink>> {
        let rows = sqlx::query_as::<_, PortalLinkRow>(
            r#"
            SELECT id, slug, title, description, body, link_url, is_active,
                   created_at, updated_at
            FROM portal_links
            WHERE is_active = 1
            ORDER BY created_at ASC
            "#
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter()
            .map(Self::row_to_link)
            .collect()
    }

    async fn find_active_by_slug(&self, slug: &str) -> Result<Option<PortalLink>> {
        Ok(self.find_by_slug(slug).await?.filter(|link| link.is_active))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PortalLink>> {
        let row = sqlx::query_as::<_, PortalLinkRow>(
            r#"
            SELECT id, slug, title, description, body, link_url, is_active,
                   created_at, updated_at
            FROM portal_links
            WHERE slug = ?
            "#
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        row.map(Self::row_to_link).transpose()
    }

    async fn create(&self, definition: &PortalLinkDefinition) -> Result<PortalLink> {
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO portal_links (
                id, slug, title, description, body, link_url, is_active,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, 1, ?, ?)
            "#
        )
        .bind(Uuid::new_v4().to_string())
        .bind(definition.slug)
        .bind(definition.title)
        .bind(definition.description)
        .bind(definition.body)
        .bind(definition.link_url)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_slug(definition.slug).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created portal link".to_string())
        })
    }

    async fn update_content(&self, id: Uuid, definition: &PortalLinkDefinition) -> Result<PortalLink> {
        let result = sqlx::query(
            r#"
            UPDATE portal_links
            SET slug = ?, title = ?, description = ?, body = ?, link_url = ?,
                updated_at = ?
            WHERE id = ?
            "#
        )
        .bind(definition.slug)
        .bind(definition.title)
        .bind(definition.description)
        .bind(definition.body)
        .bind(definition.link_url)
        .bind(Utc::now().naive_utc())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Link not found".to_string()));
        }

        self.find_by_slug(definition.slug).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated portal link".to_string())
        })
    }
}
