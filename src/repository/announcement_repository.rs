use async_trait::async_trait;
use chrono::{DateTime, Utc, NaiveDateTime};
use sqlx::{SqlitePool, FromRow};
use uuid::Uuid;

use crate::{
    domain::{
        end_of_day, start_of_day, Announcement, AnnouncementFilter,
        CreateAnnouncementRequest, UpdateAnnouncementRequest,
    },
    error::{AppError, Result},
    repository::AnnouncementRepository,
};

#[derive(FromRow)]
struct AnnouncementRow {
    id: String,
    title: String,
    body: String,
    published_at: NaiveDateTime,
    expires_at: Option<NaiveDateTime>,
    is_active: i32,
    created_by: Option<String>,
    author_name: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

const SELECT_ANNOUNCEMENTS: &str = r#"
    SELECT a.id, a.title, a.body, a.published_at, a.expires_at, a.is_active,
           a.created_by, u.name AS author_name, a.created_at, a.updated_at
    FROM announcements a
    LEFT JOIN users u ON u.id = a.created_by
"#;

pub struct SqliteAnnouncementRepository {
    pool: SqlitePool,
}

impl SqliteAnnouncementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_announcement(row: AnnouncementRow) -> Result<Announcement> {
        Ok(Announcement {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            title: row.title,
            body: row.body,
            published_at: DateTime::from_naive_utc_and_offset(row.published_at, Utc),
            expires_at: row.expires_at.map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc)),
            is_active: row.is_active != 0,
            created_by: row.created_by
                .map(|s| Uuid::parse_str(&s))
                .transpose()
                .map_err(|e| AppError::Database(e.to_string()))?,
            author_name: row.author_name,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }
}

#[async_trait]
impl AnnouncementRepository for SqliteAnnouncementRepository {
    async fn create(
        &self,
        request: CreateAnnouncementRequest,
        created_by: Option<Uuid>,
    ) -> Result<Announcement> {
        let id = Uuid::new_v4();
        let published_at_naive = start_of_day(request.published_at).naive_utc();
        let expires_at_naive = request.expires_at.map(|d| end_of_day(d).naive_utc());
        let created_by_str = created_by.map(|id| id.to_string());
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO announcements (
                id, title, body, published_at, expires_at, is_active,
                created_by, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, 1, ?, ?, ?)
            "#
        )
        .bind(id.to_string())
        .bind(&request.title)
        .bind(&request.body)
        .bind(published_at_naive)
        .bind(expires_at_naive)
        .bind(created_by_str)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created announcement".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Announcement>> {
        let row = sqlx::query_as::<_, AnnouncementRow>(&format!(
            "{} WHERE a.id = ?",
            SELECT_ANNOUNCEMENTS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        row.map(Self::row_to_announcement).transpose()
    }

    async fn list(&self, filter: AnnouncementFilter) -> Result<Vec<Announcement>> {
        let now = Utc::now().naive_utc();

        let rows = sqlx::query_as::<_, AnnouncementRow>(&format!(
            r#"
            {}
            WHERE (? = 0 OR a.is_active = 1)
              AND (? = 0 OR a.expires_at IS NULL OR a.expires_at >= ?)
            ORDER BY a.published_at DESC
            "#,
            SELECT_ANNOUNCEMENTS
        ))
        .bind(filter.only_active as i32)
        .bind(filter.only_visible as i32)
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter()
            .map(Self::row_to_announcement)
            .collect()
    }

    async fn update(&self, id: Uuid, update: UpdateAnnouncementRequest) -> Result<Announcement> {
        let mut announcement = self.find_by_id(id).await?
            .ok_or_else(|| AppError::NotFound("Announcement not found".to_string()))?;

        if let Some(title) = update.title {
            announcement.title = title;
        }
        if let Some(body) = update.body {
            announcement.body = body;
        }
        if let Some(published_at) = update.published_at {
            announcement.published_at = start_of_day(published_at);
        }
        if let Some(expires_at) = update.expires_at {
            announcement.expires_at = expires_at.map(end_of_day);
        }
        if let Some(is_active) = update.is_active {
            announcement.is_active = is_active;
        }

        sqlx::query(
            r#"
            UPDATE announcements
            SET title = ?, body = ?, published_at = ?, expires_at = ?,
                is_active = ?, updated_at = ?
            WHERE id = ?
            "#
        )
        .bind(&announcement.title)
        .bind(&announcement.body)
        .bind(announcement.published_at.naive_utc())
        .bind(announcement.expires_at.map(|dt| dt.naive_utc()))
        .bind(announcement.is_active as i32)
        .bind(Utc::now().naive_utc())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated announcement".to_string())
        })
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM announcements WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Announcement not found".to_string()));
        }

        Ok(())
    }
}
