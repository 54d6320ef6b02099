use async_trait::async_trait;
use chrono::{DateTime, Utc, NaiveDateTime};
use sqlx::{SqlitePool, FromRow};
use uuid::Uuid;

use crate::{
    domain::{Course, CreateCourseRequest, UpdateCourseRequest},
    error::{AppError, Result},
    repository::CourseRepository,
};

#[derive(FromRow)]
struct CourseRow {
    id: String,
    title: String,
    description: String,
    image_url: Option<String>,
    access_url: String,
    is_active: i32,
    created_by: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteCourseRepository {
    pool: SqlitePool,
}

impl SqliteCourseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_course(row: CourseRow) -> Result<Course> {
        Ok(Course {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            title: row.title,
            description: row.description,
            image_url: row.image_url,
            access_url: row.access_url,
            is_active: row.is_active != 0,
            created_by: row.created_by
                .map(|s| Uuid::parse_str(&s))
                .transpose()
                .map_err(|e| AppError::Database(e.to_string()))?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }
}

#[async_trait]
impl CourseRepository for SqliteCourseRepository {
    async fn create(&self, request: CreateCourseRequest, created_by: Option<Uuid>) -> Result<Course> {
        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO courses (
                id, title, description, image_url, access_url, is_active,
                created_by, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, 1, ?, ?, ?)
            "#
        )
        .bind(id.to_string())
        .bind(&request.title)
        .bind(&request.description)
        .bind(&request.image_url)
        .bind(&request.access_url)
        .bind(created_by.map(|id| id.to_string()))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created course".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Course>> {
        let row = sqlx::query_as::<_, CourseRow>(
            r#"
            SELECT id, title, description, image_url, access_url, is_active,
                   created_by, created_at, updated_at
            FROM courses
            WHERE id = ?
            "#
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        row.map(Self::row_to_course).transpose()
    }

    async fn list(&self, active: Option<bool>) -> Result<Vec<Course>> {
        let active_int = active.map(|a| a as i32);

        let rows = sqlx::query_as::<_, CourseRow>(
            r#"
            SELECT id, title, description, image_url, access_url, is_active,
                   created_by, created_at, updated_at
            FROM courses
            WHERE (? IS NULL OR is_active = ?)
            ORDER BY created_at DESC
            "#
        )
        .bind(active_int)
        .bind(active_int)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter()
            .map(Self::row_to_course)
            .collect()
    }

    async fn update(&self, id: Uuid, update: UpdateCourseRequest) -> Result<Course> {
        let mut course = self.find_by_id(id).await?
            .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

        if let Some(title) = update.title {
            course.title = title;
        }
        if let Some(description) = update.description {
            course.description = description;
        }
        if let Some(image_url) = update.image_url {
            course.image_url = image_url;
        }
        if let Some(access_url) = update.access_url {
            course.access_url = access_url;
        }
        if let Some(is_active) = update.is_active {
            course.is_active = is_active;
        }

        sqlx::query(
            r#"
            UPDATE courses
            SET title = ?, description = ?, image_url = ?, access_url = ?,
                is_active = ?, updated_at = ?
            WHERE id = ?
            "#
        )
        .bind(&course.title)
        .bind(&course.description)
        .bind(&course.image_url)
        .bind(&course.access_url)
        .bind(course.is_active as i32)
        .bind(Utc::now().naive_utc())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated course".to_string())
        })
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM courses WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Course not found".to_string()));
        }

        Ok(())
    }
}
