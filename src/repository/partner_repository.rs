use async_trait::async_trait;
use chrono::{DateTime, Utc, NaiveDateTime};
use sqlx::{SqlitePool, FromRow};
use uuid::Uuid;

use crate::{
    domain::{CreatePartnerRequest, Partner, UpdatePartnerRequest},
    error::{AppError, Result},
    repository::PartnerRepository,
};

#[derive(FromRow)]
struct PartnerRow {
    id: String,
    name: String,
    description: String,
    link_url: String,
    logo_url: Option<String>,
    is_active: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqlitePartnerRepository {
    pool: SqlitePool,
}

impl SqlitePartnerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_partner(row: PartnerRow) -> Result<Partner> {
        Ok(Partner {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            name: row.name,
            description: row.description,
            link_url: row.link_url,
            logo_url: row.logo_url,
            is_active: row.is_active != 0,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }
}

#[async_trait]
impl PartnerRepository for SqlitePartnerRepository {
    async fn create(&self, request: CreatePartnerRequest) -> Result<Partner> {
        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO partners (
                id, name, description, link_url, logo_url, is_active,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, 1, ?, ?)
            "#
        )
        .bind(id.to_string())
        .bind(&request.name)
        .bind(&request.description)
        .bind(&request.link_url)
        .bind(&request.logo_url)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created partner".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Partner>> {
        let row = sqlx::query_as::<_, PartnerRow>(
            r#"
            SELECT id, name, description, link_url, logo_url, is_active,
                   created_at, updated_at
            FROM partners
            WHERE id = ?
            "#
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        row.map(Self::row_to_partner).transpose()
    }

    async fn list(&self, active: Option<bool>) -> Result<Vec<Partner>> {
        let active_int = active.map(|a| a as i32);

        let rows = sqlx::query_as::<_, PartnerRow>(
            r#"
            SELECT id, name, description, link_url, logo_url, is_active,
                   created_at, updated_at
            FROM partners
            WHERE (? IS NULL OR is_active = ?)
            ORDER BY name ASC
            "#
        )
        .bind(active_int)
        .bind(active_int)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter()
            .map(Self::row_to_partner)
            .collect()
    }

    async fn update(&self, id: Uuid, update: UpdatePartnerRequest) -> Result<Partner> {
        let mut partner = self.find_by_id(id).await?
            .ok_or_else(|| AppError::NotFound("Partner not found".to_string()))?;

        if let Some(name) = update.name {
            partner.name = name;
        }
        if let Some(description) = update.description {
            partner.description = description;
        }
        if let Some(link_url) = update.link_url {
            partner.link_url = link_url;
        }
        if let Some(logo_url) = update.logo_url {
            partner.logo_url = logo_url;
        }
        if let Some(is_active) = update.is_active {
            partner.is_active = is_active;
        }

        sqlx::query(
            r#"
            UPDATE partners
            SET name = ?, description = ?, link_url = ?, logo_url = ?,
                is_active = ?, updated_at = ?
            WHERE id = ?
            "#
        )
        .bind(&partner.name)
        .bind(&partner.description)
        .bind(&partner.link_url)
        .bind(&partner.logo_url)
        .bind(partner.is_active as i32)
        .bind(Utc::now().naive_utc())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated partner".to_string())
        })
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM partners WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Partner not found".to_string()));
        }

        Ok(())
    }
}
