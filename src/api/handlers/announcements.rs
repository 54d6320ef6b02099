use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
    Extension,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    api::{state::AppState, middleware::auth::CurrentUser},
    domain::{Announcement, AnnouncementFilter, CreateAnnouncementRequest, UpdateAnnouncementRequest},
    error::Result,
};

#[derive(Debug, Serialize)]
pub struct AnnouncementDto {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub published_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub author_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Announcement> for AnnouncementDto {
    fn from(announcement: Announcement) -> Self {
        Self {
            id: announcement.id,
            title: announcement.title,
            body: announcement.body,
            published_at: announcement.published_at,
            expires_at: announcement.expires_at,
            is_active: announcement.is_active,
            author_name: announcement.author_name,
            created_at: announcement.created_at,
        }
    }
}

async fn list_with(state: &AppState, filter: AnnouncementFilter) -> Result<Json<Vec<AnnouncementDto>>> {
    let announcements = state.service_context.announcement_repo
        .list(filter)
        .await?;

    Ok(Json(announcements.into_iter().map(Into::into).collect()))
}

/// Every announcement, including inactive and expired ones.
pub async fn admin_list(State(state): State<AppState>) -> Result<Json<Vec<AnnouncementDto>>> {
    list_with(&state, AnnouncementFilter::all()).await
}

/// Active, unexpired announcements for members.
pub async fn portal_list(State(state): State<AppState>) -> Result<Json<Vec<AnnouncementDto>>> {
    list_with(&state, AnnouncementFilter::visible()).await
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<CreateAnnouncementRequest>,
) -> Result<(StatusCode, Json<AnnouncementDto>)> {
    let announcement = state.service_context.announcement_repo
        .create(request, Some(current.user.id))
        .await?;

    Ok((StatusCode::CREATED, Json(announcement.into())))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAnnouncementRequest>,
) -> Result<Json<AnnouncementDto>> {
    let announcement = state.service_context.announcement_repo
        .update(id, request)
        .await?;

    Ok(Json(announcement.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service_context.announcement_repo.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
