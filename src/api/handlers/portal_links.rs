use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    api::state::AppState,
    domain::PortalLink,
    error::{AppError, Result},
};

#[derive(Debug, Serialize)]
pub struct PortalLinkDto {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    pub link_url: String,
}

impl From<PortalLink> for PortalLinkDto {
    fn from(link: PortalLink) -> Self {
        Self {
            id: link.id,
            slug: link.slug,
            title: link.title,
            description: link.description,
            body: link.body,
            link_url: link.link_url,
        }
    }
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<PortalLinkDto>>> {
    let links = state.service_context.portal_link_repo.list_active().await?;

    Ok(Json(links.into_iter().map(Into::into).collect()))
}

pub async fn get(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PortalLinkDto>> {
    let link = state.service_context.portal_link_repo
        .find_active_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Link not found".to_string()))?;

    Ok(Json(link.into()))
}
