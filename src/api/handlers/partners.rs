use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    api::state::AppState,
    domain::{CreatePartnerRequest, Partner, UpdatePartnerRequest},
    error::Result,
};

#[derive(Debug, Serialize)]
pub struct PartnerDto {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub link_url: String,
    pub logo_url: Option<String>,
    pub is_active: bool,
}

impl From<Partner> for PartnerDto {
    fn from(partner: Partner) -> Self {
        Self {
            id: partner.id,
            name: partner.name,
            description: partner.description,
            link_url: partner.link_url,
            logo_url: partner.logo_url,
            is_active: partner.is_active,
        }
    }
}

async fn list_with(state: &AppState, active: Option<bool>) -> Result<Json<Vec<PartnerDto>>> {
    let partners = state.service_context.partner_repo.list(active).await?;

    Ok(Json(partners.into_iter().map(Into::into).collect()))
}

pub async fn admin_list(State(state): State<AppState>) -> Result<Json<Vec<PartnerDto>>> {
    list_with(&state, None).await
}

pub async fn portal_list(State(state): State<AppState>) -> Result<Json<Vec<PartnerDto>>> {
    list_with(&state, Some(true)).await
}

pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreatePartnerRequest>,
) -> Result<(StatusCode, Json<PartnerDto>)> {
    let partner = state.service_context.partner_repo.create(request).await?;

    Ok((StatusCode::CREATED, Json(partner.into())))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePartnerRequest>,
) -> Result<Json<PartnerDto>> {
    let partner = state.service_context.partner_repo.update(id, request).await?;

    Ok(Json(partner.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service_context.partner_repo.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
