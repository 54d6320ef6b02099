use axum::{
    extract::{Path, State, Extension},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{CreateUserRequest, Role, UpdateUserRequest, User},
    error::Result,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct UserDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            active: user.active,
            created_at: user.created_at,
            last_login_at: user.last_login_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PasswordUpdate {
    pub password: String,
}

pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserDto>>> {
    let users = state.service_context.user_service
        .list_users()
        .await?;

    Ok(Json(users.into_iter().map(Into::into).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserDto>)> {
    request.validate()?;

    let user = state.service_context.user_service
        .create_user(request)
        .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<UpdateUserRequest>,
) -> Result<Json<UserDto>> {
    update.validate()?;

    let user = state.service_context.user_service
        .update_user(id, update)
        .await?;

    Ok(Json(user.into()))
}

pub async fn update_password(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<PasswordUpdate>,
) -> Result<Json<UserDto>> {
    let user = state.service_context.user_service
        .change_password(id, &update.password)
        .await?;

    Ok(Json(user.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service_context.user_service
        .delete_user(id, &current.user)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
