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
    domain::{Course, CreateCourseRequest, UpdateCourseRequest},
    error::Result,
};

#[derive(Debug, Serialize)]
pub struct CourseDto {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub access_url: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Course> for CourseDto {
    fn from(course: Course) -> Self {
        Self {
            id: course.id,
            title: course.title,
            description: course.description,
            image_url: course.image_url,
            access_url: course.access_url,
            is_active: course.is_active,
            created_at: course.created_at,
        }
    }
}

async fn list_with(state: &AppState, active: Option<bool>) -> Result<Json<Vec<CourseDto>>> {
    let courses = state.service_context.course_repo.list(active).await?;

    Ok(Json(courses.into_iter().map(Into::into).collect()))
}

pub async fn admin_list(State(state): State<AppState>) -> Result<Json<Vec<CourseDto>>> {
    list_with(&state, None).await
}

pub async fn portal_list(State(state): State<AppState>) -> Result<Json<Vec<CourseDto>>> {
    list_with(&state, Some(true)).await
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<CreateCourseRequest>,
) -> Result<(StatusCode, Json<CourseDto>)> {
    let course = state.service_context.course_repo
        .create(request, Some(current.user.id))
        .await?;

    Ok((StatusCode::CREATED, Json(course.into())))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCourseRequest>,
) -> Result<Json<CourseDto>> {
    let course = state.service_context.course_repo.update(id, request).await?;

    Ok(Json(course.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service_context.course_repo.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
