use axum::{
    extract::State,
    Extension,
    Json,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::{
    api::{handlers::users::UserDto, middleware::auth::CurrentUser, state::AppState},
    error::Result,
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<UserDto>)> {
    let auth_service = &state.service_context.auth_service;

    let user = auth_service.login(&req.email, &req.password).await?;
    let token = auth_service.issue_token(user.id)?;

    tracing::info!("User {} logged in", user.email);

    Ok((
        jar.add(auth_service.create_session_cookie(&token)),
        Json(user.into()),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<LogoutResponse>) {
    // Tokens are stateless; dropping the cookie is all there is to do.
    let jar = jar.add(state.service_context.auth_service.create_logout_cookie());

    (jar, Json(LogoutResponse { message: "Logged out".to_string() }))
}

pub async fn me(Extension(current): Extension<CurrentUser>) -> Json<UserDto> {
    Json(current.user.into())
}
