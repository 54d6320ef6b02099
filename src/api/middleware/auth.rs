use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::{
    api::state::AppState,
    auth,
    domain::User,
    error::AppError,
};

#[derive(Clone)]
pub struct CurrentUser {
    pub user: User,
}

async fn current_user(state: &AppState, jar: &CookieJar) -> Result<User, AppError> {
    let auth_service = &state.service_context.auth_service;
    let token = jar.get(auth_service.cookie_name()).map(|cookie| cookie.value());

    auth_service.authenticate(token).await
}

pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = current_user(&state, &jar).await?;

    // Insert current user into request extensions
    request.extensions_mut().insert(CurrentUser { user });

    Ok(next.run(request).await)
}

pub async fn require_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = auth::require_admin(current_user(&state, &jar).await?)?;

    request.extensions_mut().insert(CurrentUser { user });

    Ok(next.run(request).await)
}
