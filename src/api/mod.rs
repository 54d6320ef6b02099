pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    http::HeaderValue,
    Router,
    routing::{get, post, put, patch, delete},
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use state::AppState;

pub fn create_app(app_state: AppState) -> Router {
    let cors = cors_layer(&app_state.settings.server);

    Router::new()
        // Root and health endpoints
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))

        // Auth routes
        .nest("/auth", auth_routes(app_state.clone()))

        // Member-facing content
        .nest("/portal", portal_routes(app_state.clone()))

        // Admin routes
        .nest("/admin", admin_routes(app_state.clone()))

        .with_state(app_state)

        // Middleware
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Browsers only send the session cookie cross-origin when the origin is
/// listed explicitly, so credentials are allowed only for configured origins.
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .allowed_origins()
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .merge(Router::new()
            .route("/me", get(handlers::auth::me))
            .route_layer(axum::middleware::from_fn_with_state(
                state,
                middleware::auth::require_auth,
            ))
        )
}

fn portal_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/announcements", get(handlers::announcements::portal_list))
        .route("/courses", get(handlers::courses::portal_list))
        .route("/partners", get(handlers::partners::portal_list))
        .route("/links", get(handlers::portal_links::list))
        .route("/links/:slug", get(handlers::portal_links::get))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/users", user_routes())
        .nest("/announcements", announcement_routes())
        .nest("/courses", course_routes())
        .nest("/partners", partner_routes())
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_admin,
        ))
        .with_state(state)
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::users::list))
        .route("/", post(handlers::users::create))
        .route("/templates/create", get(handlers::bulk::create_template))
        .route("/templates/delete", get(handlers::bulk::delete_template))
        .route("/bulk-create", post(handlers::bulk::bulk_create))
        .route("/bulk-delete", post(handlers::bulk::bulk_delete))
        .route("/:id", patch(handlers::users::update))
        .route("/:id", delete(handlers::users::delete))
        .route("/:id/password", patch(handlers::users::update_password))
}

fn announcement_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::announcements::admin_list))
        .route("/", post(handlers::announcements::create))
        .route("/:id", put(handlers::announcements::update))
        .route("/:id", delete(handlers::announcements::delete))
}

fn course_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::courses::admin_list))
        .route("/", post(handlers::courses::create))
        .route("/:id", put(handlers::courses::update))
        .route("/:id", delete(handlers::courses::delete))
}

fn partner_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::partners::admin_list))
        .route("/", post(handlers::partners::create))
        .route("/:id", put(handlers::partners::update))
        .route("/:id", delete(handlers::partners::delete))
}
