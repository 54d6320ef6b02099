use axum::{http::StatusCode, Json, response::IntoResponse};
use serde_json::json;

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "Member Portal API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "operational",
        "endpoints": {
            "health": "/health",
            "auth": "/auth/login",
            "portal": "/portal",
            "admin": "/admin"
        }
    }))
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}
