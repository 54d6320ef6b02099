use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use member_portal::{
    api::{self, state::AppState},
    config::Settings,
    startup,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "member_portal=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    tracing::info!("Starting member portal on {}:{}", settings.server.host, settings.server.port);

    // Database, migrations and seed data
    let service_context = Arc::new(startup::bootstrap(&settings).await?);

    let settings = Arc::new(settings);
    let app = api::create_app(AppState::new(service_context, settings.clone()));

    let listener = tokio::net::TcpListener::bind(
        format!("{}:{}", settings.server.host, settings.server.port)
    ).await?;

    tracing::info!("Server listening on http://{}:{}", settings.server.host, settings.server.port);

    axum::serve(listener, app).await?;

    Ok(())
}
