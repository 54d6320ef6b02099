use std::{str::FromStr, time::Duration};

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

use crate::{
    config::{DatabaseConfig, Settings},
    service::{seed_service::SeedReport, ServiceContext},
};

pub async fn connect_pool(config: &DatabaseConfig) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

async fn prepare(settings: &Settings) -> anyhow::Result<(ServiceContext, SeedReport)> {
    let pool = connect_pool(&settings.database).await?;
    migrate(&pool).await?;

    let context = ServiceContext::new(pool, settings)?;
    let report = context.seed_service.seed_all().await?;

    Ok((context, report))
}

/// Connect, migrate and seed, retrying while the database comes up.
///
/// After `connect_attempts` failures one last attempt is made and its error
/// is returned to the caller.
pub async fn bootstrap(settings: &Settings) -> anyhow::Result<ServiceContext> {
    let attempts = settings.database.connect_attempts;
    let backoff = Duration::from_secs(settings.database.connect_backoff_secs);

    for attempt in 1..=attempts {
        match prepare(settings).await {
            Ok((context, report)) => {
                log_report(&report);
                return Ok(context);
            }
            Err(e) => {
                tracing::warn!(
                    "Database not ready (attempt {}/{}): {}",
                    attempt,
                    attempts,
                    e
                );
                tokio::time::sleep(backoff).await;
            }
        }
    }

    let (context, report) = prepare(settings).await?;
    log_report(&report);

    Ok(context)
}

pub fn log_report(report: &SeedReport) {
    tracing::info!(
        admin_created = report.admin_created,
        links_created = report.links_created,
        links_updated = report.links_updated,
        "Seeding complete"
    );
}
