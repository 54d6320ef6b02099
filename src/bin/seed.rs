use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use member_portal::{config::Settings, service::ServiceContext, startup};

/// Apply migrations and ensure the admin account and default portal links exist.
#[derive(Parser, Debug)]
#[command(name = "seed")]
struct Args {
    /// Overrides `database.url` from configuration.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "member_portal=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut settings = Settings::new()?;
    if let Some(url) = args.database_url {
        settings.database.url = url;
    }

    println!("🌱 Seeding {}", settings.database.url);

    let pool = startup::connect_pool(&settings.database).await?;

    println!("📋 Running migrations...");
    startup::migrate(&pool).await?;

    let context = ServiceContext::new(pool, &settings)?;
    let report = context.seed_service.seed_all().await?;
    startup::log_report(&report);

    if report.admin_created {
        println!("👤 Created admin {}", settings.admin.email);
    } else {
        println!("👤 Admin {} already present", settings.admin.email);
    }
    println!(
        "🔗 Portal links: {} created, {} updated",
        report.links_created, report.links_updated
    );
    println!("✅ Done");

    Ok(())
}
