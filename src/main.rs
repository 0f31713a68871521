use anyhow::Context;
use tracing_subscriber::EnvFilter;

use ems_api::config::config;
use ems_api::database::Database;
use ems_api::is_production;
use ems_api::server::{serve, AppState};
use ems_api::services::seed_admin;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config();
    tracing::info!("Starting EMS API in {:?} mode", config.environment);
    if config.security.jwt_secret.is_empty() {
        if is_production!() {
            anyhow::bail!("JWT_SECRET must be set in production");
        }
        tracing::warn!("JWT_SECRET is empty; token issuance will fail");
    }

    let db = Database::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    db.migrate().await.context("failed to run migrations")?;

    if let Some(admin) = seed_admin(&db, &config.bootstrap)
        .await
        .context("failed to create bootstrap admin")?
    {
        tracing::info!("Created bootstrap admin '{}'", admin.username);
    }
    if db.is_memory() {
        match config.bootstrap.admin() {
            Some((username, _)) => tracing::warn!(
                "Using in-memory storage: data is lost on exit; log in as '{}'",
                username
            ),
            None => tracing::warn!(
                "Using in-memory storage with no EMS_ADMIN_USERNAME/EMS_ADMIN_PASSWORD; nobody can log in"
            ),
        }
    }

    let result = serve(AppState::new(config.clone(), db.clone())).await;
    db.close().await;
    result
}
