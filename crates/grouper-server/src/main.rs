//! Grouper server: application entry point.

mod config;

use anyhow::Context;
use grouper_api::GroupApi;
use grouper_db::DbManager;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("grouper=info")),
        )
        .json()
        .init();

    tracing::info!("Starting Grouper server...");

    let config = ServerConfig::from_env()?;

    let db = DbManager::connect(&config.db)
        .await
        .context("failed to connect to SurrealDB")?;
    db.migrate().await.context("failed to apply migrations")?;

    let _api = GroupApi::from_repositories(
        db.access_tokens(),
        db.users(),
        db.groups(),
        db.memberships(),
        config.auth,
    );
    tracing::info!("Group API ready");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    tracing::info!("Grouper server stopped.");
    Ok(())
}
