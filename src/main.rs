//! # Integrations CLI
//!
//! Operational entry point for the integrations store.
//!
//! ```bash
//! # Apply pending schema migrations
//! integrations migrate
//!
//! # Print integrations whose token is due for refresh, one JSON object per line
//! integrations refresh-due
//!
//! # Disable up to 3 channels of an organization after a plan downgrade
//! integrations cap-channels --org 6c1f... --limit 3
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use integrations::{
    config::ConfigLoader, db, repositories::IntegrationRepository, storage, telemetry,
};
use tracing::info;
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "integrations",
    about = "Integrations store maintenance",
    long_about = "Maintenance commands for the organization integrations store"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply pending database migrations
    Migrate,
    /// List integrations whose token expires within a day
    RefreshDue,
    /// Disable up to `limit` enabled channels of an organization
    CapChannels {
        /// Organization id
        #[arg(long)]
        org: Uuid,
        /// Number of channels to disable
        #[arg(long)]
        limit: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::new().load().context("loading configuration")?;
    telemetry::init_tracing(&config).context("initializing tracing")?;

    info!(profile = %config.profile, "Loaded configuration");
    if let Ok(redacted) = config.redacted_json() {
        tracing::debug!(config = %redacted, "Effective configuration");
    }

    let db = db::init_pool(&config)
        .await
        .context("initializing database connection pool")?;

    match cli.command {
        Command::Migrate => {
            db::run_migrations(&db).await?;
            info!("Migrations applied");
        }
        Command::RefreshDue => {
            let repo = repository(db, &config)?;
            let due = repo
                .needs_to_be_refreshed()
                .await
                .context("querying integrations due for refresh")?;
            for integration in &due {
                println!("{}", serde_json::to_string(integration)?);
            }
            info!(count = due.len(), "Listed integrations due for refresh");
        }
        Command::CapChannels { org, limit } => {
            let repo = repository(db, &config)?;
            let disabled = repo
                .disable_integrations(org, limit)
                .await
                .with_context(|| format!("disabling channels of organization {org}"))?;
            println!("{disabled}");
        }
    }

    Ok(())
}

fn repository(
    db: sea_orm::DatabaseConnection,
    config: &integrations::config::AppConfig,
) -> Result<IntegrationRepository> {
    let storage = storage::from_config(config).context("initializing upload storage")?;
    Ok(IntegrationRepository::new(
        Arc::new(db),
        storage,
        config.picture_urls(),
    ))
}
