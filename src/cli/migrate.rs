use crate::config::{BootstrapSettings, DatabaseConnections};

/// Run pending migrations against the configured database
///
/// Connects directly without building the full AppData.
pub async fn run_migrations(settings: &BootstrapSettings) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Running database migrations...");

    let connections = DatabaseConnections::init(settings).await?;
    connections.migrate().await?;

    tracing::info!("All migrations completed successfully");
    Ok(())
}
