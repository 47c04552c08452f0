use std::sync::Arc;

use clap::Parser;
use poem::{Server, listener::TcpListener};

use explorer_backend::api::build_app;
use explorer_backend::app_data::AppData;
use explorer_backend::cli::{Cli, Commands, migrate, roles};
use explorer_backend::config::{BootstrapSettings, DatabaseConnections, SecretManager, init_logging};
use explorer_backend::types::internal::auth::Role;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_logging()?;

    let cli = Cli::parse();
    let settings = BootstrapSettings::from_env()?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(settings).await,
        Commands::Migrate => migrate::run_migrations(&settings).await,
        Commands::GrantAdmin { identifier } => {
            let app_data = init_app_data(settings).await?;
            roles::set_user_role(&app_data.credential_store, &identifier, Role::Admin).await
        }
        Commands::RevokeAdmin { identifier } => {
            let app_data = init_app_data(settings).await?;
            roles::set_user_role(&app_data.credential_store, &identifier, Role::User).await
        }
    }
}

async fn init_app_data(settings: BootstrapSettings) -> Result<AppData, Box<dyn std::error::Error>> {
    let secret_manager = SecretManager::init()?;

    let connections = DatabaseConnections::init(&settings).await?;
    connections.migrate().await?;

    Ok(AppData::init(settings, secret_manager, connections).await?)
}

async fn serve(settings: BootstrapSettings) -> Result<(), Box<dyn std::error::Error>> {
    let address = settings.server_address();
    let public_base_url = settings.public_base_url().to_string();

    let app_data = Arc::new(init_app_data(settings).await?);
    let app = build_app(app_data);

    tracing::info!("Starting server on http://{}", address);
    tracing::info!("Swagger UI available at {}/swagger", public_base_url);
    tracing::info!("API endpoints available at {}/api/v1", public_base_url);

    Server::new(TcpListener::bind(address)).run(app).await?;
    Ok(())
}
