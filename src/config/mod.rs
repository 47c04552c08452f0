// Configuration layer - environment driven settings, secrets, logging, database
mod bootstrap_settings;
pub mod database;
mod env_provider;
mod errors;
mod logging;
mod secret_config;
mod secret_manager;

pub use bootstrap_settings::{BootstrapSettings, MailBackend, MailSettings};
pub use database::DatabaseConnections;
#[cfg(test)]
pub use env_provider::MockEnvironment;
pub use env_provider::{EnvironmentProvider, SystemEnvironment, parse_setting};
pub use errors::ApplicationError;
pub use logging::{LoggingError, init_logging};
pub use secret_config::{SecretConfig, SecretType};
pub use secret_manager::{SecretError, SecretManager};
