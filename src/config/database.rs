use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection, DatabaseTransaction, TransactionTrait};

use crate::config::BootstrapSettings;
use crate::errors::{InternalError, internal::DatabaseError};

/// Owns the database pool shared by every store
#[derive(Clone, Debug)]
pub struct DatabaseConnections {
    pub db: DatabaseConnection,
}

impl DatabaseConnections {
    /// Connect using the configured DATABASE_URL
    ///
    /// Does NOT run migrations - call `migrate()` separately.
    pub async fn init(settings: &BootstrapSettings) -> Result<Self, InternalError> {
        Self::connect(settings.database_url()).await
    }

    pub async fn connect(database_url: &str) -> Result<Self, InternalError> {
        let db = Database::connect(database_url)
            .await
            .map_err(|e| InternalError::database("connect_database", e))?;

        tracing::debug!("Connected to database: {}", database_url);

        Ok(Self { db })
    }

    /// Run all pending migrations
    pub async fn migrate(&self) -> Result<(), InternalError> {
        Migrator::up(&self.db, None)
            .await
            .map_err(|source| InternalError::Database(DatabaseError::Migration { source }))?;

        tracing::debug!("Database migrations completed");

        Ok(())
    }
}

/// Begin a transaction; dropping it without commit rolls back
pub async fn begin_transaction(db: &DatabaseConnection) -> Result<DatabaseTransaction, InternalError> {
    db.begin().await.map_err(InternalError::transaction_begin)
}

pub async fn commit_transaction(txn: DatabaseTransaction) -> Result<(), InternalError> {
    txn.commit().await.map_err(InternalError::transaction_commit)
}
