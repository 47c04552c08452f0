use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;

use crate::config::database::DatabaseConnections;
use crate::config::{BootstrapSettings, SecretManager};
use crate::errors::InternalError;
use crate::providers::{
    AccessControlProvider, BlobStore, CleanupQueue, LocalBlobStore, Notifier, TokenProvider,
    notifier_from_settings,
};
use crate::stores::{CategoryStore, CommentStore, CredentialStore, PlaceStore, ReviewStore};

/// Centralized application data following the main-owned stores pattern
///
/// Every store and collaborator is created once and shared across
/// coordinators through `Arc<AppData>`.
///
/// ```text
/// main.rs
///   ↓
/// AppData::init(settings, secrets, connections)
///   ├─ stores (credential, category, place, review, comment)
///   ├─ token_provider / access_control
///   ├─ blob_store (LocalBlobStore) + cleanup_queue worker
///   └─ notifier (console or SMTP)
///   ↓ wrapped in Arc<AppData>
///   ├─ AuthCoordinator::new(app_data)
///   ├─ ReviewCoordinator::new(app_data)
///   └─ ...
/// ```
pub struct AppData {
    pub connections: DatabaseConnections,
    pub settings: Arc<BootstrapSettings>,
    pub secret_manager: Arc<SecretManager>,
    pub credential_store: Arc<CredentialStore>,
    pub category_store: Arc<CategoryStore>,
    pub place_store: Arc<PlaceStore>,
    pub review_store: Arc<ReviewStore>,
    pub comment_store: Arc<CommentStore>,
    pub token_provider: Arc<TokenProvider>,
    pub access_control: Arc<AccessControlProvider>,
    pub blob_store: Arc<dyn BlobStore>,
    pub notifier: Arc<dyn Notifier>,
    pub cleanup_queue: CleanupQueue,
}

impl AppData {
    /// Initialize application data with the configured collaborators
    ///
    /// Database connections should be initialized and migrated before calling
    /// this. Must run inside a tokio runtime since the cleanup worker is
    /// spawned here.
    pub async fn init(
        settings: BootstrapSettings,
        secret_manager: SecretManager,
        connections: DatabaseConnections,
    ) -> Result<Self, InternalError> {
        tracing::info!("Initializing AppData...");

        tokio::fs::create_dir_all(settings.media_root())
            .await
            .map_err(|e| InternalError::BlobStore(e.into()))?;
        let blob_store: Arc<dyn BlobStore> = Arc::new(LocalBlobStore::new(
            settings.media_root().clone(),
            settings.media_url_prefix(),
        ));
        let notifier = notifier_from_settings(settings.mail())?;

        tracing::info!("AppData initialization complete");
        Ok(Self::from_parts(
            settings,
            secret_manager,
            connections,
            blob_store,
            notifier,
        ))
    }

    /// Assemble application data around the given collaborators
    pub fn from_parts(
        settings: BootstrapSettings,
        secret_manager: SecretManager,
        connections: DatabaseConnections,
        blob_store: Arc<dyn BlobStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let db = connections.db.clone();
        let secret_manager = Arc::new(secret_manager);

        tracing::debug!("Creating stores...");
        let credential_store = Arc::new(CredentialStore::new(
            db.clone(),
            secret_manager.password_pepper().to_string(),
        ));
        let category_store = Arc::new(CategoryStore::new(db.clone()));
        let place_store = Arc::new(PlaceStore::new(db.clone()));
        let review_store = Arc::new(ReviewStore::new(db.clone()));
        let comment_store = Arc::new(CommentStore::new(db));

        let token_provider = Arc::new(TokenProvider::new(
            secret_manager.clone(),
            settings.jwt_expires_in_days(),
            settings.reset_token_ttl_minutes(),
        ));
        let access_control = Arc::new(AccessControlProvider::new(
            token_provider.clone(),
            credential_store.clone(),
        ));
        let cleanup_queue = CleanupQueue::start(
            blob_store.clone(),
            settings.cleanup_max_attempts(),
            Duration::from_millis(settings.cleanup_retry_delay_ms()),
        );

        Self {
            connections,
            settings: Arc::new(settings),
            secret_manager,
            credential_store,
            category_store,
            place_store,
            review_store,
            comment_store,
            token_provider,
            access_control,
            blob_store,
            notifier,
            cleanup_queue,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.connections.db
    }
}
