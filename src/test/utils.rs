// Test utilities shared across unit tests
// Only compiled when running tests

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::app_data::AppData;
use crate::config::database::DatabaseConnections;
use crate::config::{BootstrapSettings, MockEnvironment, SecretManager};
use crate::providers::{MemoryBlobStore, MemoryNotifier};
use crate::stores::{NewPlace, NewUser};
use crate::types::internal::auth::Role;
use crate::types::internal::context::{RequestContext, RequestContextMeta};

pub const TEST_JWT_SECRET: &str = "test-secret-key-minimum-32-characters-long";
pub const TEST_PEPPER: &str = "test-pepper-for-unit-tests";
pub const TEST_RESET_SECRET: &str = "test-reset-secret-minimum-32-characters";

/// In-memory SQLite database with all migrations applied
///
/// The pool is pinned to one connection that never idles out, since every
/// connection to `sqlite::memory:` opens its own empty database.
pub async fn setup_test_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(Duration::from_secs(3600))
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to create test database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

pub fn test_secret_manager() -> SecretManager {
    SecretManager::from_values(TEST_JWT_SECRET, TEST_PEPPER, TEST_RESET_SECRET)
}

/// Settings built from an empty environment, with fast cleanup retries
pub fn test_settings() -> BootstrapSettings {
    let env = MockEnvironment::empty().with_vars(&[
        ("DATABASE_URL", "sqlite::memory:"),
        ("APP_ENV", "development"),
        ("CLEANUP_MAX_ATTEMPTS", "2"),
        ("CLEANUP_RETRY_DELAY_MS", "1"),
    ]);
    BootstrapSettings::from_env_provider(&env).expect("Failed to build test settings")
}

/// Signup payload for `name` with the password "password123"
pub fn new_user(name: &str) -> NewUser {
    NewUser {
        fullname: format!("{} Tester", name),
        email: format!("{}@example.com", name),
        username: name.to_string(),
        password: "password123".to_string(),
        password_confirm: "password123".to_string(),
    }
}

/// Fully wired application data over in-memory collaborators
pub struct TestApp {
    pub data: Arc<AppData>,
    pub blob_store: Arc<MemoryBlobStore>,
    pub notifier: Arc<MemoryNotifier>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_db(setup_test_db().await)
    }

    /// Application over a migrated file-backed SQLite database with the
    /// default connection pool, so transactions really run side by side
    pub async fn with_file_db(path: &Path) -> Self {
        let url = format!("sqlite://{}?mode=rwc", path.display());
        let db = Database::connect(url)
            .await
            .expect("Failed to open file database");
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");
        Self::with_db(db)
    }

    pub fn with_db(db: DatabaseConnection) -> Self {
        let blob_store = Arc::new(MemoryBlobStore::new());
        let notifier = Arc::new(MemoryNotifier::new());

        let data = AppData::from_parts(
            test_settings(),
            test_secret_manager(),
            DatabaseConnections { db },
            blob_store.clone(),
            notifier.clone(),
        );

        Self {
            data: Arc::new(data),
            blob_store,
            notifier,
        }
    }

    /// Authenticated context for an existing user, via a real token
    pub async fn context_for(&self, username: &str) -> RequestContext {
        let store = &self.data.credential_store;
        let user = store
            .find_by_username(store.db(), username)
            .await
            .unwrap()
            .expect("user exists");
        let token = self.data.token_provider.generate_jwt(&user.id).unwrap();

        self.data
            .access_control
            .authenticate(&RequestContextMeta::with_bearer(token))
            .await
            .unwrap()
            .into_result()
            .unwrap()
    }

    /// Create a regular user and return a context signed in as them
    pub async fn signup_context(&self, name: &str) -> RequestContext {
        let store = &self.data.credential_store;
        store.create_user(store.db(), new_user(name)).await.unwrap();
        self.context_for(name).await
    }

    /// Create an admin and return a context signed in as them
    pub async fn admin_context(&self, name: &str) -> RequestContext {
        let store = &self.data.credential_store;
        store.create_user(store.db(), new_user(name)).await.unwrap();
        store.set_role(store.db(), name, Role::Admin).await.unwrap();
        self.context_for(name).await
    }

    /// Create a place under a fresh category and return its id
    pub async fn create_place(&self, name: &str) -> String {
        let db = self.data.db();
        let category = self
            .data
            .category_store
            .create(db, &format!("{} category", name), None)
            .await
            .unwrap();
        self.data
            .place_store
            .create(
                db,
                NewPlace {
                    name: name.to_string(),
                    category_id: category.id,
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .id
    }
}

/// Fresh database file path under the system temp directory
pub fn temp_db_path() -> PathBuf {
    std::env::temp_dir().join(format!("explorer-test-{}.db", uuid::Uuid::new_v4()))
}

/// Remove a database file and its WAL side files
pub fn remove_db_files(path: &Path) {
    for suffix in ["", "-wal", "-shm", "-journal"] {
        let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
    }
}
