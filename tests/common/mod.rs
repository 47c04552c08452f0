// Common test utilities for integration tests

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use explorer_backend::api::build_app;
use explorer_backend::app_data::AppData;
use explorer_backend::config::{BootstrapSettings, DatabaseConnections, EnvironmentProvider, SecretManager};
use explorer_backend::providers::{MemoryBlobStore, MemoryNotifier};
use explorer_backend::types::internal::auth::Role;
use migration::{Migrator, MigratorTrait};
use poem::Route;
use poem::test::TestClient;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::{Value, json};

pub const TEST_JWT_SECRET: &str = "integration-jwt-secret-at-least-32-chars";
pub const TEST_PEPPER: &str = "integration-pepper-value";
pub const TEST_RESET_SECRET: &str = "integration-reset-secret-at-least-32-chars";

/// Environment backed by a plain map
#[derive(Default)]
pub struct MapEnvironment {
    vars: HashMap<String, String>,
}

impl MapEnvironment {
    pub fn with_vars(vars: &[(&str, &str)]) -> Self {
        Self {
            vars: vars
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl EnvironmentProvider for MapEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// In-memory database pinned to a single connection, migrated
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

/// Application wired to in-memory collaborators, plus an HTTP test client
pub struct TestServer {
    pub data: Arc<AppData>,
    pub blob_store: Arc<MemoryBlobStore>,
    pub notifier: Arc<MemoryNotifier>,
    pub client: TestClient<Route>,
}

impl TestServer {
    pub async fn start() -> Self {
        let env = MapEnvironment::with_vars(&[
            ("APP_ENV", "development"),
            ("PUBLIC_BASE_URL", "http://explorer.test"),
            ("CLEANUP_MAX_ATTEMPTS", "2"),
            ("CLEANUP_RETRY_DELAY_MS", "1"),
        ]);
        let settings = BootstrapSettings::from_env_provider(&env).expect("valid settings");
        let secrets = SecretManager::from_values(TEST_JWT_SECRET, TEST_PEPPER, TEST_RESET_SECRET);

        let db = setup_test_db().await;
        let blob_store = Arc::new(MemoryBlobStore::new());
        let notifier = Arc::new(MemoryNotifier::new());

        let data = Arc::new(AppData::from_parts(
            settings,
            secrets,
            DatabaseConnections { db },
            blob_store.clone(),
            notifier.clone(),
        ));
        let client = TestClient::new(build_app(data.clone()));

        Self {
            data,
            blob_store,
            notifier,
            client,
        }
    }

    /// Sign up `name` through the API and return the session token
    pub async fn signup(&self, name: &str) -> String {
        let resp = self
            .client
            .post("/api/v1/users/signup")
            .body_json(&json!({
                "fullname": format!("{} Tester", name),
                "email": format!("{}@example.com", name),
                "username": name,
                "password": "password123",
                "passwordConfirm": "password123",
            }))
            .send()
            .await;
        resp.assert_status(poem::http::StatusCode::CREATED);

        let body = read_json(resp).await;
        body["data"]["token"]
            .as_str()
            .expect("token in signup response")
            .to_string()
    }

    /// Sign up `name`, promote them to admin and return their token
    pub async fn admin(&self, name: &str) -> String {
        let token = self.signup(name).await;
        let store = &self.data.credential_store;
        store
            .set_role(store.db(), name, Role::Admin)
            .await
            .expect("promote to admin");
        token
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

pub async fn read_json(resp: poem::test::TestResponse) -> Value {
    let text = resp
        .0
        .into_body()
        .into_string()
        .await
        .expect("readable body");
    serde_json::from_str(&text).expect("JSON body")
}
