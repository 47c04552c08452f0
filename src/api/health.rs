use std::sync::Arc;

use chrono::Utc;
use poem_openapi::{OpenApi, Tags, payload::Json};

use crate::app_data::AppData;
use crate::types::dto::common::HealthResponse;

/// Liveness plus a database round trip
pub struct HealthApi {
    app_data: Arc<AppData>,
}

impl HealthApi {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self { app_data }
    }
}

#[derive(Tags)]
enum HealthTags {
    Health,
}

#[OpenApi]
impl HealthApi {
    /// Report service and database status
    #[oai(path = "/health", method = "get", tag = "HealthTags::Health")]
    async fn health(&self) -> Json<HealthResponse> {
        let database = match self.app_data.db().ping().await {
            Ok(()) => "up",
            Err(e) => {
                tracing::warn!("Health check database ping failed: {}", e);
                "down"
            }
        };

        Json(HealthResponse {
            status: if database == "up" { "healthy" } else { "degraded" }.to_string(),
            database: database.to_string(),
            timestamp: Utc::now().to_rfc3339(),
        })
    }
}
