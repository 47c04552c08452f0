// API layer - HTTP endpoints
pub mod category;
pub mod comment;
pub mod health;
pub mod helpers;
pub mod place;
pub mod review;
pub mod user;

use std::sync::Arc;

use poem::{Route, endpoint::StaticFilesEndpoint};
use poem_openapi::OpenApiService;

pub use category::CategoryApi;
pub use comment::CommentApi;
pub use health::HealthApi;
pub use place::PlaceApi;
pub use review::ReviewApi;
pub use user::UserApi;

use crate::app_data::AppData;

/// Versioned prefix every JSON endpoint is nested under
pub const API_PREFIX: &str = "/api/v1";

/// Compose the OpenAPI service, Swagger UI and media file serving
pub fn build_app(app_data: Arc<AppData>) -> Route {
    let settings = app_data.settings.clone();

    let api_service = OpenApiService::new(
        (
            HealthApi::new(app_data.clone()),
            UserApi::new(app_data.clone()),
            CategoryApi::new(app_data.clone()),
            PlaceApi::new(app_data.clone()),
            ReviewApi::new(app_data.clone()),
            CommentApi::new(app_data),
        ),
        "Explorer API",
        env!("CARGO_PKG_VERSION"),
    )
    .server(format!("{}{}", settings.public_base_url(), API_PREFIX));

    let ui = api_service.swagger_ui();

    Route::new()
        .nest(API_PREFIX, api_service)
        .nest("/swagger", ui)
        .nest(
            settings.media_url_prefix(),
            StaticFilesEndpoint::new(settings.media_root()),
        )
}
