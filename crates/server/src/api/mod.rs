pub mod assets;
pub mod health;
pub mod openapi;
pub mod schemas;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use shutter_service::AssetService;

use self::openapi::ApiDoc;

/// Room for multipart boundaries and part headers on top of the upload limit.
pub const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The asset service.
    pub service: Arc<AssetService>,
    /// Path to the built frontend files.
    pub ui_path: Option<String>,
    /// Whether the frontend is served.
    pub ui_enabled: bool,
}

impl AppState {
    /// State with the frontend disabled.
    pub fn new(service: Arc<AssetService>) -> Self {
        Self {
            service,
            ui_path: None,
            ui_enabled: false,
        }
    }
}

/// Build the Axum router with all API routes, middleware, and Swagger UI.
pub fn router(state: AppState) -> Router {
    let body_limit = usize::try_from(state.service.config().max_upload_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    let api = Router::new()
        .route("/api/health", get(health::health))
        .route("/metrics", get(health::metrics))
        .route("/api/assets", get(assets::list).post(assets::upload))
        .route(
            "/api/assets/{id}",
            get(assets::download).delete(assets::delete),
        )
        .layer(DefaultBodyLimit::max(body_limit));

    let mut router = Router::new()
        .merge(api)
        // Swagger UI must be merged before the UI fallback, otherwise the
        // fallback swallows /swagger-ui requests.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()));

    if let Some(path_str) = state.ui_path.as_ref().filter(|_| state.ui_enabled) {
        let path = std::path::PathBuf::from(path_str);
        if path.exists() {
            let index_path = path.join("index.html");
            router = router.fallback_service(ServeDir::new(path).fallback(ServeFile::new(index_path)));
        } else {
            tracing::warn!(
                path = %path.display(),
                "frontend directory not found, UI will not be served"
            );
        }
    }

    router
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
