#![allow(clippy::needless_for_each)]

use shutter_core::{Asset, AssetPage};

use super::schemas::{
    DeletedResponse, ErrorResponse, HealthResponse, MetricsResponse, UploadForm,
};

#[derive(utoipa::OpenApi)]
#[openapi(
    info(
        title = "Shutter Asset API",
        version = "0.1.0",
        description = "HTTP API for the Shutter asset store. Upload, list, download, and delete binary assets.",
        license(name = "Apache-2.0")
    ),
    tags(
        (name = "Assets", description = "Asset upload, listing, download, and deletion"),
        (name = "Health", description = "Service health and metrics"),
    ),
    paths(
        super::assets::upload,
        super::assets::list,
        super::assets::download,
        super::assets::delete,
        super::health::health,
        super::health::metrics,
    ),
    components(schemas(
        Asset, AssetPage,
        UploadForm, DeletedResponse,
        ErrorResponse, HealthResponse, MetricsResponse,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use utoipa::OpenApi;

    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        for expected in ["/api/assets", "/api/assets/{id}", "/api/health", "/metrics"] {
            assert!(paths.contains(&expected), "missing {expected} in {paths:?}");
        }
    }
}
