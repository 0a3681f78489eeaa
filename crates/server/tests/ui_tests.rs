use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use shutter_blob_memory::MemoryBlobStore;
use shutter_index_memory::MemoryMetadataIndex;
use shutter_server::api::AppState;
use shutter_server::config::UiConfig;
use shutter_service::AssetServiceBuilder;

fn state_with_ui(ui: &UiConfig) -> AppState {
    let service = AssetServiceBuilder::new()
        .blobs(Arc::new(MemoryBlobStore::new()))
        .index(Arc::new(MemoryMetadataIndex::new()))
        .build()
        .expect("service should build");

    AppState {
        service: Arc::new(service),
        ui_path: Some(ui.dist_path.clone()),
        ui_enabled: ui.enabled,
    }
}

async fn get(app: &axum::Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8_lossy(&body).into_owned())
}

#[tokio::test]
async fn ui_serves_index_html() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("index.html"),
        "<html><body>Shutter gallery</body></html>",
    )
    .unwrap();
    std::fs::write(dir.path().join("app.js"), "console.log('gallery');").unwrap();

    let ui = UiConfig {
        enabled: true,
        dist_path: dir.path().to_str().unwrap().to_owned(),
    };
    let app = shutter_server::api::router(state_with_ui(&ui));

    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Shutter gallery"));

    // Unknown client-side routes fall back to index.html.
    let (status, body) = get(&app, "/gallery/recent").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Shutter gallery"));

    let (status, body) = get(&app, "/app.js").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("gallery"));

    // API routes still win over the fallback.
    let (status, body) = get(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"ok\":true"));
}

#[tokio::test]
async fn ui_disabled_returns_404_for_root() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<html></html>").unwrap();

    let ui = UiConfig {
        enabled: false,
        dist_path: dir.path().to_str().unwrap().to_owned(),
    };
    let app = shutter_server::api::router(state_with_ui(&ui));

    let (status, _) = get(&app, "/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn ui_missing_directory_is_not_served() {
    let ui = UiConfig {
        enabled: true,
        dist_path: "/nonexistent/shutter/client/dist".to_owned(),
    };
    let app = shutter_server::api::router(state_with_ui(&ui));

    let (status, _) = get(&app, "/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
