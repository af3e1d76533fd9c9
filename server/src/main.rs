use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    response::Json,
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use renditioner_core::{LocalStorage, Processor};

mod handlers;
mod settings;

use handlers::AppState;
use settings::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::from_env().context("Invalid configuration")?;
    log::info!(
        "Using configuration: small={} medium={} original={} source={}",
        settings.processing.small_dir,
        settings.processing.medium_dir,
        settings.processing.original_dir,
        settings.processing.source_dir
    );

    let storage = LocalStorage::new(&settings.storage_root)
        .await
        .with_context(|| format!("Failed to open storage at {}", settings.storage_root.display()))?;

    let mut processor = Processor::new(Arc::new(storage), settings.processing.clone());
    if let Some(limit) = settings.io_timeout {
        processor = processor.with_io_timeout(limit);
    }

    let state = AppState {
        processor: Arc::new(processor),
        delete_source: settings.delete_source,
    };

    log::info!("Renditioner server running on http://{}", settings.bind_addr);
    log::info!("   POST /events - Process an uploaded image");
    log::info!("   GET  /health - Health check");

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", settings.bind_addr))?;
    axum::serve(listener, app(state))
        .await
        .context("Server error")?;

    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/events", post(handlers::process_event))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn root() -> &'static str {
    "Renditioner Server v0.1.0\n\nAPI Endpoints:\n  POST /events\n  GET  /health\n"
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
    use renditioner_core::ProcessingConfig;
    use tower::ServiceExt;

    fn jpeg_bytes() -> Vec<u8> {
        let buffer = ImageBuffer::from_fn(900, 600, |x, y| Rgb([(x % 200) as u8, (y % 200) as u8, 90]));
        let mut out = Vec::new();
        DynamicImage::ImageRgb8(buffer)
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Jpeg)
            .unwrap();
        out
    }

    async fn test_app(root: &std::path::Path, delete_source: bool) -> Router {
        let storage = LocalStorage::new(root).await.unwrap();
        let config = ProcessingConfig::new("small/", "medium/", "original/", "uploads/");
        app(AppState {
            processor: Arc::new(Processor::new(Arc::new(storage), config)),
            delete_source,
        })
    }

    fn event_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let response = test_app(dir.path(), false)
            .await
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_event_produces_renditions_and_deletes_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = jpeg_bytes();
        std::fs::create_dir_all(dir.path().join("uploads")).unwrap();
        std::fs::write(dir.path().join("uploads/photo.jpg"), &source).unwrap();

        let response = test_app(dir.path(), false)
            .await
            .oneshot(event_request(
                "/events?delete=true",
                r#"{"bucket":"b","name":"uploads/photo.jpg"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["source_deleted"], true);
        assert_eq!(
            body["data"]["renditions"],
            serde_json::json!(["small/photo.jpg", "medium/photo.jpg", "original/photo.jpg"])
        );

        assert!(dir.path().join("small/photo.jpg").exists());
        assert!(dir.path().join("medium/photo.jpg").exists());
        assert_eq!(std::fs::read(dir.path().join("original/photo.jpg")).unwrap(), source);
        assert!(!dir.path().join("uploads/photo.jpg").exists());
    }

    #[tokio::test]
    async fn test_event_outside_source_dir_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let response = test_app(dir.path(), false)
            .await
            .oneshot(event_request("/events", r#"{"bucket":"b","name":"other/photo.jpg"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["data"]["stage"], "validate");
        assert_eq!(body["data"]["retryable"], false);
    }

    #[tokio::test]
    async fn test_missing_source_is_bad_gateway() {
        let dir = tempfile::tempdir().unwrap();
        let response = test_app(dir.path(), false)
            .await
            .oneshot(event_request("/events", r#"{"container":"b","key":"uploads/gone.png"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(json_body(response).await["data"]["stage"], "download");
    }
}
