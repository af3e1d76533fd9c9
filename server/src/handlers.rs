use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

use renditioner_core::{InboundEvent, ProcessingError, Processor};

#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<Processor>,
    /// Used when a request does not say whether to delete the source
    pub delete_source: bool,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct ProcessResult {
    container: String,
    key: String,
    renditions: Vec<String>,
    source_deleted: bool,
}

#[derive(Debug, Serialize)]
struct ProcessFailure {
    stage: &'static str,
    retryable: bool,
    rendition: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProcessParams {
    delete: Option<bool>,
}

/// POST /events
///
/// Process one uploaded object.
///
/// Body: `{"bucket": "...", "name": "uploads/x.jpg"}` (or `container`/`key`)
/// Query: `delete` (optional) - remove the source after all renditions are stored
pub async fn process_event(
    State(state): State<AppState>,
    Query(params): Query<ProcessParams>,
    Json(event): Json<InboundEvent>,
) -> Response {
    let delete_source = params.delete.unwrap_or(state.delete_source);

    match state.processor.process(&event, delete_source).await {
        Ok(()) => {
            let renditions = state
                .processor
                .plan(&event)
                .into_iter()
                .map(|t| t.output_path)
                .collect();
            let response = ApiResponse {
                success: true,
                data: Some(ProcessResult {
                    container: event.container,
                    key: event.key,
                    renditions,
                    source_deleted: delete_source,
                }),
                error: None,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            log::error!("Processing failed for {}/{}: {}", event.container, event.key, e);
            let response = ApiResponse {
                success: false,
                data: Some(ProcessFailure {
                    stage: e.stage(),
                    retryable: e.is_retryable(),
                    rendition: e.rendition_path().map(str::to_string),
                }),
                error: Some(e.to_string()),
            };
            (status_for(&e), Json(response)).into_response()
        }
    }
}

fn status_for(err: &ProcessingError) -> StatusCode {
    match err {
        ProcessingError::InvalidLocation { .. }
        | ProcessingError::UnsupportedFormat(_)
        | ProcessingError::Decode(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ProcessingError::Download { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
