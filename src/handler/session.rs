use axum::{
    Json, Router,
    extract::{Multipart, Path, Query},
    http::header,
    response::IntoResponse,
    routing::{delete, get, post},
};
use jpeg_bus::frame::InputImage;
use serde::{Deserialize, Serialize};

use crate::{
    batch::types::{ArchiveError, BatchError, BatchOutcome, BatchState, SessionConfig},
    config,
    handler::{ApiError, ApiJsonResult, ApiResult},
    manager,
};

pub fn session_router() -> Router {
    Router::new()
        .route("/", post(create_session))
        .route("/list", get(list_sessions))
        .route("/{id}/batch", post(submit_batch))
        .route("/{id}/status", get(session_status))
        .route("/{id}/archive", get(download_archive))
        .route("/{id}", delete(remove_session))
}

#[derive(Serialize, Deserialize, Default)]
struct SessionRequest {
    quality: Option<u8>,
    max_dimension: Option<u32>,
}

#[derive(Serialize)]
struct SessionResponse {
    id: String,
}

#[derive(Serialize)]
struct StatusResponse {
    id: String,
    state: BatchState,
    archived: usize,
}

async fn create_session(Query(req): Query<SessionRequest>) -> ApiJsonResult<SessionResponse> {
    let defaults = config::config();
    let session_config = SessionConfig {
        quality: req.quality.unwrap_or(defaults.jpeg_quality()),
        max_dimension: req.max_dimension.or(Some(defaults.max_dimension())),
    };
    let id = manager::create_session(session_config).await;
    log::info!("session {} created", id);
    Ok(Json(SessionResponse { id }))
}

async fn list_sessions() -> Json<Vec<String>> {
    let sessions = manager::get_session_manager().read().await;
    Json(sessions.keys().cloned().collect())
}

/// Accepts one ordered multipart upload as a batch. Fields arrive in
/// submission order, which is the order the controller encodes them in.
async fn submit_batch(
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> ApiJsonResult<BatchOutcome> {
    let session = manager::get_session(&id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("session {} not found", id)))?;

    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("malformed upload: {}", e)))?
    {
        let name = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("file-{}", files.len() + 1));
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("malformed upload: {}", e)))?;
        files.push(InputImage::new(name, data));
    }

    match session.process_batch(files).await {
        Ok(outcome) => Ok(Json(outcome)),
        Err(BatchError::EmptyBatch) => Err(ApiError::BadRequest("empty batch".to_string())),
        Err(e) => Err(ApiError::Internal(e.into())),
    }
}

async fn session_status(Path(id): Path<String>) -> ApiJsonResult<StatusResponse> {
    let session = manager::get_session(&id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("session {} not found", id)))?;

    Ok(Json(StatusResponse {
        id: session.id().to_string(),
        state: session.state(),
        archived: session.archived().await,
    }))
}

async fn download_archive(Path(id): Path<String>) -> ApiResult<impl IntoResponse> {
    let session = manager::get_session(&id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("session {} not found", id)))?;

    match session.finalize().await {
        Ok(data) => {
            let headers = [
                (header::CONTENT_TYPE, "application/zip".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!(
                        "attachment; filename=\"{}\"",
                        config::config().archive_name()
                    ),
                ),
            ];
            Ok((headers, data))
        }
        Err(ArchiveError::Empty) => Err(ApiError::Conflict("nothing to save".to_string())),
        Err(e) => Err(ApiError::Internal(e.into())),
    }
}

async fn remove_session(Path(id): Path<String>) -> ApiJsonResult<String> {
    manager::remove_session(&id).await?;
    log::info!("session {} removed", id);
    Ok(Json(format!("session {} removed", id)))
}
