//! Backup API endpoints (admin only)
//!
//! - GET/POST /api/v1/admin/backups - History / create a backup now
//! - POST /api/v1/admin/backups/upload - Multipart upload, file field `file`
//! - GET/PUT /api/v1/admin/backups/settings
//! - POST /api/v1/admin/backups/{id}/restore
//! - GET /api/v1/admin/backups/{id}/download
//! - DELETE /api/v1/admin/backups/{id}

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};

use crate::api::middleware::{ApiError, AppState};
use crate::models::{BackupRecord, BackupSettings};
use crate::services::RestoreSummary;

/// Multipart framing allowance on top of the archive size
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn router(max_upload_size: u64) -> Router<AppState> {
    let body_limit = usize::try_from(max_upload_size)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/", get(history).post(create))
        .route(
            "/upload",
            post(upload).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/settings", get(get_settings).put(update_settings))
        .route("/{id}/restore", post(restore))
        .route("/{id}/download", get(download))
        .route("/{id}", delete(delete_backup))
}

async fn history(State(state): State<AppState>) -> Result<Json<Vec<BackupRecord>>, ApiError> {
    Ok(Json(state.backup_service.history().await?))
}

async fn create(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let record = state.backup_service.create_backup().await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn restore(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RestoreSummary>, ApiError> {
    Ok(Json(state.backup_service.restore(&id).await?))
}

async fn download(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = state.backup_service.download(&id).await?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/gzip"));
    let disposition = format!("attachment; filename=\"{}.json.gz\"", id);
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .map_err(|e| ApiError::internal_error(e.to_string()))?,
    );

    Ok((headers, bytes))
}

async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation_error(format!("Failed to read multipart: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation_error(format!("Failed to read file: {}", e)))?;

        let record = state.backup_service.upload(&data).await?;
        return Ok((StatusCode::CREATED, Json(record)));
    }

    Err(ApiError::validation_error("No file field in upload"))
}

async fn delete_backup(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.backup_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_settings(State(state): State<AppState>) -> Result<Json<BackupSettings>, ApiError> {
    Ok(Json(state.backup_service.settings().await?))
}

async fn update_settings(
    State(state): State<AppState>,
    Json(settings): Json<BackupSettings>,
) -> Result<Json<BackupSettings>, ApiError> {
    Ok(Json(state.backup_service.update_settings(settings).await?))
}
