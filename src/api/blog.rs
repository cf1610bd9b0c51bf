//! Blog API endpoints
//!
//! Public:
//! - GET /api/v1/blog - Published posts, optional `?search=`
//! - GET /api/v1/blog/{id_or_slug} - One published post with rendered HTML
//!
//! Admin:
//! - GET/POST /api/v1/admin/blog - List (search, status) / create
//! - GET/PUT/DELETE /api/v1/admin/blog/{id}
//! - POST /api/v1/admin/blog/{id}/featured - Toggle the featured flag
//! - GET/PUT/DELETE /api/v1/admin/blog/drafts/{key} - Autosaved drafts (`new` or a post id)
//! - POST /api/v1/admin/blog/summary - Simulated AI summary
//! - POST /api/v1/admin/blog/preview - Markdown preview
//! - POST /api/v1/admin/blog/editor - Toolbar actions

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::common::SearchQuery;
use crate::api::middleware::{ApiError, AppState};
use crate::models::{BlogPost, PostStatus};
use crate::services::blog::PublicPost;
use crate::services::editor::{self, EditResult, MediaKind, Selection};
use crate::services::{DraftKey, MarkdownRenderer};

/// Public blog routes
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_public))
        .route("/{id_or_slug}", get(read_public))
}

/// Admin blog routes
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/summary", post(generate_summary))
        .route("/preview", post(preview))
        .route("/editor", post(apply_editor_action))
        .route(
            "/drafts/{key}",
            get(get_draft).put(save_draft).delete(discard_draft),
        )
        .route("/{id}", get(get_post).put(update).delete(delete))
        .route("/{id}/featured", post(toggle_featured))
}

// ============================================================================
// Public
// ============================================================================

async fn list_public(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<BlogPost>>, ApiError> {
    Ok(Json(state.blog_service.list_public(query.term()).await?))
}

async fn read_public(
    State(state): State<AppState>,
    Path(id_or_slug): Path<String>,
) -> Result<Json<PublicPost>, ApiError> {
    Ok(Json(state.blog_service.read_public(&id_or_slug).await?))
}

// ============================================================================
// Admin CRUD
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct AdminListQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<PostStatus>,
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<AdminListQuery>,
) -> Result<Json<Vec<BlogPost>>, ApiError> {
    let search = query.search.as_deref().filter(|s| !s.trim().is_empty());
    Ok(Json(state.blog_service.list(search, query.status).await?))
}

async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<BlogPost>, ApiError> {
    Ok(Json(state.blog_service.get(id).await?))
}

async fn create(
    State(state): State<AppState>,
    Json(post): Json<BlogPost>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.blog_service.create(post).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(post): Json<BlogPost>,
) -> Result<Json<BlogPost>, ApiError> {
    Ok(Json(state.blog_service.update(id, post).await?))
}

async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.blog_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn toggle_featured(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<BlogPost>, ApiError> {
    Ok(Json(state.blog_service.toggle_featured(id).await?))
}

// ============================================================================
// Drafts
// ============================================================================

fn draft_key(raw: &str) -> Result<DraftKey, ApiError> {
    DraftKey::parse(raw)
        .ok_or_else(|| ApiError::validation_error("Draft key must be 'new' or a post id"))
}

async fn get_draft(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<BlogPost>, ApiError> {
    state
        .blog_service
        .get_draft(draft_key(&key)?)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("No saved draft"))
}

async fn save_draft(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(post): Json<BlogPost>,
) -> Result<Json<BlogPost>, ApiError> {
    Ok(Json(state.blog_service.save_draft(draft_key(&key)?, post).await?))
}

async fn discard_draft(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.blog_service.discard_draft(draft_key(&key)?).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("No saved draft"))
    }
}

// ============================================================================
// Writing aids
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

async fn generate_summary(
    State(state): State<AppState>,
    Json(body): Json<SummaryRequest>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let summary = state
        .blog_service
        .generate_summary(&body.title, &body.category, &body.content)
        .await?;
    Ok(Json(SummaryResponse { summary }))
}

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub html: String,
    pub word_count: usize,
    pub reading_minutes: usize,
}

async fn preview(Json(body): Json<PreviewRequest>) -> Json<PreviewResponse> {
    let renderer = MarkdownRenderer::new();
    Json(PreviewResponse {
        html: renderer.render(&body.content),
        word_count: renderer.word_count(&body.content),
        reading_minutes: renderer.reading_minutes(&body.content),
    })
}

/// One toolbar button press
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EditorAction {
    Format { before: String, after: String },
    List { prefix: String },
    Link { url: String },
    Media {
        kind: MediaKind,
        url: String,
        #[serde(default)]
        alt: Option<String>,
    },
    Youtube { url: String },
}

#[derive(Debug, Deserialize)]
pub struct EditorRequest {
    pub content: String,
    #[serde(default)]
    pub selection: Selection,
    pub action: EditorAction,
}

async fn apply_editor_action(Json(body): Json<EditorRequest>) -> Result<Json<EditResult>, ApiError> {
    let content = body.content.as_str();
    let selection = body.selection;

    let result = match &body.action {
        EditorAction::Format { before, after } => {
            editor::insert_format(content, selection, before, after)
        }
        EditorAction::List { prefix } => editor::insert_list(content, selection, prefix),
        EditorAction::Link { url } => editor::insert_link(content, selection, url)?,
        EditorAction::Media { kind, url, alt } => {
            editor::insert_media(content, selection, *kind, url, alt.as_deref())?
        }
        EditorAction::Youtube { url } => editor::insert_youtube(content, selection, url)?,
    };

    Ok(Json(result))
}
