//! Content collection endpoints
//!
//! Every collection exposes the same routes, built from generic handlers:
//! - GET /api/v1/{collection}[/{id}] - Public records only
//! - GET/POST /api/v1/admin/{collection}, GET/PUT/DELETE /api/v1/admin/{collection}/{id}
//!
//! Plus two specials: resource downloads and the message inbox.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use crate::api::common::SearchQuery;
use crate::api::middleware::{ApiError, AppState};
use crate::models::{
    Achievement, Application, LiteratureItem, Message, PortfolioItem, PressMention, Record,
    Resource, Training,
};
use crate::services::{CollectionService, Collections};

/// A record type served by the generic collection handlers
pub trait Collected: Record {
    fn service(collections: &Collections) -> &Arc<CollectionService<Self>>;
}

macro_rules! collected {
    ($($ty:ty => $field:ident),* $(,)?) => {
        $(
            impl Collected for $ty {
                fn service(collections: &Collections) -> &Arc<CollectionService<Self>> {
                    &collections.$field
                }
            }
        )*
    };
}

collected! {
    PortfolioItem => portfolio,
    Application => applications,
    Training => trainings,
    Achievement => achievements,
    LiteratureItem => literature,
    PressMention => press,
    Resource => resources,
    Message => messages,
}

/// Public read-only routes for one collection
pub fn public_router<T: Collected>() -> Router<AppState> {
    Router::new()
        .route("/", get(list_public::<T>))
        .route("/{id}", get(get_public::<T>))
}

/// Admin CRUD routes for one collection
pub fn admin_router<T: Collected>() -> Router<AppState> {
    Router::new()
        .route("/", get(list::<T>).post(create::<T>))
        .route("/{id}", get(get_one::<T>).put(update::<T>).delete(delete::<T>))
}

/// Public routes of every collection, keyed by URL segment
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .nest("/portfolio", public_router::<PortfolioItem>())
        .nest("/applications", public_router::<Application>())
        .nest("/training", public_router::<Training>())
        .nest("/achievements", public_router::<Achievement>())
        .nest("/press", public_router::<PressMention>())
        .nest("/literature", public_router::<LiteratureItem>())
        .nest(
            "/resources",
            public_router::<Resource>().route("/{id}/download", post(download_resource)),
        )
}

/// Admin routes of every collection, including the message inbox
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .nest("/portfolio", admin_router::<PortfolioItem>())
        .nest("/applications", admin_router::<Application>())
        .nest("/training", admin_router::<Training>())
        .nest("/achievements", admin_router::<Achievement>())
        .nest("/press", admin_router::<PressMention>())
        .nest("/literature", admin_router::<LiteratureItem>())
        .nest("/resources", admin_router::<Resource>())
        .nest("/messages", messages_router())
}

fn messages_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::<Message>))
        .route("/{id}", get(get_one::<Message>).delete(delete::<Message>))
        .route("/{id}/read", post(mark_message_read))
}

// ============================================================================
// Generic handlers
// ============================================================================

async fn list_public<T: Collected>(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<T>>, ApiError> {
    Ok(Json(T::service(&state.collections).list_public(query.term()).await?))
}

async fn get_public<T: Collected>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<T>, ApiError> {
    let record = T::service(&state.collections).get(id).await?;
    if !record.is_public() {
        return Err(ApiError::not_found(format!("{} not found: {}", T::LABEL, id)));
    }
    Ok(Json(record))
}

async fn list<T: Collected>(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<T>>, ApiError> {
    Ok(Json(T::service(&state.collections).list(query.term()).await?))
}

async fn get_one<T: Collected>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<T>, ApiError> {
    Ok(Json(T::service(&state.collections).get(id).await?))
}

async fn create<T: Collected>(
    State(state): State<AppState>,
    Json(record): Json<T>,
) -> Result<impl IntoResponse, ApiError> {
    let record = T::service(&state.collections).create(record).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update<T: Collected>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(record): Json<T>,
) -> Result<Json<T>, ApiError> {
    Ok(Json(T::service(&state.collections).update(id, record).await?))
}

async fn delete<T: Collected>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    T::service(&state.collections).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Specials
// ============================================================================

async fn download_resource(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Resource>, ApiError> {
    let resource = state.collections.resources.get(id).await?;
    if !resource.is_public() {
        return Err(ApiError::not_found(format!("{} not found: {}", Resource::LABEL, id)));
    }
    Ok(Json(state.collections.resources.record_download(id).await?))
}

async fn mark_message_read(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Message>, ApiError> {
    Ok(Json(state.collections.messages.mark_read(id).await?))
}
