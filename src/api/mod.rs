//! API layer - HTTP handlers and routing
//!
//! All endpoints live under `/api/v1`:
//! - Site settings, profile, CV and translations
//! - Blog posts, content collections and the contact form
//! - Login with the simulated second factor
//! - The admin area: dashboard, content management, settings and backups

pub mod admin;
pub mod auth;
pub mod backup;
pub mod blog;
pub mod collections;
pub mod common;
pub mod contact;
pub mod middleware;
pub mod site;


use axum::{
    extract::State,
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::cache::create_cache;
use crate::config::Config;
use crate::db::repositories::SqlxStorageRepository;
use crate::db::DynDatabasePool;
use crate::services::{
    AnalyticsService, AuthService, BackupService, BlogService, Collections, ContactService,
    SettingsService, Store,
};

pub use middleware::{ApiError, AppState, AuthenticatedUser, RequestStats};

/// Wire every service over one store
pub fn build_state(config: &Config, pool: DynDatabasePool) -> anyhow::Result<AppState> {
    let latency = config.mock.latency();
    let store = Arc::new(Store::new(Arc::new(SqlxStorageRepository::new(pool.clone()))));
    let cache = create_cache(&config.cache);

    let collections = Arc::new(Collections::new(store.clone()));
    let auth_service = Arc::new(AuthService::new(store.clone(), config.auth.clone(), latency)?);
    let blog_service = Arc::new(BlogService::new(store.clone(), cache.clone(), latency));
    let contact_service = Arc::new(ContactService::new(
        cache,
        collections.messages.clone(),
        &config.contact,
        latency,
    ));

    Ok(AppState {
        pool,
        store: store.clone(),
        auth_service,
        blog_service,
        collections,
        contact_service,
        settings_service: Arc::new(SettingsService::new(store.clone())),
        backup_service: Arc::new(BackupService::new(store.clone(), &config.backup, latency)),
        analytics_service: Arc::new(AnalyticsService::new(store)),
        request_stats: Arc::new(RequestStats::new()),
    })
}

/// Build the main API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Admin routes (need a live admin session)
    let admin_routes = Router::new()
        .nest("/auth", auth::protected_router())
        .nest(
            "/admin",
            admin::router()
                .nest("/blog", blog::admin_router())
                .nest(
                    "/backups",
                    backup::router(state.backup_service.max_upload_size()),
                )
                .merge(collections::admin_routes()),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Public content, closed while the site is in maintenance
    let content_routes = Router::new()
        .nest("/blog", blog::public_router())
        .nest("/contact", contact::router())
        .merge(collections::public_routes())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::maintenance_guard,
        ));

    Router::new()
        .nest("/auth", auth::public_router())
        .nest("/site", site::router(state))
        .merge(content_routes)
        .merge(admin_routes)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
    version: &'static str,
}

/// GET /health
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.pool.ping().await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::warn!("Health check: database unreachable: {}", e);
            "unavailable"
        }
    };
    Json(HealthResponse {
        status: "ok",
        database,
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    // Cookie sessions need credentials, so the origin must be explicit
    let origin = cors_origin.parse::<HeaderValue>().unwrap_or_else(|_| {
        tracing::warn!("Invalid CORS origin '{}', using http://localhost:3000", cors_origin);
        HeaderValue::from_static("http://localhost:3000")
    });
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", build_api_router(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors),
        )
        // Request stats middleware (outermost layer, runs for all requests)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::request_stats_middleware,
        ))
        .with_state(state)
}
