//! Admin API endpoints
//!
//! - GET /api/v1/admin/dashboard - Counts and visitor stats
//! - GET /api/v1/admin/analytics - Visitor stats and server request stats
//! - GET/PUT /api/v1/admin/settings/{site,profile,preferences,cv,contact,security}
//! - POST /api/v1/admin/settings/cv/sections/{section}/toggle

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{
    ContactSettings, CvSettings, Language, Preferences, ProfileData, SiteSettings, Theme, User,
    VisitorStats,
};
use crate::services::DashboardSummary;

/// Server-side request counters
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStats {
    pub total_requests: u64,
    pub avg_response_time_ms: f64,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub visitors: VisitorStats,
    pub server: ServerStats,
}

#[derive(Debug, Deserialize)]
pub struct PreferencesRequest {
    #[serde(default)]
    pub language: Option<Language>,
    #[serde(default)]
    pub theme: Option<Theme>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecuritySettings {
    pub two_factor: bool,
}

/// Build the admin router (dashboard, analytics, settings)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/analytics", get(analytics))
        .route("/settings/site", get(get_site_settings).put(update_site_settings))
        .route("/settings/profile", get(get_profile).put(update_profile))
        .route(
            "/settings/preferences",
            get(get_preferences).put(update_preferences),
        )
        .route("/settings/cv", get(get_cv_settings).put(update_cv_settings))
        .route("/settings/cv/sections/{section}/toggle", post(toggle_cv_section))
        .route(
            "/settings/contact",
            get(get_contact_settings).put(update_contact_settings),
        )
        .route("/settings/security", get(get_security).put(update_security))
}

/// GET /api/v1/admin/dashboard
async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardSummary>, ApiError> {
    let summary = state
        .analytics_service
        .dashboard(&state.blog_service, &state.collections)
        .await?;
    Ok(Json(summary))
}

/// GET /api/v1/admin/analytics
async fn analytics(State(state): State<AppState>) -> Result<Json<AnalyticsResponse>, ApiError> {
    let stats = &state.request_stats;
    Ok(Json(AnalyticsResponse {
        visitors: state.analytics_service.stats().await?,
        server: ServerStats {
            total_requests: stats.total_requests(),
            avg_response_time_ms: stats.avg_response_time_us() / 1000.0,
            uptime_seconds: stats.uptime_seconds(),
        },
    }))
}

// ============================================================================
// Settings
// ============================================================================

async fn get_site_settings(State(state): State<AppState>) -> Result<Json<SiteSettings>, ApiError> {
    Ok(Json(state.settings_service.site_settings().await?))
}

async fn update_site_settings(
    State(state): State<AppState>,
    Json(patch): Json<Value>,
) -> Result<Json<SiteSettings>, ApiError> {
    Ok(Json(state.settings_service.update_site_settings(&patch).await?))
}

async fn get_profile(State(state): State<AppState>) -> Result<Json<ProfileData>, ApiError> {
    Ok(Json(state.settings_service.profile().await?))
}

async fn update_profile(
    State(state): State<AppState>,
    Json(patch): Json<Value>,
) -> Result<Json<ProfileData>, ApiError> {
    Ok(Json(state.settings_service.update_profile(&patch).await?))
}

async fn get_preferences(State(state): State<AppState>) -> Result<Json<Preferences>, ApiError> {
    Ok(Json(state.settings_service.preferences().await?))
}

async fn update_preferences(
    State(state): State<AppState>,
    Json(body): Json<PreferencesRequest>,
) -> Result<Json<Preferences>, ApiError> {
    let preferences = state
        .settings_service
        .update_preferences(body.language, body.theme)
        .await?;
    Ok(Json(preferences))
}

async fn get_cv_settings(State(state): State<AppState>) -> Result<Json<CvSettings>, ApiError> {
    Ok(Json(state.settings_service.cv_settings().await?))
}

async fn update_cv_settings(
    State(state): State<AppState>,
    Json(patch): Json<Value>,
) -> Result<Json<CvSettings>, ApiError> {
    Ok(Json(state.settings_service.update_cv_settings(&patch).await?))
}

async fn toggle_cv_section(
    State(state): State<AppState>,
    Path(section): Path<String>,
) -> Result<Json<CvSettings>, ApiError> {
    Ok(Json(state.settings_service.toggle_cv_section(&section).await?))
}

async fn get_contact_settings(
    State(state): State<AppState>,
) -> Result<Json<ContactSettings>, ApiError> {
    Ok(Json(state.settings_service.contact_settings().await?))
}

async fn update_contact_settings(
    State(state): State<AppState>,
    Json(settings): Json<ContactSettings>,
) -> Result<Json<ContactSettings>, ApiError> {
    Ok(Json(state.settings_service.update_contact_settings(settings).await?))
}

async fn get_security(AuthenticatedUser(user): AuthenticatedUser) -> Json<SecuritySettings> {
    Json(SecuritySettings {
        two_factor: user.has_two_factor,
    })
}

/// PUT /api/v1/admin/settings/security - Enable or disable two-factor login
async fn update_security(
    State(state): State<AppState>,
    Json(body): Json<SecuritySettings>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.auth_service.set_two_factor(body.two_factor).await?))
}
