//! Public site information API
//!
//! No authentication required. Settings, preferences and translations stay
//! reachable during maintenance so the frontend can render the notice.

use axum::{
    extract::{Query, State},
    middleware as axum_middleware,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::common::LanguageQuery;
use crate::api::middleware::{self, ApiError, AppState};
use crate::models::{CvSettings, Preferences, ProfileData, SiteSettings};
use crate::services::settings::translations;

/// Preferences with the derived text direction
#[derive(Debug, Serialize)]
pub struct PreferencesResponse {
    #[serde(flatten)]
    pub preferences: Preferences,
    pub direction: &'static str,
}

/// CV page data
#[derive(Debug, Serialize)]
pub struct CvResponse {
    pub settings: CvSettings,
    pub profile: ProfileData,
}

#[derive(Debug, Deserialize)]
pub struct PageViewRequest {
    pub page: String,
}

#[derive(Debug, Serialize)]
pub struct PageViewResponse {
    pub page: String,
    pub views: u64,
}

/// Build the site router. Profile, CV and page views are guarded by
/// maintenance mode; the rest is always served.
pub fn router(state: AppState) -> Router<AppState> {
    let content = Router::new()
        .route("/profile", get(get_profile))
        .route("/cv", get(get_cv))
        .route("/page-views", post(record_page_view))
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::maintenance_guard,
        ));

    Router::new()
        .route("/settings", get(get_site_settings))
        .route("/preferences", get(get_preferences))
        .route("/translations", get(get_translations))
        .merge(content)
}

/// GET /api/v1/site/settings
async fn get_site_settings(State(state): State<AppState>) -> Result<Json<SiteSettings>, ApiError> {
    Ok(Json(state.settings_service.site_settings().await?))
}

/// GET /api/v1/site/preferences
async fn get_preferences(
    State(state): State<AppState>,
) -> Result<Json<PreferencesResponse>, ApiError> {
    let preferences = state.settings_service.preferences().await?;
    Ok(Json(PreferencesResponse {
        direction: preferences.direction(),
        preferences,
    }))
}

/// GET /api/v1/site/translations?lang=ar
async fn get_translations(Query(query): Query<LanguageQuery>) -> Json<Value> {
    Json(translations(query.language()).clone())
}

/// GET /api/v1/site/profile
async fn get_profile(State(state): State<AppState>) -> Result<Json<ProfileData>, ApiError> {
    Ok(Json(state.settings_service.profile().await?))
}

/// GET /api/v1/site/cv
async fn get_cv(State(state): State<AppState>) -> Result<Json<CvResponse>, ApiError> {
    Ok(Json(CvResponse {
        settings: state.settings_service.cv_settings().await?,
        profile: state.settings_service.profile().await?,
    }))
}

/// POST /api/v1/site/page-views
async fn record_page_view(
    State(state): State<AppState>,
    Json(body): Json<PageViewRequest>,
) -> Result<Json<PageViewResponse>, ApiError> {
    let views = state.analytics_service.record_page_view(&body.page).await?;
    Ok(Json(PageViewResponse {
        page: body.page.trim().to_string(),
        views,
    }))
}
