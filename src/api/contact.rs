//! Contact form endpoints
//!
//! - GET /api/v1/contact/captcha - Issue an addition captcha
//! - POST /api/v1/contact?lang= - Submit the form; errors come back per field

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::api::common::LanguageQuery;
use crate::api::middleware::{ApiError, AppState};
use crate::services::{Captcha, ContactForm};

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub id: i64,
    pub message: &'static str,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(submit))
        .route("/captcha", get(new_captcha))
}

/// GET /api/v1/contact/captcha
async fn new_captcha(State(state): State<AppState>) -> Result<Json<Captcha>, ApiError> {
    Ok(Json(state.contact_service.new_captcha().await?))
}

/// POST /api/v1/contact
async fn submit(
    State(state): State<AppState>,
    Query(query): Query<LanguageQuery>,
    Json(form): Json<ContactForm>,
) -> Result<impl IntoResponse, ApiError> {
    let message = state
        .contact_service
        .submit(form, query.language())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            id: message.id,
            message: "Thank you for your message. I will get back to you soon.",
        }),
    ))
}
