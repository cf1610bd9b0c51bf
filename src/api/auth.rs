//! Authentication API endpoints
//!
//! - POST /api/v1/auth/login - Check credentials, start a session or a two-factor challenge
//! - POST /api/v1/auth/two-factor - Complete a pending login with a 6-digit code
//! - POST /api/v1/auth/logout - End the session
//! - GET /api/v1/auth/me - Current admin

use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::api::common::client_ip;
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser, SessionToken};
use crate::models::{FieldErrors, Session, User};
use crate::services::LoginOutcome;

/// Request body for login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Request body for the second factor
#[derive(Debug, Deserialize)]
pub struct TwoFactorRequest {
    pub challenge: String,
    #[serde(default)]
    pub code: String,
}

/// Response for a completed login
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
    pub expires_at: String,
}

/// Response when a second factor is needed
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TwoFactorRequiredResponse {
    pub two_factor_required: bool,
    pub challenge: String,
    pub expires_at: String,
}

/// Build public auth routes (no auth required)
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/two-factor", post(verify_two_factor))
}

/// Build protected auth routes (requires auth middleware)
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/logout", post(logout))
        .route("/me", get(get_current_user))
}

fn session_cookie(session: &Session) -> Result<HeaderValue, ApiError> {
    let max_age = (session.expires_at - session.created_at).num_seconds().max(0);
    let cookie = format!(
        "session={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        session.token, max_age
    );
    HeaderValue::from_str(&cookie).map_err(|e| ApiError::internal_error(e.to_string()))
}

fn authenticated(session: Session) -> Result<impl IntoResponse, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, session_cookie(&session)?);

    Ok((
        headers,
        Json(AuthResponse {
            expires_at: session.expires_at.to_rfc3339(),
            token: session.token,
            user: session.user,
        }),
    ))
}

/// POST /api/v1/auth/login
async fn login(
    State(state): State<AppState>,
    connect_info: Option<Extension<ConnectInfo<SocketAddr>>>,
    headers: HeaderMap,
    Json(body): Json<LoginRequest>,
) -> Result<axum::response::Response, ApiError> {
    let mut fields = FieldErrors::new();
    fields.require("email", &body.email, "Email is required");
    fields.require("password", &body.password, "Password is required");
    fields
        .into_result()
        .map_err(|fields| ApiError::invalid_fields(&fields))?;

    let ip = client_ip(&headers, connect_info.map(|Extension(ConnectInfo(addr))| addr));
    let outcome = state
        .auth_service
        .login(body.email.trim(), &body.password, ip)
        .await?;

    match outcome {
        LoginOutcome::Authenticated(session) => Ok(authenticated(session)?.into_response()),
        LoginOutcome::TwoFactorRequired(pending) => Ok((
            StatusCode::ACCEPTED,
            Json(TwoFactorRequiredResponse {
                two_factor_required: true,
                challenge: pending.challenge,
                expires_at: pending.expires_at.to_rfc3339(),
            }),
        )
            .into_response()),
    }
}

/// POST /api/v1/auth/two-factor
async fn verify_two_factor(
    State(state): State<AppState>,
    Json(body): Json<TwoFactorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .auth_service
        .verify_two_factor(&body.challenge, body.code.trim())
        .await?;
    authenticated(session)
}

/// POST /api/v1/auth/logout
async fn logout(
    State(state): State<AppState>,
    SessionToken(token): SessionToken,
) -> Result<impl IntoResponse, ApiError> {
    state.auth_service.logout(&token).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_static("session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"),
    );
    Ok((StatusCode::NO_CONTENT, headers))
}

/// GET /api/v1/auth/me
async fn get_current_user(AuthenticatedUser(user): AuthenticatedUser) -> Json<User> {
    Json(user)
}
