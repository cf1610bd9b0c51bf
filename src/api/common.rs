//! Common API utilities and shared types
//!
//! Query types shared by several endpoints and the mapping from service
//! errors to `ApiError`.

use axum::http::HeaderMap;
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};

use crate::api::middleware::ApiError;
use crate::models::Language;
use crate::services::editor::EditorError;
use crate::services::{
    AnalyticsError, AuthServiceError, BackupError, BlogServiceError, CollectionError,
    ContactError, SettingsServiceError,
};

// ============================================================================
// Query Types
// ============================================================================

/// `?search=` filter for list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: Option<String>,
}

impl SearchQuery {
    pub fn term(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// `?lang=` selector; unknown values fall back to English
#[derive(Debug, Default, Deserialize)]
pub struct LanguageQuery {
    #[serde(default)]
    pub lang: Option<String>,
}

impl LanguageQuery {
    pub fn language(&self) -> Language {
        self.lang
            .as_deref()
            .and_then(|l| l.parse().ok())
            .unwrap_or_default()
    }
}

/// Client address: `X-Forwarded-For`, then `X-Real-IP`, then the peer address
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<IpAddr> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|ip| ip.trim().parse().ok());
    if forwarded.is_some() {
        return forwarded;
    }

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .and_then(|ip| ip.trim().parse().ok());

    real_ip.or_else(|| peer.map(|addr| addr.ip()))
}

// ============================================================================
// Error Mapping
// ============================================================================

fn internal(err: impl std::fmt::Display) -> ApiError {
    tracing::error!("Request failed: {}", err);
    ApiError::internal_error(err.to_string())
}

impl From<AuthServiceError> for ApiError {
    fn from(err: AuthServiceError) -> Self {
        match err {
            AuthServiceError::AuthenticationError(msg) => ApiError::unauthorized(msg),
            AuthServiceError::InvalidCode => {
                let mut fields = crate::models::FieldErrors::new();
                fields.add("code", "Enter the 6-digit code");
                ApiError::invalid_fields(&fields)
            }
            AuthServiceError::ChallengeExpired => ApiError::unauthorized(err.to_string()),
            AuthServiceError::RateLimited(msg) => ApiError::rate_limited(msg),
            other => internal(other),
        }
    }
}

impl From<CollectionError> for ApiError {
    fn from(err: CollectionError) -> Self {
        match err {
            CollectionError::NotFound { .. } => ApiError::not_found(err.to_string()),
            CollectionError::Validation(fields) => ApiError::invalid_fields(&fields),
            CollectionError::Store(e) => internal(e),
        }
    }
}

impl From<BlogServiceError> for ApiError {
    fn from(err: BlogServiceError) -> Self {
        match err {
            BlogServiceError::NotFound(_) => ApiError::not_found(err.to_string()),
            BlogServiceError::Validation(fields) => ApiError::invalid_fields(&fields),
            other => internal(other),
        }
    }
}

impl From<ContactError> for ApiError {
    fn from(err: ContactError) -> Self {
        match err {
            ContactError::Validation(fields) => ApiError::invalid_fields(&fields),
            ContactError::Collection(e) => e.into(),
            other => internal(other),
        }
    }
}

impl From<SettingsServiceError> for ApiError {
    fn from(err: SettingsServiceError) -> Self {
        match err {
            SettingsServiceError::Validation(fields) => ApiError::invalid_fields(&fields),
            SettingsServiceError::InvalidValue(msg) => ApiError::validation_error(msg),
            SettingsServiceError::Store(e) => internal(e),
        }
    }
}

impl From<BackupError> for ApiError {
    fn from(err: BackupError) -> Self {
        match err {
            BackupError::NotFound(_) => ApiError::not_found(err.to_string()),
            BackupError::InvalidBackup(_) => ApiError::validation_error(err.to_string()),
            BackupError::TooLarge { .. } => ApiError::new("PAYLOAD_TOO_LARGE", err.to_string()),
            BackupError::Validation(fields) => ApiError::invalid_fields(&fields),
            other => internal(other),
        }
    }
}

impl From<AnalyticsError> for ApiError {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::Validation(fields) => ApiError::invalid_fields(&fields),
            AnalyticsError::Blog(e) => e.into(),
            AnalyticsError::Collection(e) => e.into(),
            AnalyticsError::Store(e) => internal(e),
        }
    }
}

impl From<EditorError> for ApiError {
    fn from(err: EditorError) -> Self {
        ApiError::validation_error(err.to_string())
    }
}
