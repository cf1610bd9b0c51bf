//! Admin authentication
//!
//! A single admin account whose credentials come from configuration. Login is
//! a linear flow: anonymous, then (when two-factor is on) pending second
//! factor, then authenticated. The second factor is simulated: any six ASCII
//! digits pass.
//!
//! State lives in the key-value store:
//! - `auth_user`: the admin snapshot, including the two-factor flag
//! - `auth_pending_2fa:<challenge>`: logins waiting for a code
//! - `auth_token:<token>`: live sessions

use anyhow::Context;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use std::net::IpAddr;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::models::{PendingTwoFactor, Session, User, UserRole};
use crate::services::rate_limiter::LoginRateLimiter;
use crate::services::store::{keys, Store, StoreError};

/// Error types for authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    /// Wrong credentials
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// The code is not six digits
    #[error("Invalid verification code")]
    InvalidCode,

    /// Unknown or expired two-factor challenge
    #[error("Verification session expired, please log in again")]
    ChallengeExpired,

    #[error("Too many login attempts: {0}")]
    RateLimited(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Result of a successful credential check
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    Authenticated(Session),
    TwoFactorRequired(PendingTwoFactor),
}

/// Whether `code` is exactly six ASCII digits
pub fn is_valid_code(code: &str) -> bool {
    code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit())
}

fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Authentication service for the admin area
pub struct AuthService {
    store: Arc<Store>,
    config: AuthConfig,
    password_hash: String,
    rate_limiter: Arc<LoginRateLimiter>,
    latency: std::time::Duration,
}

impl AuthService {
    /// Create the service, hashing the configured admin password.
    pub fn new(
        store: Arc<Store>,
        config: AuthConfig,
        latency: std::time::Duration,
    ) -> anyhow::Result<Self> {
        let password_hash =
            hash_password(&config.admin_password).context("Failed to hash admin password")?;
        let rate_limiter = Arc::new(LoginRateLimiter::new(&config));

        Ok(Self {
            store,
            config,
            password_hash,
            rate_limiter,
            latency,
        })
    }

    pub fn rate_limiter(&self) -> Arc<LoginRateLimiter> {
        self.rate_limiter.clone()
    }

    /// The admin account, created from configuration on first use
    pub async fn admin_user(&self) -> Result<User, AuthServiceError> {
        if let Some(user) = self.store.load::<User>(keys::AUTH_USER).await? {
            if user.email == self.config.admin_email {
                return Ok(user);
            }
        }

        let user = User {
            id: "1".to_string(),
            name: self.config.admin_name.clone(),
            email: self.config.admin_email.clone(),
            role: UserRole::Admin,
            has_two_factor: self.config.two_factor,
            last_login: None,
        };
        self.store.save(keys::AUTH_USER, &user).await?;
        Ok(user)
    }

    /// Check credentials and start a session or a two-factor challenge.
    ///
    /// Wrong credentials leave no trace in the store beyond the rate limiter.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        ip: Option<IpAddr>,
    ) -> Result<LoginOutcome, AuthServiceError> {
        if let Some(ip) = ip {
            if self.rate_limiter.check_ip(ip).await {
                return Err(AuthServiceError::RateLimited(
                    "Too many requests, try again in a minute".to_string(),
                ));
            }
        }
        if self.rate_limiter.is_email_limited(email).await {
            return Err(AuthServiceError::RateLimited(format!(
                "Account locked, try again in {} minutes",
                self.config.lockout_minutes
            )));
        }

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let email_matches = email == self.config.admin_email;
        let password_matches = verify_password(password, &self.password_hash)?;

        if !(email_matches && password_matches) {
            self.rate_limiter.record_failed_attempt(email).await;
            tracing::warn!("Failed admin login for '{}'", email);
            return Err(AuthServiceError::AuthenticationError(
                "Invalid email or password".to_string(),
            ));
        }
        self.rate_limiter.clear_email(email).await;

        let mut user = self.admin_user().await?;
        user.last_login = Some(Utc::now());
        self.store.save(keys::AUTH_USER, &user).await?;

        if user.has_two_factor {
            let challenge = Uuid::new_v4().to_string();
            let pending = PendingTwoFactor::new(
                challenge.clone(),
                user,
                Duration::minutes(self.config.pending_ttl_minutes),
            );
            self.store
                .save(&format!("{}{}", keys::AUTH_PENDING_PREFIX, challenge), &pending)
                .await?;
            tracing::info!("Admin login awaiting second factor");
            return Ok(LoginOutcome::TwoFactorRequired(pending));
        }

        let session = self.issue_session(user).await?;
        tracing::info!("Admin logged in");
        Ok(LoginOutcome::Authenticated(session))
    }

    /// Complete a pending login with a six-digit code.
    ///
    /// A malformed code keeps the challenge so the user can retry.
    pub async fn verify_two_factor(
        &self,
        challenge: &str,
        code: &str,
    ) -> Result<Session, AuthServiceError> {
        let key = format!("{}{}", keys::AUTH_PENDING_PREFIX, challenge);
        let pending = self
            .store
            .load::<PendingTwoFactor>(&key)
            .await?
            .ok_or(AuthServiceError::ChallengeExpired)?;

        if pending.is_expired() {
            self.store.remove(&key).await?;
            return Err(AuthServiceError::ChallengeExpired);
        }

        if !is_valid_code(code) {
            return Err(AuthServiceError::InvalidCode);
        }

        self.store.remove(&key).await?;
        let session = self.issue_session(pending.user).await?;
        tracing::info!("Admin completed two-factor verification");
        Ok(session)
    }

    async fn issue_session(&self, user: User) -> Result<Session, AuthServiceError> {
        let token = Uuid::new_v4().to_string();
        let session = Session::new(token, user, Duration::hours(self.config.session_ttl_hours));
        self.store
            .save(&session_key(&session.token), &session)
            .await?;
        Ok(session)
    }

    /// End a session. Unknown tokens are ignored.
    pub async fn logout(&self, token: &str) -> Result<(), AuthServiceError> {
        if self.store.remove(&session_key(token)).await? {
            tracing::info!("Admin logged out");
        }
        Ok(())
    }

    /// The current admin for a live session token
    pub async fn validate_session(&self, token: &str) -> Result<Option<User>, AuthServiceError> {
        let key = session_key(token);
        let Some(session) = self.store.load::<Session>(&key).await? else {
            return Ok(None);
        };

        if session.is_expired() {
            self.store.remove(&key).await?;
            return Ok(None);
        }

        Ok(Some(self.admin_user().await?))
    }

    /// Turn the second login step on or off
    pub async fn set_two_factor(&self, enabled: bool) -> Result<User, AuthServiceError> {
        let mut user = self.admin_user().await?;
        user.has_two_factor = enabled;
        self.store.save(keys::AUTH_USER, &user).await?;
        tracing::info!("Two-factor authentication {}", if enabled { "enabled" } else { "disabled" });
        Ok(user)
    }

    /// Remove expired sessions and challenges. Returns how many were removed.
    pub async fn purge_expired(&self) -> Result<usize, AuthServiceError> {
        let mut removed = 0;

        for key in self.store.keys_with_prefix(keys::AUTH_TOKEN_PREFIX).await? {
            match self.store.load::<Session>(&key).await? {
                Some(session) if !session.is_expired() => {}
                Some(_) => {
                    self.store.remove(&key).await?;
                    removed += 1;
                }
                None => removed += 1,
            }
        }

        for key in self.store.keys_with_prefix(keys::AUTH_PENDING_PREFIX).await? {
            match self.store.load::<PendingTwoFactor>(&key).await? {
                Some(pending) if !pending.is_expired() => {}
                Some(_) => {
                    self.store.remove(&key).await?;
                    removed += 1;
                }
                None => removed += 1,
            }
        }

        Ok(removed)
    }
}

fn session_key(token: &str) -> String {
    format!("{}{}", keys::AUTH_TOKEN_PREFIX, token)
}
