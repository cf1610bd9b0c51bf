//! Rate limiting for the login endpoint
//!
//! Two sliding windows guard the admin login:
//! - failed attempts per email (default 5 per 15 minutes)
//! - requests per client IP (default 10 per minute)

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::hash::Hash;
use std::net::IpAddr;
use tokio::sync::RwLock;

use crate::config::AuthConfig;

/// Counts events per key inside a trailing time window
pub struct SlidingWindow<K> {
    limit: usize,
    window: Duration,
    events: RwLock<HashMap<K, Vec<DateTime<Utc>>>>,
}

impl<K: Eq + Hash> SlidingWindow<K> {
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window,
            events: RwLock::new(HashMap::new()),
        }
    }

    /// Whether `key` has reached the limit within the window
    pub async fn is_limited(&self, key: &K) -> bool {
        let cutoff = Utc::now() - self.window;
        let events = self.events.read().await;
        events
            .get(key)
            .map(|times| times.iter().filter(|t| **t > cutoff).count() >= self.limit)
            .unwrap_or(false)
    }

    pub async fn record(&self, key: K) {
        let mut events = self.events.write().await;
        events.entry(key).or_default().push(Utc::now());
    }

    pub async fn clear(&self, key: &K) {
        self.events.write().await.remove(key);
    }

    /// Drop expired timestamps and empty keys
    pub async fn cleanup(&self) -> usize {
        let cutoff = Utc::now() - self.window;
        let mut events = self.events.write().await;
        events.retain(|_, times| {
            times.retain(|t| *t > cutoff);
            !times.is_empty()
        });
        events.len()
    }
}

/// Login rate limiter
pub struct LoginRateLimiter {
    failures: SlidingWindow<String>,
    requests: SlidingWindow<IpAddr>,
}

impl LoginRateLimiter {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            failures: SlidingWindow::new(
                config.max_failed_logins,
                Duration::minutes(config.lockout_minutes),
            ),
            requests: SlidingWindow::new(config.max_ip_requests_per_minute, Duration::minutes(1)),
        }
    }

    /// Check if the email is locked out after repeated failures
    pub async fn is_email_limited(&self, email: &str) -> bool {
        self.failures.is_limited(&email.to_lowercase()).await
    }

    pub async fn record_failed_attempt(&self, email: &str) {
        self.failures.record(email.to_lowercase()).await;
    }

    /// Clear failures after a successful login
    pub async fn clear_email(&self, email: &str) {
        self.failures.clear(&email.to_lowercase()).await;
    }

    /// Record a request from `ip` and report whether it is over the limit
    pub async fn check_ip(&self, ip: IpAddr) -> bool {
        if self.requests.is_limited(&ip).await {
            return true;
        }
        self.requests.record(ip).await;
        false
    }

    /// Clean up old entries (called periodically from a background task)
    pub async fn cleanup(&self) {
        let emails = self.failures.cleanup().await;
        let ips = self.requests.cleanup().await;
        tracing::debug!("Rate limiter cleanup: {} emails, {} IPs tracked", emails, ips);
    }
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new(&AuthConfig::default())
    }
}
