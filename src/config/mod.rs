//! Configuration management
//!
//! This module handles loading and parsing configuration for the Folio site.
//! Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Admin account and session configuration
    #[serde(default)]
    pub auth: AuthConfig,
    /// Contact form configuration
    #[serde(default)]
    pub contact: ContactConfig,
    /// Backup configuration
    #[serde(default)]
    pub backup: BackupConfig,
    /// Simulated behaviour of the demo site
    #[serde(default)]
    pub mock: MockConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin (for cookie-based auth)
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "http://localhost:5173".to_string()
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database path or URL
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/folio.db".to_string()
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached entries
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
    /// Cache TTL in seconds
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: default_max_capacity(),
            ttl_seconds: default_ttl(),
        }
    }
}

fn default_max_capacity() -> u64 {
    10_000
}

fn default_ttl() -> u64 {
    3600
}

/// Admin account configuration
///
/// The site has a single admin whose credentials come from configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_admin_email")]
    pub admin_email: String,
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
    #[serde(default = "default_admin_name")]
    pub admin_name: String,
    /// Whether the admin account starts with two-factor enabled
    #[serde(default = "default_two_factor")]
    pub two_factor: bool,
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,
    /// How long a pending second factor stays valid
    #[serde(default = "default_pending_ttl_minutes")]
    pub pending_ttl_minutes: i64,
    /// Failed logins per email before lockout
    #[serde(default = "default_max_failed_logins")]
    pub max_failed_logins: usize,
    #[serde(default = "default_lockout_minutes")]
    pub lockout_minutes: i64,
    /// Login requests per IP per minute
    #[serde(default = "default_max_ip_requests")]
    pub max_ip_requests_per_minute: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_email: default_admin_email(),
            admin_password: default_admin_password(),
            admin_name: default_admin_name(),
            two_factor: default_two_factor(),
            session_ttl_hours: default_session_ttl_hours(),
            pending_ttl_minutes: default_pending_ttl_minutes(),
            max_failed_logins: default_max_failed_logins(),
            lockout_minutes: default_lockout_minutes(),
            max_ip_requests_per_minute: default_max_ip_requests(),
        }
    }
}

fn default_admin_email() -> String {
    "admin@example.com".to_string()
}

fn default_admin_password() -> String {
    "password".to_string()
}

fn default_admin_name() -> String {
    "Ahmed Jamal".to_string()
}

fn default_two_factor() -> bool {
    true
}

fn default_session_ttl_hours() -> i64 {
    7 * 24
}

fn default_pending_ttl_minutes() -> i64 {
    10
}

fn default_max_failed_logins() -> usize {
    5
}

fn default_lockout_minutes() -> i64 {
    15
}

fn default_max_ip_requests() -> usize {
    10
}

/// Contact form configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactConfig {
    /// Lifetime of a captcha challenge
    #[serde(default = "default_captcha_ttl")]
    pub captcha_ttl_seconds: u64,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            captcha_ttl_seconds: default_captcha_ttl(),
        }
    }
}

fn default_captcha_ttl() -> u64 {
    600
}

/// Backup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Directory holding backup archives
    #[serde(default = "default_backup_path")]
    pub path: PathBuf,
    /// How often the automatic backup schedule is checked
    #[serde(default = "default_check_interval")]
    pub check_interval_minutes: u64,
    /// Maximum accepted upload size in bytes (default: 20MB)
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            path: default_backup_path(),
            check_interval_minutes: default_check_interval(),
            max_upload_size: default_max_upload_size(),
        }
    }
}

fn default_backup_path() -> PathBuf {
    PathBuf::from("data/backups")
}

fn default_check_interval() -> u64 {
    60
}

fn default_max_upload_size() -> u64 {
    20 * 1024 * 1024 // 20MB
}

/// Simulated latency applied to login, backup and summary generation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MockConfig {
    #[serde(default)]
    pub latency_ms: u64,
}

impl MockConfig {
    pub fn latency(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.latency_ms)
    }
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError {
        path: String,
        message: String,
    },
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist or is empty, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            }
        })?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment variables follow the pattern:
    /// - FOLIO_SERVER_HOST
    /// - FOLIO_SERVER_PORT
    /// - FOLIO_SERVER_CORS_ORIGIN
    /// - FOLIO_DATABASE_URL
    /// - FOLIO_CACHE_TTL_SECONDS
    /// - FOLIO_AUTH_ADMIN_EMAIL
    /// - FOLIO_AUTH_ADMIN_PASSWORD
    /// - FOLIO_AUTH_TWO_FACTOR
    /// - FOLIO_BACKUP_PATH
    /// - FOLIO_MOCK_LATENCY_MS
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("FOLIO_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("FOLIO_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(cors_origin) = std::env::var("FOLIO_SERVER_CORS_ORIGIN") {
            self.server.cors_origin = cors_origin;
        }

        if let Ok(url) = std::env::var("FOLIO_DATABASE_URL") {
            self.database.url = url;
        }

        if let Ok(ttl) = std::env::var("FOLIO_CACHE_TTL_SECONDS") {
            if let Ok(ttl) = ttl.parse::<u64>() {
                self.cache.ttl_seconds = ttl;
            }
        }

        if let Ok(email) = std::env::var("FOLIO_AUTH_ADMIN_EMAIL") {
            self.auth.admin_email = email;
        }
        if let Ok(password) = std::env::var("FOLIO_AUTH_ADMIN_PASSWORD") {
            self.auth.admin_password = password;
        }
        if let Ok(flag) = std::env::var("FOLIO_AUTH_TWO_FACTOR") {
            match flag.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.auth.two_factor = true,
                "0" | "false" | "no" | "off" => self.auth.two_factor = false,
                _ => {} // Ignore invalid values
            }
        }

        if let Ok(path) = std::env::var("FOLIO_BACKUP_PATH") {
            self.backup.path = PathBuf::from(path);
        }

        if let Ok(latency) = std::env::var("FOLIO_MOCK_LATENCY_MS") {
            if let Ok(latency) = latency.parse::<u64>() {
                self.mock.latency_ms = latency;
            }
        }
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared mutex for config tests that modify environment variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const ENV_KEYS: &[&str] = &[
        "FOLIO_SERVER_HOST",
        "FOLIO_SERVER_PORT",
        "FOLIO_SERVER_CORS_ORIGIN",
        "FOLIO_DATABASE_URL",
        "FOLIO_CACHE_TTL_SECONDS",
        "FOLIO_AUTH_ADMIN_EMAIL",
        "FOLIO_AUTH_ADMIN_PASSWORD",
        "FOLIO_AUTH_TWO_FACTOR",
        "FOLIO_BACKUP_PATH",
        "FOLIO_MOCK_LATENCY_MS",
    ];

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        super::CONFIG_ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn clear_env() {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let path = std::path::Path::new("nonexistent_folio_config.yml");
        let config = Config::load(path).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.url, "data/folio.db");
        assert_eq!(config.cache.ttl_seconds, 3600);
        assert_eq!(config.auth.admin_email, "admin@example.com");
        assert_eq!(config.auth.admin_password, "password");
        assert!(config.auth.two_factor);
        assert_eq!(config.backup.path, PathBuf::from("data/backups"));
        assert_eq!(config.mock.latency_ms, 0);
    }

    #[test]
    fn test_load_empty_file_returns_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "").unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.contact.captcha_ttl_seconds, 600);
    }

    #[test]
    fn test_load_partial_config_fills_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "auth:\n  two_factor: false\n").unwrap();

        let config = Config::load(file.path()).unwrap();

        assert!(!config.auth.two_factor);
        assert_eq!(config.auth.admin_email, "admin@example.com");
        assert_eq!(config.auth.session_ttl_hours, 168);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_load_full_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"
server:
  host: "127.0.0.1"
  port: 9000
database:
  url: "/var/lib/folio/site.db"
auth:
  admin_email: "owner@example.org"
  admin_password: "s3cret"
  two_factor: false
backup:
  path: "/var/backups/folio"
mock:
  latency_ms: 1500
"#).unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.database.url, "/var/lib/folio/site.db");
        assert_eq!(config.auth.admin_email, "owner@example.org");
        assert_eq!(config.auth.admin_password, "s3cret");
        assert!(!config.auth.two_factor);
        assert_eq!(config.backup.path, PathBuf::from("/var/backups/folio"));
        assert_eq!(config.mock.latency(), std::time::Duration::from_millis(1500));
    }

    #[test]
    fn test_load_invalid_yaml_returns_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "server:\n  port: not_a_number\n").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_load_malformed_yaml_returns_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "server:\n  host: [invalid yaml").unwrap();

        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_env_override_server_and_auth() {
        let _guard = lock_env();
        clear_env();

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "server:\n  port: 8080\n").unwrap();

        std::env::set_var("FOLIO_SERVER_PORT", "4000");
        std::env::set_var("FOLIO_AUTH_ADMIN_EMAIL", "me@example.net");
        std::env::set_var("FOLIO_AUTH_TWO_FACTOR", "off");

        let config = Config::load_with_env(file.path()).unwrap();

        assert_eq!(config.server.port, 4000);
        assert_eq!(config.auth.admin_email, "me@example.net");
        assert!(!config.auth.two_factor);

        clear_env();
    }

    #[test]
    fn test_env_override_invalid_values_ignored() {
        let _guard = lock_env();
        clear_env();

        std::env::set_var("FOLIO_SERVER_PORT", "not-a-port");
        std::env::set_var("FOLIO_AUTH_TWO_FACTOR", "maybe");
        std::env::set_var("FOLIO_MOCK_LATENCY_MS", "-5");

        let config = Config::load_with_env(std::path::Path::new("missing.yml")).unwrap();

        assert_eq!(config.server.port, 8080);
        assert!(config.auth.two_factor);
        assert_eq!(config.mock.latency_ms, 0);

        clear_env();
    }

    #[test]
    fn test_env_override_paths() {
        let _guard = lock_env();
        clear_env();

        std::env::set_var("FOLIO_DATABASE_URL", ":memory:");
        std::env::set_var("FOLIO_BACKUP_PATH", "/tmp/folio-backups");
        std::env::set_var("FOLIO_MOCK_LATENCY_MS", "250");

        let config = Config::load_with_env(std::path::Path::new("missing.yml")).unwrap();

        assert_eq!(config.database.url, ":memory:");
        assert_eq!(config.backup.path, PathBuf::from("/tmp/folio-backups"));
        assert_eq!(config.mock.latency_ms, 250);

        clear_env();
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn config_yaml_roundtrip(
            port in 1u16..=65535,
            email in "[a-z]{3,10}@[a-z]{3,8}\\.com",
            two_factor in any::<bool>(),
            latency in 0u64..5000,
        ) {
            let mut config = Config::default();
            config.server.port = port;
            config.auth.admin_email = email.clone();
            config.auth.two_factor = two_factor;
            config.mock.latency_ms = latency;

            let yaml = serde_yaml::to_string(&config).unwrap();
            let parsed: Config = serde_yaml::from_str(&yaml).unwrap();

            prop_assert_eq!(parsed.server.port, port);
            prop_assert_eq!(parsed.auth.admin_email, email);
            prop_assert_eq!(parsed.auth.two_factor, two_factor);
            prop_assert_eq!(parsed.mock.latency_ms, latency);
        }
    }
}
