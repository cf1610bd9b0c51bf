//! Typed key-value store
//!
//! Every piece of site state is a JSON snapshot under a fixed key, written
//! wholesale on save. A snapshot that no longer deserializes into its type is
//! treated as corrupted: the key is cleared and the caller falls back to
//! defaults.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

use crate::db::repositories::StorageRepository;

/// Fixed storage keys
pub mod keys {
    pub const SITE_SETTINGS: &str = "site-settings";
    pub const PROFILE_DATA: &str = "profile-data";
    pub const BLOG_DRAFTS: &str = "blog-drafts";
    pub const BLOG_POSTS: &str = "blog-posts";
    pub const PORTFOLIO_ITEMS: &str = "portfolio-items";
    pub const APPLICATIONS: &str = "applications";
    pub const TRAININGS: &str = "trainings";
    pub const ACHIEVEMENTS: &str = "achievements";
    pub const LITERATURE: &str = "literature";
    pub const PRESS: &str = "press";
    pub const RESOURCES: &str = "resources";
    pub const MESSAGES: &str = "messages";
    pub const CV_SETTINGS: &str = "cv-settings";
    pub const CONTACT_SETTINGS: &str = "contact-settings";
    pub const BACKUP_SETTINGS: &str = "backup-settings";
    pub const ANALYTICS: &str = "analytics";
    pub const LANGUAGE: &str = "language";
    pub const THEME: &str = "theme";
    pub const AUTH_USER: &str = "auth_user";
    pub const AUTH_TOKEN_PREFIX: &str = "auth_token:";
    pub const AUTH_PENDING_PREFIX: &str = "auth_pending_2fa:";

    /// Content collections
    pub const CONTENT: &[&str] = &[
        BLOG_POSTS,
        BLOG_DRAFTS,
        PORTFOLIO_ITEMS,
        APPLICATIONS,
        TRAININGS,
        ACHIEVEMENTS,
        LITERATURE,
        PRESS,
        RESOURCES,
        MESSAGES,
    ];

    /// Site configuration snapshots
    pub const CONFIGS: &[&str] = &[
        SITE_SETTINGS,
        PROFILE_DATA,
        CV_SETTINGS,
        CONTACT_SETTINGS,
        BACKUP_SETTINGS,
        LANGUAGE,
        THEME,
    ];

    /// Keys holding credentials or sessions
    pub fn is_auth_key(key: &str) -> bool {
        key == AUTH_USER
            || key.starts_with(AUTH_TOKEN_PREFIX)
            || key.starts_with(AUTH_PENDING_PREFIX)
    }
}

/// Errors from the typed store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Backend(#[from] anyhow::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Typed access to the key-value snapshot table
pub struct Store {
    repo: Arc<dyn StorageRepository>,
}

impl Store {
    pub fn new(repo: Arc<dyn StorageRepository>) -> Self {
        Self { repo }
    }

    /// Load the snapshot under `key`.
    ///
    /// Returns `None` when the key is absent. A corrupted snapshot is removed
    /// and reported as absent.
    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(entry) = self.repo.get(key).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<T>(&entry.value) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!("Clearing corrupted snapshot '{}': {}", key, e);
                self.repo.delete(key).await?;
                Ok(None)
            }
        }
    }

    /// Load the snapshot under `key`, falling back to `T::default()`
    pub async fn load_or_default<T>(&self, key: &str) -> Result<T, StoreError>
    where
        T: DeserializeOwned + Default,
    {
        Ok(self.load(key).await?.unwrap_or_default())
    }

    /// Serialize `value` and overwrite the snapshot under `key`
    pub async fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value)?;
        self.repo.set(key, &json).await?;
        tracing::debug!("Saved snapshot '{}' ({} bytes)", key, json.len());
        Ok(())
    }

    /// Remove the snapshot under `key`. Returns whether it existed.
    pub async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.repo.delete(key).await?)
    }

    pub async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        Ok(self.repo.keys_with_prefix(prefix).await?)
    }

    /// All snapshots that parse as JSON, keyed by name.
    ///
    /// Unparseable entries are skipped rather than cleared.
    pub async fn snapshot(&self) -> Result<BTreeMap<String, Value>, StoreError> {
        let mut entries = BTreeMap::new();
        for entry in self.repo.get_all().await? {
            match serde_json::from_str::<Value>(&entry.value) {
                Ok(value) => {
                    entries.insert(entry.key, value);
                }
                Err(e) => tracing::warn!("Skipping unreadable snapshot '{}': {}", entry.key, e),
            }
        }
        Ok(entries)
    }

    /// Overwrite each given key with its snapshot. Keys not listed are kept.
    pub async fn restore(&self, entries: &BTreeMap<String, Value>) -> Result<usize, StoreError> {
        for (key, value) in entries {
            self.save(key, value).await?;
        }
        Ok(entries.len())
    }
}

#[cfg(test)]
pub(crate) async fn test_store() -> Arc<Store> {
    use crate::db::repositories::SqlxStorageRepository;
    use crate::db::{create_test_pool, migrations::run_migrations};

    let pool = create_test_pool().await.expect("Failed to create test pool");
    run_migrations(&pool).await.expect("Failed to run migrations");
    Arc::new(Store::new(Arc::new(SqlxStorageRepository::new(pool))))
}
