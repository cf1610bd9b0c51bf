//! Backup and restore
//!
//! A backup is a JSON document of stored snapshots, gzip-compressed into the
//! backup directory as `backup-<timestamp>-<full|partial>[-uploaded].json.gz`.
//! The file stem is the backup id. Auth keys (admin account, sessions,
//! pending logins) are never written to a backup and never restored.

use chrono::{DateTime, Duration as ChronoDuration, NaiveDateTime, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::config::BackupConfig;
use crate::models::{
    format_size, BackupDocument, BackupKind, BackupRecord, BackupSettings, BackupStatus,
    FieldErrors, BACKUP_FREQUENCIES,
};
use crate::services::store::{keys, Store, StoreError};

const ARCHIVE_PREFIX: &str = "backup-";
const ARCHIVE_SUFFIX: &str = ".json.gz";
const UPLOADED_MARKER: &str = "-uploaded";
const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S%3fZ";
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
/// Decoded JSON may be at most this many times the upload limit
const MAX_EXPANSION: u64 = 32;

/// Backup service errors
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("Backup not found: {0}")]
    NotFound(String),

    #[error("Invalid backup: {0}")]
    InvalidBackup(String),

    #[error("Backup too large: {size} bytes (max {max})")]
    TooLarge { size: u64, max: u64 },

    #[error("Validation error: {0}")]
    Validation(FieldErrors),

    #[error("Backup I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of restoring a backup
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreSummary {
    pub id: String,
    pub restored_keys: Vec<String>,
}

pub struct BackupService {
    store: Arc<Store>,
    dir: PathBuf,
    max_upload_size: u64,
    latency: Duration,
    write_lock: Mutex<()>,
}

impl BackupService {
    pub fn new(store: Arc<Store>, config: &BackupConfig, latency: Duration) -> Self {
        Self {
            store,
            dir: config.path.clone(),
            max_upload_size: config.max_upload_size,
            latency,
            write_lock: Mutex::new(()),
        }
    }

    /// Largest accepted upload in bytes
    pub fn max_upload_size(&self) -> u64 {
        self.max_upload_size
    }

    pub async fn settings(&self) -> Result<BackupSettings, BackupError> {
        Ok(self.store.load_or_default(keys::BACKUP_SETTINGS).await?)
    }

    pub async fn update_settings(&self, settings: BackupSettings) -> Result<BackupSettings, BackupError> {
        if !BackupSettings::is_valid_frequency(settings.backup_frequency) {
            let mut errors = FieldErrors::new();
            errors.add(
                "backupFrequency",
                format!(
                    "Backup frequency must be one of {:?} days",
                    BACKUP_FREQUENCIES
                ),
            );
            return Err(BackupError::Validation(errors));
        }

        self.store.save(keys::BACKUP_SETTINGS, &settings).await?;
        Ok(settings)
    }

    /// Snapshot the store into a new archive
    pub async fn create_backup(&self) -> Result<BackupRecord, BackupError> {
        let settings = self.settings().await?;
        let entries: BTreeMap<String, Value> = self
            .store
            .snapshot()
            .await?
            .into_iter()
            .filter(|(key, _)| should_back_up(key, &settings))
            .collect();

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let document = BackupDocument {
            created_at: Utc::now(),
            kind: settings.kind(),
            entries,
        };
        let record = self.write_archive(&document, BackupStatus::Completed).await?;
        tracing::info!(
            "Created {} backup {} ({} keys, {})",
            record.kind.as_str(),
            record.id,
            document.entries.len(),
            record.size_label
        );
        Ok(record)
    }

    /// Archives on disk, newest first
    pub async fn history(&self) -> Result<Vec<BackupRecord>, BackupError> {
        let mut records = Vec::new();

        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(records),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = dir.next_entry().await? {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            let Some(id) = name.strip_suffix(ARCHIVE_SUFFIX) else {
                continue;
            };
            let Some((date, kind, status)) = parse_archive_id(id) else {
                tracing::debug!("Ignoring unrecognized file in backup directory: {}", name);
                continue;
            };
            let size = entry.metadata().await?.len();

            records.push(BackupRecord {
                id: id.to_string(),
                date,
                size,
                size_label: format_size(size),
                kind,
                status,
            });
        }

        records.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
        Ok(records)
    }

    /// Overwrite the stored keys with the contents of backup `id`
    pub async fn restore(&self, id: &str) -> Result<RestoreSummary, BackupError> {
        let document = decode_document(&self.download(id).await?, u64::MAX)?;

        let entries: BTreeMap<String, Value> = document
            .entries
            .into_iter()
            .filter(|(key, _)| !keys::is_auth_key(key))
            .collect();

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        self.store.restore(&entries).await?;
        tracing::info!("Restored backup {} ({} keys)", id, entries.len());

        Ok(RestoreSummary {
            id: id.to_string(),
            restored_keys: entries.into_keys().collect(),
        })
    }

    /// Raw archive bytes of backup `id`
    pub async fn download(&self, id: &str) -> Result<Vec<u8>, BackupError> {
        let path = self.archive_path(id)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(BackupError::NotFound(id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Store an uploaded backup (gzip or plain JSON) after validating it
    pub async fn upload(&self, bytes: &[u8]) -> Result<BackupRecord, BackupError> {
        let size = bytes.len() as u64;
        if size > self.max_upload_size {
            return Err(BackupError::TooLarge {
                size,
                max: self.max_upload_size,
            });
        }

        let max_decoded = self.max_upload_size.saturating_mul(MAX_EXPANSION);
        let mut document = decode_document(bytes, max_decoded)?;
        let before = document.entries.len();
        document.entries.retain(|key, _| !keys::is_auth_key(key));
        if document.entries.len() < before {
            tracing::warn!(
                "Dropped {} auth keys from uploaded backup",
                before - document.entries.len()
            );
        }
        if document.entries.is_empty() {
            return Err(BackupError::InvalidBackup(
                "Backup contains no entries".to_string(),
            ));
        }

        let record = self.write_archive(&document, BackupStatus::Uploaded).await?;
        tracing::info!("Stored uploaded backup {}", record.id);
        Ok(record)
    }

    pub async fn delete(&self, id: &str) -> Result<(), BackupError> {
        let path = self.archive_path(id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(BackupError::NotFound(id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Create a backup when automatic backups are on and the newest one is
    /// older than the configured frequency.
    pub async fn run_due(&self) -> Result<Option<BackupRecord>, BackupError> {
        let settings = self.settings().await?;
        if !settings.auto_backup {
            return Ok(None);
        }

        let history = self.history().await?;
        let newest = history.first().map(|r| r.date);
        if !is_due(newest, settings.backup_frequency, Utc::now()) {
            return Ok(None);
        }

        self.create_backup().await.map(Some)
    }

    fn archive_path(&self, id: &str) -> Result<PathBuf, BackupError> {
        if parse_archive_id(id).is_none() {
            return Err(BackupError::NotFound(id.to_string()));
        }
        Ok(self.dir.join(format!("{}{}", id, ARCHIVE_SUFFIX)))
    }

    async fn write_archive(
        &self,
        document: &BackupDocument,
        status: BackupStatus,
    ) -> Result<BackupRecord, BackupError> {
        let bytes = encode_document(document)?;

        let _guard = self.write_lock.lock().await;
        tokio::fs::create_dir_all(&self.dir).await?;

        let mut date = Utc::now();
        let (id, path) = loop {
            let id = archive_id(date, document.kind, status);
            let path = self.dir.join(format!("{}{}", id, ARCHIVE_SUFFIX));
            if !tokio::fs::try_exists(&path).await? {
                break (id, path);
            }
            date += ChronoDuration::milliseconds(1);
        };

        tokio::fs::write(&path, &bytes).await?;

        let size = bytes.len() as u64;
        Ok(BackupRecord {
            id,
            date: truncate_millis(date),
            size,
            size_label: format_size(size),
            kind: document.kind,
            status,
        })
    }
}

/// Which keys go into a backup under `settings`
fn should_back_up(key: &str, settings: &BackupSettings) -> bool {
    if keys::is_auth_key(key) {
        false
    } else if keys::CONFIGS.contains(&key) {
        settings.include_configs
    } else if key == keys::ANALYTICS {
        settings.include_statistics
    } else {
        true
    }
}

fn is_due(newest: Option<DateTime<Utc>>, frequency_days: u32, now: DateTime<Utc>) -> bool {
    match newest {
        None => true,
        Some(date) => now - date >= ChronoDuration::days(i64::from(frequency_days)),
    }
}

fn archive_id(date: DateTime<Utc>, kind: BackupKind, status: BackupStatus) -> String {
    let marker = match status {
        BackupStatus::Completed => "",
        BackupStatus::Uploaded => UPLOADED_MARKER,
    };
    format!(
        "{}{}-{}{}",
        ARCHIVE_PREFIX,
        date.format(TIMESTAMP_FORMAT),
        kind.as_str(),
        marker
    )
}

/// Split `backup-<timestamp>-<kind>[-uploaded]` into its parts
fn parse_archive_id(id: &str) -> Option<(DateTime<Utc>, BackupKind, BackupStatus)> {
    if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return None;
    }

    let rest = id.strip_prefix(ARCHIVE_PREFIX)?;
    let (rest, status) = match rest.strip_suffix(UPLOADED_MARKER) {
        Some(rest) => (rest, BackupStatus::Uploaded),
        None => (rest, BackupStatus::Completed),
    };
    let (timestamp, kind) = rest.rsplit_once('-')?;
    let kind = BackupKind::parse(kind)?;
    let date = NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT)
        .ok()?
        .and_utc();

    Some((date, kind, status))
}

fn truncate_millis(date: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(date.timestamp_millis()).unwrap_or(date)
}

fn encode_document(document: &BackupDocument) -> Result<Vec<u8>, BackupError> {
    let json = serde_json::to_vec(document).map_err(StoreError::from)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    Ok(encoder.finish()?)
}

/// Parse a backup from gzip-compressed or plain JSON bytes. Archives that
/// decompress past `max_decoded` bytes are rejected.
fn decode_document(bytes: &[u8], max_decoded: u64) -> Result<BackupDocument, BackupError> {
    let json = if bytes.starts_with(&GZIP_MAGIC) {
        let mut decoded = Vec::new();
        GzDecoder::new(bytes)
            .take(max_decoded.saturating_add(1))
            .read_to_end(&mut decoded)
            .map_err(|e| BackupError::InvalidBackup(format!("Corrupted archive: {}", e)))?;
        if decoded.len() as u64 > max_decoded {
            return Err(BackupError::InvalidBackup(format!(
                "Archive expands beyond {} bytes",
                max_decoded
            )));
        }
        decoded
    } else {
        bytes.to_vec()
    };

    serde_json::from_slice(&json).map_err(|e| BackupError::InvalidBackup(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Session, User, UserRole};
    use crate::services::store::test_store;
    use serde_json::json;
    use tempfile::TempDir;

    async fn service() -> (BackupService, Arc<Store>, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = test_store().await;
        let config = BackupConfig {
            path: dir.path().join("backups"),
            ..Default::default()
        };
        let service = BackupService::new(store.clone(), &config, Duration::ZERO);
        (service, store, dir)
    }

    fn admin() -> User {
        User {
            id: "1".into(),
            name: "Ahmed Jamal".into(),
            email: "admin@example.com".into(),
            role: UserRole::Admin,
            has_two_factor: true,
            last_login: None,
        }
    }

    async fn seed(store: &Store) {
        store.save(keys::BLOG_POSTS, &json!([{ "id": 1, "title": "Kept" }])).await.unwrap();
        store.save(keys::SITE_SETTINGS, &json!({ "siteName": "Original" })).await.unwrap();
        store.save(keys::ANALYTICS, &json!({ "daily": [] })).await.unwrap();
        store.save(keys::AUTH_USER, &admin()).await.unwrap();
        let session = Session::new("tok".into(), admin(), ChronoDuration::hours(1));
        store.save("auth_token:tok", &session).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let (service, store, _dir) = service().await;
        seed(&store).await;

        let first = service.create_backup().await.unwrap();
        let second = service.create_backup().await.unwrap();

        assert_eq!(first.kind, BackupKind::Full);
        assert_eq!(first.status, BackupStatus::Completed);
        assert!(first.id.starts_with("backup-"));
        assert!(first.id.ends_with("-full"));

        let history = service.history().await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, second.id);
        assert_eq!(history[1].id, first.id);
        assert!(history[0].size > 0);
    }

    #[tokio::test]
    async fn test_backup_never_contains_auth_keys() {
        let (service, store, _dir) = service().await;
        seed(&store).await;

        let record = service.create_backup().await.unwrap();
        let bytes = service.download(&record.id).await.unwrap();
        let document = decode_document(&bytes, u64::MAX).unwrap();

        assert!(document.entries.contains_key(keys::BLOG_POSTS));
        assert!(document.entries.contains_key(keys::SITE_SETTINGS));
        assert!(document.entries.keys().all(|k| !keys::is_auth_key(k)));
    }

    #[tokio::test]
    async fn test_partial_backup_respects_includes() {
        let (service, store, _dir) = service().await;
        seed(&store).await;
        service
            .update_settings(BackupSettings {
                include_configs: false,
                include_statistics: false,
                ..Default::default()
            })
            .await
            .unwrap();

        let record = service.create_backup().await.unwrap();
        assert_eq!(record.kind, BackupKind::Partial);

        let bytes = service.download(&record.id).await.unwrap();
        let document = decode_document(&bytes, u64::MAX).unwrap();
        assert!(document.entries.contains_key(keys::BLOG_POSTS));
        assert!(!document.entries.contains_key(keys::SITE_SETTINGS));
        assert!(!document.entries.contains_key(keys::BACKUP_SETTINGS));
        assert!(!document.entries.contains_key(keys::ANALYTICS));
    }

    #[tokio::test]
    async fn test_restore_overwrites_listed_keys() {
        let (service, store, _dir) = service().await;
        seed(&store).await;
        let record = service.create_backup().await.unwrap();

        store.save(keys::SITE_SETTINGS, &json!({ "siteName": "Changed" })).await.unwrap();
        store.save(keys::PRESS, &json!([])).await.unwrap();

        let summary = service.restore(&record.id).await.unwrap();
        assert!(summary.restored_keys.contains(&keys::SITE_SETTINGS.to_string()));

        let settings: Value = store.load(keys::SITE_SETTINGS).await.unwrap().unwrap();
        assert_eq!(settings["siteName"], "Original");
        // keys the backup does not list are left alone
        assert!(store.load::<Value>(keys::PRESS).await.unwrap().is_some());
        assert!(store.load::<Value>("auth_token:tok").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_upload_plain_json_strips_auth() {
        let (service, store, _dir) = service().await;
        let body = json!({
            "createdAt": "2025-05-06T15:32:24Z",
            "type": "Full",
            "entries": {
                "press": [],
                "auth_user": { "id": "x" }
            }
        });

        let record = service.upload(body.to_string().as_bytes()).await.unwrap();
        assert_eq!(record.status, BackupStatus::Uploaded);
        assert!(record.id.ends_with("-full-uploaded"));

        let summary = service.restore(&record.id).await.unwrap();
        assert_eq!(summary.restored_keys, vec!["press".to_string()]);
        assert!(store.load::<Value>(keys::AUTH_USER).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upload_gzip_roundtrips_through_download() {
        let (service, store, _dir) = service().await;
        seed(&store).await;
        let record = service.create_backup().await.unwrap();
        let bytes = service.download(&record.id).await.unwrap();

        let uploaded = service.upload(&bytes).await.unwrap();
        assert_eq!(service.history().await.unwrap().len(), 2);
        assert_eq!(uploaded.kind, record.kind);
    }

    #[tokio::test]
    async fn test_upload_rejects_garbage() {
        let (service, _store, _dir) = service().await;

        let err = service.upload(b"not a backup").await.unwrap_err();
        assert!(matches!(err, BackupError::InvalidBackup(_)));

        let err = service.upload(&[0x1f, 0x8b, 0, 1, 2]).await.unwrap_err();
        assert!(matches!(err, BackupError::InvalidBackup(_)));

        let empty = json!({ "createdAt": "2025-05-06T15:32:24Z", "type": "Full", "entries": {} });
        let err = service.upload(empty.to_string().as_bytes()).await.unwrap_err();
        assert!(matches!(err, BackupError::InvalidBackup(_)));
    }

    #[tokio::test]
    async fn test_upload_size_limit() {
        let dir = TempDir::new().unwrap();
        let config = BackupConfig {
            path: dir.path().to_path_buf(),
            max_upload_size: 8,
            ..Default::default()
        };
        let service = BackupService::new(test_store().await, &config, Duration::ZERO);

        let err = service.upload(&[b'{'; 16]).await.unwrap_err();
        assert!(matches!(err, BackupError::TooLarge { size: 16, max: 8 }));
    }

    #[tokio::test]
    async fn test_upload_rejects_archive_that_expands_too_far() {
        let dir = TempDir::new().unwrap();
        let config = BackupConfig {
            path: dir.path().to_path_buf(),
            max_upload_size: 4096,
            ..Default::default()
        };
        let service = BackupService::new(test_store().await, &config, Duration::ZERO);

        let padding = "a".repeat(512 * 1024);
        let body = json!({
            "createdAt": "2025-05-06T15:32:24Z",
            "type": "Full",
            "entries": { "press": [{ "id": 1, "title": padding }] }
        });
        let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(body.to_string().as_bytes()).unwrap();
        let archive = encoder.finish().unwrap();
        assert!(archive.len() < 4096);

        let err = service.upload(&archive).await.unwrap_err();
        assert!(matches!(err, BackupError::InvalidBackup(_)));
        assert!(service.history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_and_malicious_ids() {
        let (service, _store, _dir) = service().await;

        for id in ["backup-20250101T000000000Z-full", "../secret", "backup-x-full"] {
            assert!(matches!(
                service.download(id).await,
                Err(BackupError::NotFound(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_delete() {
        let (service, store, _dir) = service().await;
        seed(&store).await;
        let record = service.create_backup().await.unwrap();

        service.delete(&record.id).await.unwrap();
        assert!(service.history().await.unwrap().is_empty());
        assert!(matches!(
            service.delete(&record.id).await,
            Err(BackupError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_history_without_directory() {
        let (service, _store, _dir) = service().await;
        assert!(service.history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_settings_validation() {
        let (service, _store, _dir) = service().await;
        let err = service
            .update_settings(BackupSettings {
                backup_frequency: 3,
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BackupError::Validation(f) if f.contains("backupFrequency")));

        let saved = service
            .update_settings(BackupSettings {
                backup_frequency: 30,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(service.settings().await.unwrap(), saved);
    }

    #[tokio::test]
    async fn test_run_due() {
        let (service, _store, _dir) = service().await;

        assert!(service.run_due().await.unwrap().is_some());
        assert!(service.run_due().await.unwrap().is_none());

        service
            .update_settings(BackupSettings {
                auto_backup: false,
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(service.run_due().await.unwrap().is_none());
    }

    #[test]
    fn test_is_due() {
        let now = Utc::now();
        assert!(is_due(None, 7, now));
        assert!(!is_due(Some(now - ChronoDuration::days(6)), 7, now));
        assert!(is_due(Some(now - ChronoDuration::days(7)), 7, now));
    }

    #[test]
    fn test_archive_id_roundtrip() {
        let date = DateTime::parse_from_rfc3339("2025-05-06T15:32:24.123Z")
            .unwrap()
            .with_timezone(&Utc);
        let id = archive_id(date, BackupKind::Partial, BackupStatus::Uploaded);
        assert_eq!(id, "backup-20250506T153224123Z-partial-uploaded");

        let (parsed, kind, status) = parse_archive_id(&id).unwrap();
        assert_eq!(parsed, date);
        assert_eq!(kind, BackupKind::Partial);
        assert_eq!(status, BackupStatus::Uploaded);

        assert!(parse_archive_id("backup-20250506T153224123Z-weekly").is_none());
        assert!(parse_archive_id("notes").is_none());
    }
}
