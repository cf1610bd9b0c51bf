//! Backup models
//!
//! A backup is a gzip-compressed JSON document holding a copy of the stored
//! snapshots. The archive name encodes creation time, kind and origin so the
//! history can be listed without decompressing every file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Backup preferences (`backup-settings`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackupSettings {
    pub auto_backup: bool,
    /// Days between automatic backups: 1, 7, 14 or 30
    pub backup_frequency: u32,
    pub include_media: bool,
    pub include_configs: bool,
    pub include_statistics: bool,
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            auto_backup: true,
            backup_frequency: 7,
            include_media: true,
            include_configs: true,
            include_statistics: true,
        }
    }
}

pub const BACKUP_FREQUENCIES: &[u32] = &[1, 7, 14, 30];

impl BackupSettings {
    pub fn is_valid_frequency(days: u32) -> bool {
        BACKUP_FREQUENCIES.contains(&days)
    }

    /// Everything included
    pub fn kind(&self) -> BackupKind {
        if self.include_configs && self.include_statistics {
            BackupKind::Full
        } else {
            BackupKind::Partial
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackupKind {
    Full,
    Partial,
}

impl BackupKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackupKind::Full => "full",
            BackupKind::Partial => "partial",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "full" => Some(BackupKind::Full),
            "partial" => Some(BackupKind::Partial),
            _ => None,
        }
    }
}

impl fmt::Display for BackupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackupKind::Full => write!(f, "Full"),
            BackupKind::Partial => write!(f, "Partial"),
        }
    }
}

/// How the archive came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackupStatus {
    Completed,
    Uploaded,
}

/// Contents of a backup archive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub created_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: BackupKind,
    /// Storage key to snapshot
    pub entries: BTreeMap<String, Value>,
}

/// One archive in the backup history
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupRecord {
    pub id: String,
    pub date: DateTime<Utc>,
    /// Archive size in bytes
    pub size: u64,
    /// Size for display, e.g. `24.5 MB`
    pub size_label: String,
    #[serde(rename = "type")]
    pub kind: BackupKind,
    pub status: BackupStatus,
}

/// Format a byte count as B, KB or MB with one decimal
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    let value = bytes as f64;
    if value >= MB {
        format!("{:.1} MB", value / MB)
    } else if value >= KB {
        format!("{:.1} KB", value / KB)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = BackupSettings::default();
        assert!(settings.auto_backup);
        assert_eq!(settings.backup_frequency, 7);
        assert_eq!(settings.kind(), BackupKind::Full);
    }

    #[test]
    fn test_frequency_validation() {
        for days in [1, 7, 14, 30] {
            assert!(BackupSettings::is_valid_frequency(days));
        }
        assert!(!BackupSettings::is_valid_frequency(0));
        assert!(!BackupSettings::is_valid_frequency(3));
    }

    #[test]
    fn test_partial_kind() {
        let settings = BackupSettings {
            include_statistics: false,
            ..Default::default()
        };
        assert_eq!(settings.kind(), BackupKind::Partial);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(25_690_112), "24.5 MB");
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!(BackupKind::parse("full"), Some(BackupKind::Full));
        assert_eq!(BackupKind::parse("partial"), Some(BackupKind::Partial));
        assert_eq!(BackupKind::parse("Full"), None);
    }
}
