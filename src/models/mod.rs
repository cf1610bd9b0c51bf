//! Data models
//!
//! This module contains the data structures persisted as JSON snapshots:
//! - The admin user, sessions and pending two-factor logins
//! - Blog posts and the content collections
//! - Site settings, profile, preferences, CV and contact settings
//! - Backup settings and records
//! - Visitor statistics

mod analytics;
mod backup;
mod blog_post;
mod content;
mod seed;
mod settings;
mod user;
mod validation;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use analytics::{
    tracked_page, DailyVisitors, MonthlyVisitors, PageViews, TrafficSource, VisitorStats,
    TRACKED_PAGES,
};
pub use backup::{
    format_size, BackupDocument, BackupKind, BackupRecord, BackupSettings, BackupStatus,
    BACKUP_FREQUENCIES,
};
pub use blog_post::{slugify, Author, BackgroundType, BlogPost, PostStatus};
pub use content::{
    Achievement, Application, LiteratureItem, Message, PortfolioItem, PressMention, ProjectStatus,
    PublishState, Resource, Training, TrainingLevel, TrainingStatus,
};
pub use settings::{
    ContactSettings, CvSections, CvSettings, Language, Preferences, ProfileData, SiteSettings,
    Theme, CV_FORMATS,
};
pub use user::{PendingTwoFactor, Session, User, UserRole};
pub use validation::FieldErrors;

/// A record kept in a JSON array snapshot, identified by a numeric id.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Storage key of the collection snapshot
    const STORAGE_KEY: &'static str;
    /// Human-readable name used in error messages
    const LABEL: &'static str;

    fn id(&self) -> i64;

    fn set_id(&mut self, id: i64);

    /// Text fields matched by search
    fn search_fields(&self) -> Vec<&str>;

    fn validate(&self) -> Result<(), FieldErrors> {
        Ok(())
    }

    /// Stamp derived fields before the record is saved
    fn touch(&mut self) {}

    /// Whether the record is shown on the public site
    fn is_public(&self) -> bool {
        true
    }

    /// Records present before anything was saved
    fn seed() -> Vec<Self>;

    /// Case-insensitive substring search over `search_fields`
    fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&query))
    }
}
