//! Services layer - Business logic
//!
//! Services sit between the HTTP handlers and the key-value store. They:
//! - Implement the site's rules (validation, visibility, drafts, captcha)
//! - Serialize read-modify-write cycles on shared snapshots
//! - Report failures through per-service error enums

pub mod analytics;
pub mod auth;
pub mod backup;
pub mod blog;
pub mod collection;
pub mod contact;
pub mod editor;
pub mod markdown;
pub mod rate_limiter;
pub mod settings;
pub mod store;

pub use analytics::{AnalyticsError, AnalyticsService, DashboardSummary};
pub use auth::{AuthService, AuthServiceError, LoginOutcome};
pub use backup::{BackupError, BackupService, RestoreSummary};
pub use blog::{BlogService, BlogServiceError, DraftKey, PublicPost};
pub use collection::{CollectionError, CollectionService, Collections};
pub use contact::{Captcha, ContactError, ContactForm, ContactService};
pub use markdown::MarkdownRenderer;
pub use rate_limiter::LoginRateLimiter;
pub use settings::{SettingsService, SettingsServiceError};
pub use store::{Store, StoreError};
