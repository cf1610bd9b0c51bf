//! Content collection records
//!
//! Each collection is one JSON array snapshot. Records are plain data with a
//! numeric id unique within their collection.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{seed, FieldErrors, Record};
use crate::services::store::keys;

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn require_title(title: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    errors.require("title", title, "Title is required");
    errors.into_result()
}

// ============================================================================
// Portfolio
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    #[default]
    Completed,
    InProgress,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PortfolioItem {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub client: String,
    /// `None` while the project is in progress
    pub completion_date: Option<NaiveDate>,
    pub featured: bool,
    pub images_count: u32,
    pub status: ProjectStatus,
    pub url: Option<String>,
}

impl Record for PortfolioItem {
    const STORAGE_KEY: &'static str = keys::PORTFOLIO_ITEMS;
    const LABEL: &'static str = "Portfolio item";

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.title, &self.category, &self.client]
    }

    fn validate(&self) -> Result<(), FieldErrors> {
        require_title(&self.title)
    }

    fn seed() -> Vec<Self> {
        seed::portfolio_items()
    }
}

// ============================================================================
// Applications
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishState {
    #[default]
    Draft,
    Published,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    /// `web`, `ios`, `android`, ...
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub status: PublishState,
    #[serde(default = "today")]
    pub last_updated: NaiveDate,
}

impl Record for Application {
    const STORAGE_KEY: &'static str = keys::APPLICATIONS;
    const LABEL: &'static str = "Application";

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.title, &self.category]
    }

    fn validate(&self) -> Result<(), FieldErrors> {
        require_title(&self.title)
    }

    fn touch(&mut self) {
        self.last_updated = today();
    }

    fn is_public(&self) -> bool {
        self.status == PublishState::Published
    }

    fn seed() -> Vec<Self> {
        seed::applications()
    }
}

// ============================================================================
// Training
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingStatus {
    #[default]
    Draft,
    Active,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Training {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub level: TrainingLevel,
    /// Free text such as `24 hours`
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub registrations: u32,
    #[serde(default)]
    pub status: TrainingStatus,
    #[serde(default = "today")]
    pub last_updated: NaiveDate,
}

impl Record for Training {
    const STORAGE_KEY: &'static str = keys::TRAININGS;
    const LABEL: &'static str = "Training course";

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.title, &self.category]
    }

    fn validate(&self) -> Result<(), FieldErrors> {
        require_title(&self.title)
    }

    fn touch(&mut self) {
        self.last_updated = today();
    }

    fn is_public(&self) -> bool {
        self.status != TrainingStatus::Draft
    }

    fn seed() -> Vec<Self> {
        seed::trainings()
    }
}

// ============================================================================
// Achievements
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    /// `Award`, `Certification`, `Recognition`, `Success Story`
    #[serde(default)]
    pub category: String,
    #[serde(default = "today")]
    pub date: NaiveDate,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub images_count: u32,
}

impl Record for Achievement {
    const STORAGE_KEY: &'static str = keys::ACHIEVEMENTS;
    const LABEL: &'static str = "Achievement";

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.title, &self.category, &self.location]
    }

    fn validate(&self) -> Result<(), FieldErrors> {
        require_title(&self.title)
    }

    fn seed() -> Vec<Self> {
        seed::achievements()
    }
}

// ============================================================================
// Literature
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiteratureItem {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default = "today")]
    pub date: NaiveDate,
}

impl Record for LiteratureItem {
    const STORAGE_KEY: &'static str = keys::LITERATURE;
    const LABEL: &'static str = "Literature item";

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.title, &self.category, &self.excerpt]
    }

    fn validate(&self) -> Result<(), FieldErrors> {
        require_title(&self.title)
    }

    fn seed() -> Vec<Self> {
        seed::literature()
    }
}

// ============================================================================
// Press
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PressMention {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    /// Publication or channel name
    #[serde(default)]
    pub outlet: String,
    #[serde(default)]
    pub category: String,
    #[serde(default = "today")]
    pub date: NaiveDate,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub featured: bool,
}

impl Record for PressMention {
    const STORAGE_KEY: &'static str = keys::PRESS;
    const LABEL: &'static str = "Press mention";

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.title, &self.outlet, &self.category]
    }

    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require("title", &self.title, "Title is required");
        errors.require("outlet", &self.outlet, "Outlet is required");
        errors.into_result()
    }

    fn seed() -> Vec<Self> {
        seed::press()
    }
}

// ============================================================================
// Resources
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Resource {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    /// File type label, e.g. `PDF`
    #[serde(rename = "type")]
    pub file_type: String,
    /// Human-readable size, e.g. `1.2 MB`
    pub size: String,
    pub downloadable: bool,
    pub featured: bool,
    pub downloads: u64,
}

impl Record for Resource {
    const STORAGE_KEY: &'static str = keys::RESOURCES;
    const LABEL: &'static str = "Resource";

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.title, &self.description, &self.category]
    }

    fn validate(&self) -> Result<(), FieldErrors> {
        require_title(&self.title)
    }

    fn seed() -> Vec<Self> {
        seed::resources()
    }
}

// ============================================================================
// Messages
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
    #[serde(default = "today")]
    pub date: NaiveDate,
    #[serde(default)]
    pub read: bool,
}

impl Message {
    /// A freshly received, unread message dated today
    pub fn received(sender: String, email: String, subject: String, message: String) -> Self {
        Self {
            id: 0,
            sender,
            email,
            subject,
            message,
            date: today(),
            read: false,
        }
    }
}

impl Record for Message {
    const STORAGE_KEY: &'static str = keys::MESSAGES;
    const LABEL: &'static str = "Message";

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.sender, &self.subject, &self.email]
    }

    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require("sender", &self.sender, "Sender is required");
        errors.require("email", &self.email, "Email is required");
        errors.require("subject", &self.subject, "Subject is required");
        errors.into_result()
    }

    fn is_public(&self) -> bool {
        false
    }

    fn seed() -> Vec<Self> {
        seed::messages()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portfolio_status_kebab_case() {
        let json = serde_json::to_value(ProjectStatus::InProgress).unwrap();
        assert_eq!(json, "in-progress");
    }

    #[test]
    fn test_resource_type_field_name() {
        let resource: Resource = serde_json::from_str(
            r#"{"title":"Slides","type":"PPTX","size":"5.2 MB","downloadable":true}"#,
        )
        .unwrap();
        assert_eq!(resource.file_type, "PPTX");
        assert_eq!(serde_json::to_value(&resource).unwrap()["type"], "PPTX");
    }

    #[test]
    fn test_missing_date_defaults_to_today() {
        let achievement: Achievement = serde_json::from_str(r#"{"title":"Award"}"#).unwrap();
        assert_eq!(achievement.date, today());
    }

    #[test]
    fn test_visibility() {
        let mut app: Application = serde_json::from_str(r#"{"title":"App"}"#).unwrap();
        assert!(!app.is_public());
        app.status = PublishState::Published;
        assert!(app.is_public());

        let message = Message::received("A".into(), "a@b.co".into(), "Hi".into(), "Hello there".into());
        assert!(!message.is_public());
        assert!(!message.read);
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let item = PortfolioItem {
            title: "Mobile Banking App UI".into(),
            client: "Finance Bank".into(),
            ..Default::default()
        };
        assert!(item.matches("banking"));
        assert!(item.matches("FINANCE"));
        assert!(!item.matches("fashion"));
    }

    #[test]
    fn test_press_requires_outlet() {
        let mention: PressMention = serde_json::from_str(r#"{"title":"Interview"}"#).unwrap();
        let errors = mention.validate().unwrap_err();
        assert!(errors.contains("outlet"));
        assert!(!errors.contains("title"));
    }
}
