//! Blog post model
//!
//! Posts are stored as one JSON array under `blog-posts`. The content is raw
//! markdown as produced by the editor toolbar; HTML is rendered on read.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::{FieldErrors, Record};
use crate::services::store::keys;

/// Blog post entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlogPost {
    pub id: i64,
    pub title: String,
    /// URL-friendly slug, derived from the title when left empty
    pub slug: String,
    /// Markdown content
    pub content: String,
    pub excerpt: String,
    pub featured_image: String,
    pub background_type: BackgroundType,
    pub background_video: Option<String>,
    pub background_color: Option<String>,
    pub category: String,
    pub tags: Vec<String>,
    pub status: PostStatus,
    pub author: Author,
    pub publish_date: Option<DateTime<Utc>>,
    pub last_modified: Option<DateTime<Utc>>,
    pub views: u64,
    pub featured: bool,
    pub allow_comments: bool,
    pub social_share_image: Option<String>,
    pub tts_enabled: bool,
    pub ai_summary: Option<String>,
    pub language: String,
}

impl Default for BlogPost {
    fn default() -> Self {
        Self {
            id: 0,
            title: String::new(),
            slug: String::new(),
            content: String::new(),
            excerpt: String::new(),
            featured_image: String::new(),
            background_type: BackgroundType::Image,
            background_video: None,
            background_color: None,
            category: "Technology".to_string(),
            tags: Vec::new(),
            status: PostStatus::Draft,
            author: Author::default(),
            publish_date: None,
            last_modified: None,
            views: 0,
            featured: false,
            allow_comments: true,
            social_share_image: None,
            tts_enabled: false,
            ai_summary: None,
            language: "en".to_string(),
        }
    }
}

impl BlogPost {
    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    /// Fill the slug from the title when none was given
    pub fn ensure_slug(&mut self) {
        if self.slug.trim().is_empty() {
            self.slug = slugify(&self.title);
        }
    }
}

/// Post author card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Author {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub bio: String,
    /// Network name to profile URL
    pub social_media: BTreeMap<String, String>,
}

impl Default for Author {
    fn default() -> Self {
        let social_media = [
            ("twitter", "https://twitter.com/ahmedjamal"),
            ("facebook", "https://facebook.com/ahmedjamal"),
            ("linkedin", "https://linkedin.com/in/ahmedjamal"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            id: "1".to_string(),
            name: "Ahmed Jamal".to_string(),
            avatar: "/placeholder.svg".to_string(),
            bio: "Digital professional with expertise in social media, graphic design, web development, and training.".to_string(),
            social_media,
        }
    }
}

/// Publication state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
    Scheduled,
    Private,
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostStatus::Draft => write!(f, "draft"),
            PostStatus::Published => write!(f, "published"),
            PostStatus::Scheduled => write!(f, "scheduled"),
            PostStatus::Private => write!(f, "private"),
        }
    }
}

/// Hero background of a post page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundType {
    #[default]
    Image,
    Video,
    Gif,
    Color,
}

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static NON_SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_-]+").expect("valid regex"));

/// Build a slug: lowercase, whitespace runs become `-`, everything outside
/// `[A-Za-z0-9_-]` is dropped.
pub fn slugify(title: &str) -> String {
    let lower = title.to_lowercase();
    let dashed = WHITESPACE.replace_all(&lower, "-");
    NON_SLUG.replace_all(&dashed, "").into_owned()
}

impl Record for BlogPost {
    const STORAGE_KEY: &'static str = keys::BLOG_POSTS;
    const LABEL: &'static str = "Blog post";

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
        let mut errors = FieldErrors::new();
        errors.require("title", &self.title, "Title is required");
        errors.require("excerpt", &self.excerpt, "Excerpt is required");
        errors.require("content", &self.content, "Content is required");
        errors.into_result()
    }

    fn touch(&mut self) {
        self.ensure_slug();
        self.last_modified = Some(Utc::now());
        if self.publish_date.is_none() && self.status != PostStatus::Draft {
            self.publish_date = self.last_modified;
        }
    }

    fn is_public(&self) -> bool {
        self.is_published()
    }

    fn seed() -> Vec<Self> {
        super::seed::blog_posts()
    }
}
