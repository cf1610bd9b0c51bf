//! Blog service
//!
//! Posts are a regular collection snapshot; on top of that the blog keeps
//! editor drafts under `blog-drafts`, renders markdown for public reads and
//! produces the simulated AI summary.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::cache::{CacheLayer, MemoryCache};
use crate::models::{BlogPost, FieldErrors, PostStatus, Record};
use crate::services::collection::{CollectionError, CollectionService};
use crate::services::markdown::MarkdownRenderer;
use crate::services::store::{keys, Store, StoreError};

/// Minimum content length for a summary
pub const SUMMARY_MIN_CONTENT: usize = 100;

const RELATED_POSTS: usize = 3;
const HTML_CACHE_PREFIX: &str = "post_html:";
const NEW_DRAFT: &str = "new";

/// Blog service errors
#[derive(Debug, Error)]
pub enum BlogServiceError {
    #[error("Blog post not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(FieldErrors),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Cache error: {0}")]
    Cache(#[from] anyhow::Error),
}

impl From<CollectionError> for BlogServiceError {
    fn from(err: CollectionError) -> Self {
        match err {
            CollectionError::NotFound { id, .. } => BlogServiceError::NotFound(id.to_string()),
            CollectionError::Validation(fields) => BlogServiceError::Validation(fields),
            CollectionError::Store(e) => BlogServiceError::Store(e),
        }
    }
}

/// Which editor a draft belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftKey {
    New,
    Post(i64),
}

impl DraftKey {
    /// `new` or a post id
    pub fn parse(s: &str) -> Option<Self> {
        if s == NEW_DRAFT {
            return Some(DraftKey::New);
        }
        s.parse().ok().map(DraftKey::Post)
    }

    fn as_key(&self) -> String {
        match self {
            DraftKey::New => NEW_DRAFT.to_string(),
            DraftKey::Post(id) => id.to_string(),
        }
    }
}

/// Short form of a post used in listings of related posts
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub featured_image: String,
    pub category: String,
    pub publish_date: Option<DateTime<Utc>>,
}

impl From<&BlogPost> for PostSummary {
    fn from(post: &BlogPost) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            slug: post.slug.clone(),
            excerpt: post.excerpt.clone(),
            featured_image: post.featured_image.clone(),
            category: post.category.clone(),
            publish_date: post.publish_date,
        }
    }
}

/// A published post as served to visitors
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicPost {
    #[serde(flatten)]
    pub post: BlogPost,
    pub html: String,
    pub reading_minutes: usize,
    pub related: Vec<PostSummary>,
}

pub struct BlogService {
    posts: CollectionService<BlogPost>,
    store: Arc<Store>,
    cache: Arc<MemoryCache>,
    renderer: MarkdownRenderer,
    draft_lock: Mutex<()>,
    latency: Duration,
}

impl BlogService {
    pub fn new(store: Arc<Store>, cache: Arc<MemoryCache>, latency: Duration) -> Self {
        Self {
            posts: CollectionService::new(store.clone()),
            store,
            cache,
            renderer: MarkdownRenderer::new(),
            draft_lock: Mutex::new(()),
            latency,
        }
    }

    /// Admin listing with optional search and status filter
    pub async fn list(
        &self,
        search: Option<&str>,
        status: Option<PostStatus>,
    ) -> Result<Vec<BlogPost>, BlogServiceError> {
        let posts = self.posts.list(search).await?;
        Ok(match status {
            Some(status) => posts.into_iter().filter(|p| p.status == status).collect(),
            None => posts,
        })
    }

    /// Published posts only
    pub async fn list_public(&self, search: Option<&str>) -> Result<Vec<BlogPost>, BlogServiceError> {
        Ok(self.posts.list_public(search).await?)
    }

    pub async fn get(&self, id: i64) -> Result<BlogPost, BlogServiceError> {
        Ok(self.posts.get(id).await?)
    }

    /// Look a post up by numeric id, falling back to the slug
    pub async fn find(&self, id_or_slug: &str) -> Result<BlogPost, BlogServiceError> {
        let posts = self.posts.all().await?;
        let by_id = id_or_slug
            .parse::<i64>()
            .ok()
            .and_then(|id| posts.iter().position(|p| p.id == id));
        let index = by_id.or_else(|| posts.iter().position(|p| p.slug == id_or_slug));
        index
            .map(|i| posts[i].clone())
            .ok_or_else(|| BlogServiceError::NotFound(id_or_slug.to_string()))
    }

    /// Serve a published post: counts the view, renders the markdown and
    /// picks related posts.
    pub async fn read_public(&self, id_or_slug: &str) -> Result<PublicPost, BlogServiceError> {
        let post = self.find(id_or_slug).await?;
        if !post.is_published() {
            return Err(BlogServiceError::NotFound(id_or_slug.to_string()));
        }

        let post = self.posts.modify(post.id, |p| p.views += 1).await?;
        let html = self.render(&post).await?;

        let related = self
            .posts
            .list_public(None)
            .await?
            .iter()
            .filter(|p| p.id != post.id)
            .take(RELATED_POSTS)
            .map(PostSummary::from)
            .collect();

        Ok(PublicPost {
            reading_minutes: self.renderer.reading_minutes(&post.content),
            html,
            related,
            post,
        })
    }

    /// Rendered HTML, cached per post revision
    async fn render(&self, post: &BlogPost) -> Result<String, BlogServiceError> {
        let revision = post
            .last_modified
            .map(|t| t.timestamp_millis())
            .unwrap_or_default();
        let key = format!("{}{}:{}", HTML_CACHE_PREFIX, post.id, revision);

        if let Some(html) = self.cache.get::<String>(&key).await? {
            return Ok(html);
        }

        let html = self.renderer.render(&post.content);
        self.cache.set_default(&key, &html).await?;
        Ok(html)
    }

    async fn forget_rendered(&self, id: i64) -> Result<(), BlogServiceError> {
        self.cache
            .delete_prefix(&format!("{}{}:", HTML_CACHE_PREFIX, id))
            .await?;
        Ok(())
    }

    pub async fn create(&self, post: BlogPost) -> Result<BlogPost, BlogServiceError> {
        let post = self.posts.create(post).await?;
        self.discard_draft(DraftKey::New).await?;
        tracing::info!("Created blog post {} '{}'", post.id, post.title);
        Ok(post)
    }

    pub async fn update(&self, id: i64, post: BlogPost) -> Result<BlogPost, BlogServiceError> {
        let post = self.posts.update(id, post).await?;
        self.forget_rendered(id).await?;
        self.discard_draft(DraftKey::Post(id)).await?;
        Ok(post)
    }

    /// Remove exactly that post, along with its draft
    pub async fn delete(&self, id: i64) -> Result<(), BlogServiceError> {
        self.posts.delete(id).await?;
        self.forget_rendered(id).await?;
        self.discard_draft(DraftKey::Post(id)).await?;
        tracing::info!("Deleted blog post {}", id);
        Ok(())
    }

    pub async fn toggle_featured(&self, id: i64) -> Result<BlogPost, BlogServiceError> {
        Ok(self.posts.modify(id, |p| p.featured = !p.featured).await?)
    }

    /// Post counts per status
    pub async fn status_counts(&self) -> Result<BTreeMap<String, usize>, BlogServiceError> {
        let mut counts = BTreeMap::new();
        for status in [
            PostStatus::Published,
            PostStatus::Draft,
            PostStatus::Scheduled,
            PostStatus::Private,
        ] {
            counts.insert(status.to_string(), 0);
        }
        for post in self.posts.all().await? {
            *counts.entry(post.status.to_string()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn drafts(&self) -> Result<BTreeMap<String, BlogPost>, BlogServiceError> {
        Ok(self.store.load_or_default(keys::BLOG_DRAFTS).await?)
    }

    /// Autosave the editor state. Drafts are always stored as `draft`.
    pub async fn save_draft(&self, key: DraftKey, mut post: BlogPost) -> Result<BlogPost, BlogServiceError> {
        post.status = PostStatus::Draft;
        post.last_modified = Some(Utc::now());
        if let DraftKey::Post(id) = key {
            post.set_id(id);
        }

        let _guard = self.draft_lock.lock().await;
        let mut drafts = self.drafts().await?;
        drafts.insert(key.as_key(), post.clone());
        self.store.save(keys::BLOG_DRAFTS, &drafts).await?;
        Ok(post)
    }

    pub async fn get_draft(&self, key: DraftKey) -> Result<Option<BlogPost>, BlogServiceError> {
        Ok(self.drafts().await?.remove(&key.as_key()))
    }

    /// Drop a draft. Returns whether one existed.
    pub async fn discard_draft(&self, key: DraftKey) -> Result<bool, BlogServiceError> {
        let _guard = self.draft_lock.lock().await;
        let mut drafts = self.drafts().await?;
        if drafts.remove(&key.as_key()).is_none() {
            return Ok(false);
        }
        self.store.save(keys::BLOG_DRAFTS, &drafts).await?;
        Ok(true)
    }

    /// Simulated AI summary of a post being edited
    pub async fn generate_summary(
        &self,
        title: &str,
        category: &str,
        content: &str,
    ) -> Result<String, BlogServiceError> {
        if content.chars().count() < SUMMARY_MIN_CONTENT {
            let mut errors = FieldErrors::new();
            errors.add(
                "content",
                format!(
                    "Content must be at least {} characters to generate a summary",
                    SUMMARY_MIN_CONTENT
                ),
            );
            return Err(BlogServiceError::Validation(errors));
        }

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        Ok(format!(
            "This is an AI-generated summary of the article \"{}\". It discusses key points related to {} and provides insights for readers interested in this topic.",
            title, category
        ))
    }

    /// Total views across all posts
    pub async fn total_views(&self) -> Result<u64, BlogServiceError> {
        Ok(self.posts.all().await?.iter().map(|p| p.views).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::test_store;

    async fn service() -> BlogService {
        BlogService::new(test_store().await, Arc::new(MemoryCache::new()), Duration::ZERO)
    }

    fn post(title: &str) -> BlogPost {
        BlogPost {
            title: title.to_string(),
            excerpt: "Short excerpt".to_string(),
            content: "## Heading\n\nBody text.".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_public_list_only_published() {
        let service = service().await;
        let all = service.list(None, None).await.unwrap();
        let public = service.list_public(None).await.unwrap();

        assert_eq!(all.len(), 5);
        assert_eq!(public.len(), 3);
        assert!(public.iter().all(BlogPost::is_published));
    }

    #[tokio::test]
    async fn test_status_filter_and_search() {
        let service = service().await;

        let drafts = service.list(None, Some(PostStatus::Draft)).await.unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].title, "The Future of Mobile App Design");

        let found = service.list(Some("react"), None).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Introduction to React Hooks");
    }

    #[tokio::test]
    async fn test_find_by_slug_or_id() {
        let service = service().await;
        let by_id = service.find("2").await.unwrap();
        let by_slug = service.find(&by_id.slug).await.unwrap();
        assert_eq!(by_id.id, by_slug.id);

        assert!(matches!(
            service.find("no-such-post").await,
            Err(BlogServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_numeric_slug_falls_back_to_slug_lookup() {
        let service = service().await;
        let created = service
            .create(BlogPost {
                status: PostStatus::Published,
                ..post("2024")
            })
            .await
            .unwrap();
        assert_eq!(created.slug, "2024");

        let public = service.read_public("2024").await.unwrap();
        assert_eq!(public.post.id, created.id);
        // an existing id still wins over a slug
        assert_eq!(service.find("1").await.unwrap().id, 1);
    }

    #[tokio::test]
    async fn test_read_public_counts_views_and_renders() {
        let service = service().await;
        let before = service.get(1).await.unwrap().views;

        let public = service.read_public("1").await.unwrap();

        assert_eq!(public.post.views, before + 1);
        assert_eq!(service.get(1).await.unwrap().views, before + 1);
        assert!(public.html.contains("<h"));
        assert!(public.related.len() <= 3);
        assert!(public.related.iter().all(|r| r.id != 1));
    }

    #[tokio::test]
    async fn test_read_public_hides_unpublished() {
        let service = service().await;
        let draft = service.list(None, Some(PostStatus::Draft)).await.unwrap()[0].clone();

        let err = service.read_public(&draft.id.to_string()).await.unwrap_err();
        assert!(matches!(err, BlogServiceError::NotFound(_)));
        assert_eq!(service.get(draft.id).await.unwrap().views, draft.views);
    }

    #[tokio::test]
    async fn test_create_generates_slug_and_stamps() {
        let service = service().await;
        let created = service.create(post("Hello World, Again!")).await.unwrap();

        assert_eq!(created.id, 6);
        assert_eq!(created.slug, "hello-world-again");
        assert!(created.last_modified.is_some());
        assert!(created.publish_date.is_none());
    }

    #[tokio::test]
    async fn test_create_requires_fields() {
        let service = service().await;
        let err = service.create(BlogPost::default()).await.unwrap_err();
        let BlogServiceError::Validation(fields) = err else {
            panic!("expected validation error");
        };
        assert_eq!(fields.get("title"), Some("Title is required"));
        assert!(fields.contains("excerpt"));
        assert!(fields.contains("content"));
    }

    #[tokio::test]
    async fn test_update_rerenders() {
        let service = service().await;
        let first = service.read_public("1").await.unwrap();

        let mut edited = first.post.clone();
        edited.content = "Completely **new** body".to_string();
        service.update(1, edited).await.unwrap();

        let second = service.read_public("1").await.unwrap();
        assert!(second.html.contains("<strong>new</strong>"));
        assert_ne!(first.html, second.html);
    }

    #[tokio::test]
    async fn test_delete_removes_exactly_one() {
        let service = service().await;
        service.delete(3).await.unwrap();

        let ids: Vec<i64> = service.list(None, None).await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 4, 5]);
        assert!(matches!(service.delete(3).await, Err(BlogServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_toggle_featured() {
        let service = service().await;
        let before = service.get(2).await.unwrap().featured;
        let after = service.toggle_featured(2).await.unwrap();
        assert_eq!(after.featured, !before);
    }

    #[tokio::test]
    async fn test_drafts_are_always_draft_status() {
        let service = service().await;

        let mut editing = post("Work in progress");
        editing.status = PostStatus::Published;
        let saved = service.save_draft(DraftKey::New, editing).await.unwrap();
        assert_eq!(saved.status, PostStatus::Draft);

        let loaded = service.get_draft(DraftKey::New).await.unwrap().unwrap();
        assert_eq!(loaded.title, "Work in progress");
        assert_eq!(loaded.status, PostStatus::Draft);

        assert!(service.get_draft(DraftKey::Post(1)).await.unwrap().is_none());
        assert!(service.discard_draft(DraftKey::New).await.unwrap());
        assert!(!service.discard_draft(DraftKey::New).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_clears_post_draft() {
        let service = service().await;
        let existing = service.get(1).await.unwrap();
        service
            .save_draft(DraftKey::Post(1), existing.clone())
            .await
            .unwrap();

        service.update(1, existing).await.unwrap();
        assert!(service.get_draft(DraftKey::Post(1)).await.unwrap().is_none());
    }

    #[test]
    fn test_draft_key_parse() {
        assert_eq!(DraftKey::parse("new"), Some(DraftKey::New));
        assert_eq!(DraftKey::parse("12"), Some(DraftKey::Post(12)));
        assert_eq!(DraftKey::parse("abc"), None);
    }

    #[tokio::test]
    async fn test_summary() {
        let service = service().await;
        let content = "x".repeat(100);

        let summary = service
            .generate_summary("Design Trends", "Design", &content)
            .await
            .unwrap();
        assert_eq!(
            summary,
            "This is an AI-generated summary of the article \"Design Trends\". It discusses key points related to Design and provides insights for readers interested in this topic."
        );

        let err = service
            .generate_summary("Design Trends", "Design", &content[..99])
            .await
            .unwrap_err();
        assert!(matches!(err, BlogServiceError::Validation(f) if f.contains("content")));
    }

    #[tokio::test]
    async fn test_status_counts() {
        let service = service().await;
        let counts = service.status_counts().await.unwrap();
        assert_eq!(counts["published"], 3);
        assert_eq!(counts["draft"], 1);
        assert_eq!(counts["scheduled"], 1);
        assert_eq!(counts["private"], 0);
    }
}
