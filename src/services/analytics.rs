//! Analytics and dashboard
//!
//! Visitor statistics are a mock series seeded on first read and kept under
//! `analytics`. Public page views are counted per page name. The dashboard
//! summary aggregates counts from the blog and the content collections.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::models::{tracked_page, FieldErrors, VisitorStats};
use crate::services::blog::{BlogService, BlogServiceError};
use crate::services::collection::{CollectionError, Collections};
use crate::services::store::{keys, Store, StoreError};

/// Analytics service errors
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    #[error("Validation error: {0}")]
    Validation(FieldErrors),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Blog(#[from] BlogServiceError),

    #[error(transparent)]
    Collection(#[from] CollectionError),
}

/// Admin dashboard numbers
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_posts: usize,
    /// Post count per status
    pub posts: BTreeMap<String, usize>,
    pub total_post_views: u64,
    pub unread_messages: usize,
    /// Item count per collection key
    pub collections: BTreeMap<&'static str, usize>,
    pub weekly_visitors: u64,
    pub total_page_views: u64,
    pub stats: VisitorStats,
}

pub struct AnalyticsService {
    store: Arc<Store>,
    write_lock: Mutex<()>,
}

impl AnalyticsService {
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub async fn stats(&self) -> Result<VisitorStats, AnalyticsError> {
        Ok(self.store.load_or_default(keys::ANALYTICS).await?)
    }

    /// Count one view of a tracked page. Returns the new view count.
    pub async fn record_page_view(&self, page: &str) -> Result<u64, AnalyticsError> {
        let Some(page) = tracked_page(page) else {
            let mut errors = FieldErrors::new();
            errors.add("page", "Unknown page");
            return Err(AnalyticsError::Validation(errors));
        };

        let _guard = self.write_lock.lock().await;
        let mut stats = self.stats().await?;
        let views = stats.record_page_view(page);
        self.store.save(keys::ANALYTICS, &stats).await?;

        tracing::debug!("Page view: {} ({})", page, views);
        Ok(views)
    }

    pub async fn dashboard(
        &self,
        blog: &BlogService,
        collections: &Collections,
    ) -> Result<DashboardSummary, AnalyticsError> {
        let posts = blog.status_counts().await?;
        let stats = self.stats().await?;

        Ok(DashboardSummary {
            total_posts: posts.values().sum(),
            posts,
            total_post_views: blog.total_views().await?,
            unread_messages: collections.messages.unread_count().await?,
            collections: collections.counts().await?,
            weekly_visitors: stats.weekly_visitors(),
            total_page_views: stats.total_page_views(),
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::services::store::test_store;
    use std::time::Duration;

    #[tokio::test]
    async fn test_seeded_stats() {
        let service = AnalyticsService::new(test_store().await);
        let stats = service.stats().await.unwrap();
        assert_eq!(stats.daily.len(), 7);
        assert_eq!(stats.weekly_visitors(), 4070);
    }

    #[tokio::test]
    async fn test_record_page_view_persists() {
        let store = test_store().await;
        let service = AnalyticsService::new(store.clone());

        assert_eq!(service.record_page_view("Blog").await.unwrap(), 1541);
        assert_eq!(service.record_page_view("Resources").await.unwrap(), 1);
        assert_eq!(service.record_page_view(" Resources ").await.unwrap(), 2);

        let reloaded = AnalyticsService::new(store);
        let stats = reloaded.stats().await.unwrap();
        assert!(stats.pages.iter().any(|p| p.name == "Resources" && p.views == 2));
    }

    #[tokio::test]
    async fn test_record_page_view_rejects_bad_names() {
        let service = AnalyticsService::new(test_store().await);
        assert!(matches!(
            service.record_page_view("   ").await,
            Err(AnalyticsError::Validation(_))
        ));
        assert!(matches!(
            service.record_page_view(&"p".repeat(101)).await,
            Err(AnalyticsError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_pages_do_not_grow_stats() {
        let service = AnalyticsService::new(test_store().await);
        let before = service.stats().await.unwrap().pages.len();

        for i in 0..20 {
            let err = service.record_page_view(&format!("junk-{}", i)).await.unwrap_err();
            match err {
                AnalyticsError::Validation(fields) => {
                    assert_eq!(fields.get("page"), Some("Unknown page"))
                }
                other => panic!("unexpected error: {}", other),
            }
        }

        assert_eq!(service.stats().await.unwrap().pages.len(), before);
        assert_eq!(service.record_page_view("blog").await.unwrap(), 1541);
    }

    #[tokio::test]
    async fn test_concurrent_page_views() {
        let service = Arc::new(AnalyticsService::new(test_store().await));
        let mut handles = Vec::new();
        for _ in 0..10 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service.record_page_view("Press").await.unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let stats = service.stats().await.unwrap();
        let press = stats.pages.iter().find(|p| p.name == "Press").unwrap();
        assert_eq!(press.views, 10);
    }

    #[tokio::test]
    async fn test_dashboard() {
        let store = test_store().await;
        let service = AnalyticsService::new(store.clone());
        let blog = BlogService::new(store.clone(), Arc::new(MemoryCache::new()), Duration::ZERO);
        let collections = Collections::new(store);

        let summary = service.dashboard(&blog, &collections).await.unwrap();
        assert_eq!(summary.total_posts, 5);
        assert_eq!(summary.posts["published"], 3);
        assert_eq!(summary.total_post_views, 452 + 321 + 287);
        assert_eq!(summary.unread_messages, 2);
        assert_eq!(summary.collections["messages"], 5);
        assert_eq!(summary.weekly_visitors, 4070);
    }
}
