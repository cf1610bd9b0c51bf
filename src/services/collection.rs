//! Generic content collection service
//!
//! Every content type (portfolio, applications, training, ...) is a JSON array
//! snapshot under its own key. Until the first save the seed records are
//! served. Read-modify-write cycles are serialized with a mutex so concurrent
//! requests cannot lose each other's updates.

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::models::{
    Achievement, Application, FieldErrors, LiteratureItem, Message, PortfolioItem, PressMention,
    Record, Resource, Training,
};
use crate::services::store::{Store, StoreError};

/// Error types for collection operations
#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    #[error("{label} not found: {id}")]
    NotFound { label: &'static str, id: i64 },

    #[error("Validation error: {0}")]
    Validation(FieldErrors),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// CRUD over one collection snapshot
pub struct CollectionService<T: Record> {
    store: Arc<Store>,
    write_lock: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Record> CollectionService<T> {
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
            _marker: PhantomData,
        }
    }

    /// All records, seeded when nothing was saved yet
    pub async fn all(&self) -> Result<Vec<T>, CollectionError> {
        Ok(self
            .store
            .load::<Vec<T>>(T::STORAGE_KEY)
            .await?
            .unwrap_or_else(T::seed))
    }

    /// Records matching `search` (case-insensitive, any search field)
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<T>, CollectionError> {
        let records = self.all().await?;
        Ok(match search {
            Some(query) if !query.trim().is_empty() => {
                records.into_iter().filter(|r| r.matches(query)).collect()
            }
            _ => records,
        })
    }

    /// Records visible on the public site
    pub async fn list_public(&self, search: Option<&str>) -> Result<Vec<T>, CollectionError> {
        Ok(self
            .list(search)
            .await?
            .into_iter()
            .filter(Record::is_public)
            .collect())
    }

    pub async fn get(&self, id: i64) -> Result<T, CollectionError> {
        self.all()
            .await?
            .into_iter()
            .find(|r| r.id() == id)
            .ok_or(CollectionError::NotFound { label: T::LABEL, id })
    }

    pub async fn count(&self) -> Result<usize, CollectionError> {
        Ok(self.all().await?.len())
    }

    /// Validate and append a record. The id is assigned as max id + 1.
    pub async fn create(&self, mut record: T) -> Result<T, CollectionError> {
        record.validate().map_err(CollectionError::Validation)?;

        let _guard = self.write_lock.lock().await;
        let mut records = self.all().await?;

        let next_id = records.iter().map(Record::id).max().unwrap_or(0) + 1;
        record.set_id(next_id);
        record.touch();
        records.push(record.clone());

        self.store.save(T::STORAGE_KEY, &records).await?;
        tracing::debug!("Created {} {}", T::LABEL, next_id);
        Ok(record)
    }

    /// Validate and replace the record with `id`
    pub async fn update(&self, id: i64, mut record: T) -> Result<T, CollectionError> {
        record.validate().map_err(CollectionError::Validation)?;

        let _guard = self.write_lock.lock().await;
        let mut records = self.all().await?;

        let slot = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or(CollectionError::NotFound { label: T::LABEL, id })?;
        record.set_id(id);
        record.touch();
        *slot = record.clone();

        self.store.save(T::STORAGE_KEY, &records).await?;
        Ok(record)
    }

    /// Apply `change` to the record with `id` and save. No validation.
    pub async fn modify<F>(&self, id: i64, change: F) -> Result<T, CollectionError>
    where
        F: FnOnce(&mut T),
    {
        let _guard = self.write_lock.lock().await;
        let mut records = self.all().await?;

        let slot = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or(CollectionError::NotFound { label: T::LABEL, id })?;
        change(slot);
        let updated = slot.clone();

        self.store.save(T::STORAGE_KEY, &records).await?;
        Ok(updated)
    }

    /// Remove exactly the record with `id`. Unknown ids change nothing.
    pub async fn delete(&self, id: i64) -> Result<(), CollectionError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.all().await?;

        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Err(CollectionError::NotFound { label: T::LABEL, id });
        }

        self.store.save(T::STORAGE_KEY, &records).await?;
        tracing::debug!("Deleted {} {}", T::LABEL, id);
        Ok(())
    }
}

impl CollectionService<Message> {
    pub async fn mark_read(&self, id: i64) -> Result<Message, CollectionError> {
        self.modify(id, |m| m.read = true).await
    }

    pub async fn unread_count(&self) -> Result<usize, CollectionError> {
        Ok(self.all().await?.iter().filter(|m| !m.read).count())
    }
}

impl CollectionService<Resource> {
    /// Count a download of a downloadable resource
    pub async fn record_download(&self, id: i64) -> Result<Resource, CollectionError> {
        let resource = self.get(id).await?;
        if !resource.downloadable {
            let mut errors = FieldErrors::new();
            errors.add("downloadable", "This resource is not available for download");
            return Err(CollectionError::Validation(errors));
        }
        self.modify(id, |r| r.downloads += 1).await
    }
}

/// Every generic content collection of the site
pub struct Collections {
    pub portfolio: Arc<CollectionService<PortfolioItem>>,
    pub applications: Arc<CollectionService<Application>>,
    pub trainings: Arc<CollectionService<Training>>,
    pub achievements: Arc<CollectionService<Achievement>>,
    pub literature: Arc<CollectionService<LiteratureItem>>,
    pub press: Arc<CollectionService<PressMention>>,
    pub resources: Arc<CollectionService<Resource>>,
    pub messages: Arc<CollectionService<Message>>,
}

impl Collections {
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            portfolio: Arc::new(CollectionService::new(store.clone())),
            applications: Arc::new(CollectionService::new(store.clone())),
            trainings: Arc::new(CollectionService::new(store.clone())),
            achievements: Arc::new(CollectionService::new(store.clone())),
            literature: Arc::new(CollectionService::new(store.clone())),
            press: Arc::new(CollectionService::new(store.clone())),
            resources: Arc::new(CollectionService::new(store.clone())),
            messages: Arc::new(CollectionService::new(store)),
        }
    }

    /// Item count per collection, keyed by storage key
    pub async fn counts(&self) -> Result<BTreeMap<&'static str, usize>, CollectionError> {
        let mut counts = BTreeMap::new();
        counts.insert(PortfolioItem::STORAGE_KEY, self.portfolio.count().await?);
        counts.insert(Application::STORAGE_KEY, self.applications.count().await?);
        counts.insert(Training::STORAGE_KEY, self.trainings.count().await?);
        counts.insert(Achievement::STORAGE_KEY, self.achievements.count().await?);
        counts.insert(LiteratureItem::STORAGE_KEY, self.literature.count().await?);
        counts.insert(PressMention::STORAGE_KEY, self.press.count().await?);
        counts.insert(Resource::STORAGE_KEY, self.resources.count().await?);
        counts.insert(Message::STORAGE_KEY, self.messages.count().await?);
        Ok(counts)
    }
}
