use std::sync::Arc;

use party_core::model::ContentItem;
use storage::repository::Storage;

use crate::content_library::ContentLibrary;
use crate::draw_service::DrawService;
use crate::error::AppServicesError;
use crate::progress_store::ProgressStore;

/// Assembles app-facing services over a storage backend.
#[derive(Clone)]
pub struct AppServices {
    draws: Arc<DrawService<ContentItem>>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        library: ContentLibrary<ContentItem>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, library))
    }

    /// Build services from a library document and an existing storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Content` if the library JSON is invalid.
    pub fn from_json(storage: &Storage, library_json: &str) -> Result<Self, AppServicesError> {
        let library = ContentLibrary::from_json(library_json)?;
        Ok(Self::from_storage(storage, library))
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, library: ContentLibrary<ContentItem>) -> Self {
        let progress = ProgressStore::new(Arc::clone(&storage.kv));
        let draws = Arc::new(DrawService::new(progress, Arc::new(library)));
        Self { draws }
    }

    #[must_use]
    pub fn draws(&self) -> Arc<DrawService<ContentItem>> {
        Arc::clone(&self.draws)
    }
}
