//! Shared error types for the services crate.

use thiserror::Error;

use party_core::model::{CatalogError, CategoryKey, ContentError};
use storage::sqlite::SqliteInitError;

/// Errors emitted by `DrawService`.
///
/// Storage trouble never shows up here; it is logged and absorbed by
/// `ProgressStore`. Only configuration mistakes are surfaced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DrawError {
    #[error("catalog for {0} is empty")]
    EmptyCatalog(CategoryKey),
    #[error("no catalog registered for {0}")]
    UnknownCategory(CategoryKey),
}

/// Errors emitted while assembling a `ContentLibrary`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentLibraryError {
    #[error("category {0} registered twice")]
    DuplicateCategory(CategoryKey),
    #[error("invalid catalog for {category}: {source}")]
    Catalog {
        category: CategoryKey,
        #[source]
        source: CatalogError,
    },
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Content(#[from] ContentLibraryError),
}
