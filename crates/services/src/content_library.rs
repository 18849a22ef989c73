use std::sync::Arc;

use serde::Deserialize;

use party_core::model::{Catalog, CatalogEntry, CategoryKey, ContentItem};

use crate::error::ContentLibraryError;

/// Registry of catalogs, one per category, in registration order.
///
/// Each category is a configuration entry; the draw logic is shared.
#[derive(Debug, Clone)]
pub struct ContentLibrary<T> {
    entries: Vec<(CategoryKey, Arc<Catalog<T>>)>,
}

impl<T: CatalogEntry> ContentLibrary<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a catalog for `category`.
    ///
    /// # Errors
    ///
    /// Returns `ContentLibraryError::DuplicateCategory` if the key is taken.
    pub fn register(
        &mut self,
        category: CategoryKey,
        catalog: Catalog<T>,
    ) -> Result<(), ContentLibraryError> {
        if self.get(&category).is_some() {
            return Err(ContentLibraryError::DuplicateCategory(category));
        }
        if catalog.is_empty() {
            tracing::warn!(category = %category, "registered an empty catalog; draws will fail");
        }
        self.entries.push((category, Arc::new(catalog)));
        Ok(())
    }

    /// Builder-style `register`.
    ///
    /// # Errors
    ///
    /// Returns `ContentLibraryError::DuplicateCategory` if the key is taken.
    pub fn with_catalog(
        mut self,
        category: CategoryKey,
        catalog: Catalog<T>,
    ) -> Result<Self, ContentLibraryError> {
        self.register(category, catalog)?;
        Ok(self)
    }

    #[must_use]
    pub fn get(&self, category: &CategoryKey) -> Option<&Arc<Catalog<T>>> {
        self.entries
            .iter()
            .find(|(key, _)| key == category)
            .map(|(_, catalog)| catalog)
    }

    #[must_use]
    pub fn categories(&self) -> Vec<CategoryKey> {
        self.entries.iter().map(|(key, _)| key.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CategoryKey, &Arc<Catalog<T>>)> {
        self.entries.iter().map(|(key, catalog)| (key, catalog))
    }
}

impl<T: CatalogEntry> Default for ContentLibrary<T> {
    fn default() -> Self {
        Self::new()
    }
}

//
// ─── JSON LOADING ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
struct LibraryFile {
    categories: Vec<CategoryFile>,
}

#[derive(Debug, Deserialize)]
struct CategoryFile {
    key: CategoryKey,
    items: Vec<ContentItem>,
}

impl ContentLibrary<ContentItem> {
    /// Parse a library document of the form
    /// `{"categories": [{"key": "...", "items": [...]}]}`.
    ///
    /// Every item is validated and catalogs keep file order.
    ///
    /// # Errors
    ///
    /// Returns `ContentLibraryError` for malformed JSON, invalid items,
    /// duplicate item ids within a category, or duplicate categories.
    pub fn from_json(raw: &str) -> Result<Self, ContentLibraryError> {
        let file: LibraryFile = serde_json::from_str(raw)?;
        let mut library = Self::new();

        for CategoryFile { key, items } in file.categories {
            let items = items
                .into_iter()
                .map(ContentItem::validate)
                .collect::<Result<Vec<_>, _>>()?;
            let catalog = Catalog::new(items).map_err(|source| ContentLibraryError::Catalog {
                category: key.clone(),
                source,
            })?;
            library.register(key, catalog)?;
        }

        Ok(library)
    }
}
