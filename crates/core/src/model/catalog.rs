use std::collections::HashSet;

use thiserror::Error;

use super::ids::ItemId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("duplicate item id in catalog: {0}")]
    DuplicateItemId(ItemId),
}

/// Anything that can be served from a catalog.
///
/// Draw logic only ever looks at the id; the rest of the record is opaque.
pub trait CatalogEntry {
    fn id(&self) -> &ItemId;
}

/// Immutable, ordered list of items for one category.
///
/// Order is fixed at construction. An empty catalog is representable so that
/// content-authoring mistakes surface at draw time as an explicit error
/// instead of at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog<T> {
    items: Vec<T>,
}

impl<T: CatalogEntry> Catalog<T> {
    /// Build a catalog, preserving the given order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateItemId` if two items share an id.
    pub fn new(items: Vec<T>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id()) {
                return Err(CatalogError::DuplicateItemId(item.id().clone()));
            }
        }
        Ok(Self { items })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }
}
