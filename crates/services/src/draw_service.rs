use std::num::NonZeroUsize;
use std::sync::Arc;

use party_core::cursor::{self, plan_draw};
use party_core::model::{Catalog, CatalogEntry, Category, CategoryKey};

use crate::content_library::ContentLibrary;
use crate::error::DrawError;
use crate::progress_store::ProgressStore;

//
// ─── RESULTS ───────────────────────────────────────────────────────────────────
//

/// One served item.
#[derive(Debug, Clone, PartialEq)]
pub struct Draw<T> {
    pub category: CategoryKey,
    pub item: T,
    /// Catalog position of `item`.
    pub index: usize,
    /// The previous cycle was exhausted and this draw begins a new one.
    ///
    /// Not set after an explicit reset; that is a fresh start, not a rollover.
    pub did_rollover: bool,
}

/// Snapshot of a category's position in its current cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryProgress {
    pub category: CategoryKey,
    /// Raw cursor as stored (may be out of range if tampered with).
    pub cursor: i64,
    pub total: usize,
    /// Items left before the next rollover.
    pub remaining: usize,
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Serves catalog items in order, one cycle at a time, resuming from the
/// persisted cursor.
///
/// Only one in-flight draw per category is supported. Two concurrent draws
/// of the same category may read the same cursor and serve the same item;
/// callers await each draw before requesting the next one. Different
/// categories are independent.
#[derive(Clone)]
pub struct DrawService<T> {
    progress: ProgressStore,
    library: Arc<ContentLibrary<T>>,
}

impl<T: CatalogEntry + Clone> DrawService<T> {
    #[must_use]
    pub fn new(progress: ProgressStore, library: Arc<ContentLibrary<T>>) -> Self {
        Self { progress, library }
    }

    /// Draw the next item of a registered category.
    ///
    /// # Errors
    ///
    /// Returns `DrawError::UnknownCategory` if no catalog is registered for
    /// `category`, or `DrawError::EmptyCatalog` if it has no items.
    pub async fn draw_next(&self, category: &CategoryKey) -> Result<Draw<T>, DrawError> {
        let catalog = self
            .library
            .get(category)
            .ok_or_else(|| DrawError::UnknownCategory(category.clone()))?;
        self.draw_from(category, catalog).await
    }

    /// Draw the next item of `category` from a caller-supplied catalog.
    ///
    /// The cursor write is awaited before returning, so consecutive draws
    /// from one caller never reorder.
    ///
    /// # Errors
    ///
    /// Returns `DrawError::EmptyCatalog` if `catalog` has no items. No
    /// storage is touched in that case.
    pub async fn draw_from(
        &self,
        category: &CategoryKey,
        catalog: &Catalog<T>,
    ) -> Result<Draw<T>, DrawError> {
        let Some(len) = NonZeroUsize::new(catalog.len()) else {
            return Err(DrawError::EmptyCatalog(category.clone()));
        };

        let stored = self.progress.get(category).await;
        let plan = plan_draw(stored, len);
        let item = catalog.items()[plan.index].clone();

        if plan.was_corrupted {
            tracing::warn!(category = %category, stored, "negative cursor discarded, restarting cycle");
        } else if plan.rolled_over {
            tracing::info!(category = %category, total = catalog.len(), "catalog exhausted, starting new cycle");
        }

        self.progress.set(category, plan.next_cursor).await;

        tracing::debug!(category = %category, index = plan.index, item = %item.id(), "drew item");
        Ok(Draw {
            category: category.clone(),
            item,
            index: plan.index,
            did_rollover: plan.rolled_over,
        })
    }

    /// Make the next draw of `category` start again at the first item.
    pub async fn reset_category(&self, category: &CategoryKey) {
        if self.progress.reset(category).await {
            tracing::info!(category = %category, "progress reset");
        }
    }

    /// Reset several categories in one batch.
    pub async fn reset_all_categories(&self, categories: &[CategoryKey]) {
        if self.progress.reset_all(categories).await {
            tracing::info!(count = categories.len(), "progress reset for categories");
        }
    }

    /// "New game": reset every built-in category and every category known
    /// to the library.
    pub async fn new_game(&self) {
        self.reset_all_categories(&self.game_categories()).await;
    }

    /// Delete the stored record for `category`.
    pub async fn forget_category(&self, category: &CategoryKey) {
        self.progress.remove(category).await;
    }

    /// Delete stored records for every built-in category and every category
    /// known to the library.
    pub async fn forget_all(&self) {
        self.progress.remove_all(&self.game_categories()).await;
    }

    /// Library categories in registration order, then any built-in category
    /// the library does not carry.
    fn game_categories(&self) -> Vec<CategoryKey> {
        let mut categories = self.library.categories();
        for builtin in Category::all() {
            let key = builtin.key();
            if !categories.contains(&key) {
                categories.push(key);
            }
        }
        categories
    }

    /// Position of a registered category in its current cycle.
    ///
    /// # Errors
    ///
    /// Returns `DrawError::UnknownCategory` if no catalog is registered.
    pub async fn progress(&self, category: &CategoryKey) -> Result<CategoryProgress, DrawError> {
        let catalog = self
            .library
            .get(category)
            .ok_or_else(|| DrawError::UnknownCategory(category.clone()))?;
        let cursor = self.progress.get(category).await;
        Ok(snapshot(category.clone(), cursor, catalog.len()))
    }

    /// Progress of every registered category, in library order.
    pub async fn progress_all(&self) -> Vec<CategoryProgress> {
        let categories = self.library.categories();
        self.progress
            .get_all(&categories)
            .await
            .into_iter()
            .map(|(category, cursor)| {
                let total = self.library.get(&category).map_or(0, |c| c.len());
                snapshot(category, cursor, total)
            })
            .collect()
    }
}

fn snapshot(category: CategoryKey, cursor: i64, total: usize) -> CategoryProgress {
    CategoryProgress {
        category,
        cursor,
        total,
        remaining: cursor::remaining(cursor, total),
    }
}
