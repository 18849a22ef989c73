mod catalog;
mod category;
pub mod content;
mod ids;

pub use catalog::{Catalog, CatalogEntry, CatalogError};
pub use category::Category;
pub use content::{ContentError, ContentItem, ContentPayload, RuleKind};
pub use ids::{CategoryKey, ItemId, KeyError};
