use std::sync::Arc;

use party_core::model::CategoryKey;
use storage::repository::KeyValueRepository;

/// Prefix that namespaces progress records inside the shared key-value store.
pub const PROGRESS_KEY_PREFIX: &str = "progress_";

/// Storage key holding the cursor for `category`.
#[must_use]
pub fn progress_key(category: &CategoryKey) -> String {
    format!("{PROGRESS_KEY_PREFIX}{category}")
}

/// Durable category → cursor mapping with a fail-open policy.
///
/// Reads that fail (or hit a value that is not a decimal integer) yield 0.
/// Writes that fail are logged and dropped; the returned flag only reports
/// whether the backend accepted the write.
#[derive(Clone)]
pub struct ProgressStore {
    kv: Arc<dyn KeyValueRepository>,
}

impl ProgressStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueRepository>) -> Self {
        Self { kv }
    }

    /// Stored cursor for `category`, or 0 when absent or unreadable.
    ///
    /// The value is returned as read; callers clamp it against their catalog.
    pub async fn get(&self, category: &CategoryKey) -> i64 {
        let key = progress_key(category);
        match self.kv.get(&key).await {
            Ok(Some(raw)) => parse_cursor(&key, &raw),
            Ok(None) => 0,
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "progress read failed, using 0");
                0
            }
        }
    }

    /// Persist `value` as the cursor for `category`.
    pub async fn set(&self, category: &CategoryKey, value: u64) -> bool {
        let key = progress_key(category);
        match self.kv.set(&key, &value.to_string()).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(key = %key, value, error = %err, "progress write dropped");
                false
            }
        }
    }

    pub async fn reset(&self, category: &CategoryKey) -> bool {
        self.set(category, 0).await
    }

    /// Delete the record entirely; a later `get` returns 0.
    pub async fn remove(&self, category: &CategoryKey) -> bool {
        let key = progress_key(category);
        match self.kv.remove(&key).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "progress removal dropped");
                false
            }
        }
    }

    /// Cursors for several categories, positionally aligned with the input.
    pub async fn get_all(&self, categories: &[CategoryKey]) -> Vec<(CategoryKey, i64)> {
        let keys: Vec<String> = categories.iter().map(progress_key).collect();
        let values = match self.kv.multi_get(&keys).await {
            Ok(values) if values.len() == keys.len() => values,
            Ok(values) => {
                tracing::warn!(
                    expected = keys.len(),
                    got = values.len(),
                    "progress batch read misaligned, using 0"
                );
                vec![None; keys.len()]
            }
            Err(err) => {
                tracing::warn!(error = %err, "progress batch read failed, using 0");
                vec![None; keys.len()]
            }
        };

        categories
            .iter()
            .zip(keys.iter().zip(values))
            .map(|(category, (key, raw))| {
                let cursor = raw.map_or(0, |raw| parse_cursor(key, &raw));
                (category.clone(), cursor)
            })
            .collect()
    }

    pub async fn reset_all(&self, categories: &[CategoryKey]) -> bool {
        let pairs: Vec<(String, String)> = categories
            .iter()
            .map(|category| (progress_key(category), "0".to_string()))
            .collect();
        match self.kv.multi_set(&pairs).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(count = pairs.len(), error = %err, "progress batch reset dropped");
                false
            }
        }
    }

    pub async fn remove_all(&self, categories: &[CategoryKey]) -> bool {
        let keys: Vec<String> = categories.iter().map(progress_key).collect();
        match self.kv.multi_remove(&keys).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(count = keys.len(), error = %err, "progress batch removal dropped");
                false
            }
        }
    }
}

fn parse_cursor(key: &str, raw: &str) -> i64 {
    raw.trim().parse::<i64>().unwrap_or_else(|_| {
        tracing::warn!(key = %key, raw = %raw, "unparsable progress value, using 0");
        0
    })
}
