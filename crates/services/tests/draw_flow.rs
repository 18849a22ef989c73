use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use party_core::model::{Catalog, CategoryKey, ContentItem, ContentPayload, ItemId};
use services::{AppServices, ContentLibrary, DrawError, DrawService, ProgressStore};
use storage::repository::{InMemoryRepository, KeyValueRepository, Storage, StorageError};

fn key(raw: &str) -> CategoryKey {
    CategoryKey::new(raw).unwrap()
}

fn abc() -> Catalog<ContentItem> {
    let items = ["a", "b", "c"]
        .iter()
        .map(|id| {
            ContentItem::new(
                ItemId::new(*id).unwrap(),
                ContentPayload::Prompt {
                    text: format!("prompt {id}"),
                },
            )
        })
        .collect();
    Catalog::new(items).unwrap()
}

fn service_over(kv: Arc<dyn KeyValueRepository>) -> DrawService<ContentItem> {
    let library = ContentLibrary::new()
        .with_catalog(key("penalties"), abc())
        .unwrap()
        .with_catalog(key("confessions"), abc())
        .unwrap();
    DrawService::new(ProgressStore::new(kv), Arc::new(library))
}

async fn next_id(svc: &DrawService<ContentItem>, category: &str) -> String {
    svc.draw_next(&key(category))
        .await
        .unwrap()
        .item
        .id
        .to_string()
}

/// Backend whose every call fails.
struct BrokenRepository;

#[async_trait]
impl KeyValueRepository for BrokenRepository {
    async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Connection("disk gone".into()))
    }
    async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Connection("disk gone".into()))
    }
    async fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Connection("disk gone".into()))
    }
    async fn multi_get(&self, _keys: &[String]) -> Result<Vec<Option<String>>, StorageError> {
        Err(StorageError::Connection("disk gone".into()))
    }
    async fn multi_set(&self, _pairs: &[(String, String)]) -> Result<(), StorageError> {
        Err(StorageError::Connection("disk gone".into()))
    }
    async fn multi_remove(&self, _keys: &[String]) -> Result<(), StorageError> {
        Err(StorageError::Connection("disk gone".into()))
    }
}

/// In-memory backend that counts writes.
#[derive(Default)]
struct CountingRepository {
    inner: InMemoryRepository,
    writes: AtomicUsize,
}

#[async_trait]
impl KeyValueRepository for CountingRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key).await
    }
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value).await
    }
    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.remove(key).await
    }
    async fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<String>>, StorageError> {
        self.inner.multi_get(keys).await
    }
    async fn multi_set(&self, pairs: &[(String, String)]) -> Result<(), StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.multi_set(pairs).await
    }
    async fn multi_remove(&self, keys: &[String]) -> Result<(), StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.multi_remove(keys).await
    }
}

#[tokio::test]
async fn full_cycle_covers_catalog_then_repeats() {
    let svc = service_over(Arc::new(InMemoryRepository::new()));

    let mut first_cycle = Vec::new();
    for _ in 0..3 {
        first_cycle.push(next_id(&svc, "penalties").await);
    }
    assert_eq!(first_cycle, vec!["a", "b", "c"]);

    let wrapped = svc.draw_next(&key("penalties")).await.unwrap();
    assert_eq!(wrapped.item.id.as_str(), "a");
    assert!(wrapped.did_rollover);

    for expected in ["b", "c"] {
        let draw = svc.draw_next(&key("penalties")).await.unwrap();
        assert_eq!(draw.item.id.as_str(), expected);
        assert!(!draw.did_rollover);
    }
}

#[tokio::test]
async fn restart_resumes_where_it_stopped() {
    let repo = InMemoryRepository::new();
    let svc = service_over(Arc::new(repo.clone()));
    assert_eq!(next_id(&svc, "penalties").await, "a");
    assert_eq!(next_id(&svc, "penalties").await, "b");
    drop(svc);

    let restarted = service_over(Arc::new(repo));
    assert_eq!(next_id(&restarted, "penalties").await, "c");
}

#[tokio::test]
async fn restart_resumes_over_sqlite() {
    let url = "sqlite:file:memdb_draw_restart?mode=memory&cache=shared";
    let library_json = r#"{"categories": [{"key": "charades_words", "items": [
        {"id": "w_1", "kind": "word", "text": "Lighthouse"},
        {"id": "w_2", "kind": "word", "text": "Penguin"},
        {"id": "w_3", "kind": "word", "text": "Volcano"}
    ]}]}"#;
    let category = key("charades_words");

    let first_storage = Storage::sqlite(url).await.unwrap();
    let first = AppServices::from_json(&first_storage, library_json).unwrap();
    let draw = first.draws().draw_next(&category).await.unwrap();
    assert_eq!(draw.item.id.as_str(), "w_1");

    let second_storage = Storage::sqlite(url).await.unwrap();
    let second = AppServices::from_json(&second_storage, library_json).unwrap();
    let draw = second.draws().draw_next(&category).await.unwrap();
    assert_eq!(draw.item.id.as_str(), "w_2");
    assert_eq!(draw.item.text(), "Penguin");
    drop(first_storage);
}

#[tokio::test]
async fn reset_mid_cycle_starts_over() {
    let svc = service_over(Arc::new(InMemoryRepository::new()));
    next_id(&svc, "penalties").await;
    next_id(&svc, "penalties").await;

    svc.reset_category(&key("penalties")).await;
    assert_eq!(next_id(&svc, "penalties").await, "a");
}

#[tokio::test]
async fn reset_all_categories_clears_each_cursor() {
    let svc = service_over(Arc::new(InMemoryRepository::new()));
    next_id(&svc, "penalties").await;
    next_id(&svc, "confessions").await;
    next_id(&svc, "confessions").await;

    svc.reset_all_categories(&[key("penalties"), key("confessions")])
        .await;
    assert_eq!(next_id(&svc, "penalties").await, "a");
    assert_eq!(next_id(&svc, "confessions").await, "a");
}

#[tokio::test]
async fn advancing_one_category_leaves_others_alone() {
    let repo = InMemoryRepository::new();
    let svc = service_over(Arc::new(repo.clone()));
    next_id(&svc, "confessions").await;

    for _ in 0..5 {
        next_id(&svc, "penalties").await;
    }
    assert_eq!(
        repo.get("progress_confessions").await.unwrap().as_deref(),
        Some("1")
    );
    assert_eq!(next_id(&svc, "confessions").await, "b");
}

#[tokio::test]
async fn new_game_resets_builtins_absent_from_custom_catalog() {
    let repo = InMemoryRepository::new();
    let full = service_over(Arc::new(repo.clone()));
    next_id(&full, "confessions").await;
    next_id(&full, "confessions").await;

    let penalties_only = ContentLibrary::new()
        .with_catalog(key("penalties"), abc())
        .unwrap();
    let custom = DrawService::new(
        ProgressStore::new(Arc::new(repo.clone())),
        Arc::new(penalties_only),
    );
    custom.new_game().await;

    assert_eq!(
        repo.get("progress_confessions").await.unwrap().as_deref(),
        Some("0")
    );
    assert_eq!(next_id(&full, "confessions").await, "a");
}

#[tokio::test]
async fn tampered_cursors_are_clamped() {
    let repo = InMemoryRepository::new();
    let svc = service_over(Arc::new(repo.clone()));

    repo.set("progress_penalties", "-5").await.unwrap();
    let draw = svc.draw_next(&key("penalties")).await.unwrap();
    assert_eq!(draw.item.id.as_str(), "a");
    assert!(!draw.did_rollover);
    assert_eq!(
        repo.get("progress_penalties").await.unwrap().as_deref(),
        Some("1")
    );

    repo.set("progress_confessions", &(3 + 1000).to_string())
        .await
        .unwrap();
    let draw = svc.draw_next(&key("confessions")).await.unwrap();
    assert_eq!(draw.item.id.as_str(), "a");
    assert!(draw.did_rollover);
    assert_eq!(next_id(&svc, "confessions").await, "b");
}

#[tokio::test]
async fn garbage_cursor_reads_as_fresh_start() {
    let repo = InMemoryRepository::new();
    let svc = service_over(Arc::new(repo.clone()));
    repo.set("progress_penalties", "three").await.unwrap();

    let draw = svc.draw_next(&key("penalties")).await.unwrap();
    assert_eq!(draw.item.id.as_str(), "a");
    assert!(!draw.did_rollover);
}

#[tokio::test]
async fn empty_catalog_raises_and_writes_nothing() {
    let repo = Arc::new(CountingRepository::default());
    let library = ContentLibrary::new()
        .with_catalog(key("penalties"), Catalog::<ContentItem>::new(Vec::new()).unwrap())
        .unwrap();
    let svc: DrawService<ContentItem> =
        DrawService::new(ProgressStore::new(repo.clone()), Arc::new(library));

    let err = svc.draw_next(&key("penalties")).await.unwrap_err();
    assert_eq!(err, DrawError::EmptyCatalog(key("penalties")));
    assert_eq!(repo.writes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn each_draw_writes_exactly_once() {
    let repo = Arc::new(CountingRepository::default());
    let svc = service_over(repo.clone());

    for _ in 0..4 {
        next_id(&svc, "penalties").await;
    }
    assert_eq!(repo.writes.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn broken_storage_never_blocks_play() {
    let svc = service_over(Arc::new(BrokenRepository));

    // Every read fails open to 0, so play continues from the first item.
    assert_eq!(next_id(&svc, "penalties").await, "a");
    assert_eq!(next_id(&svc, "penalties").await, "a");

    svc.reset_category(&key("penalties")).await;
    svc.new_game().await;
    svc.forget_all().await;

    let progress = svc.progress_all().await;
    assert!(progress.iter().all(|p| p.cursor == 0 && p.remaining == 3));
}
