#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use newsdesk::application::articles::ArticleService;
use newsdesk::application::repos::{
    ArticlesRepo, ArticlesWriteRepo, CreateArticleParams, RepoError, UpdateArticleParams,
};
use newsdesk::cache::{CacheConfig, CacheError, CacheStore};
use newsdesk::domain::entities::ArticleRecord;

/// Store fake that counts reads and can be told to fail or stall.
#[derive(Default)]
pub struct InMemoryArticles {
    rows: Mutex<BTreeMap<i64, ArticleRecord>>,
    next_id: Mutex<i64>,
    list_calls: AtomicUsize,
    find_calls: AtomicUsize,
    failing: AtomicBool,
    stall: Mutex<Option<Duration>>,
}

impl InMemoryArticles {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn stall_for(&self, delay: Duration) {
        *self.stall.lock().await = Some(delay);
    }

    async fn gate(&self) -> Result<(), RepoError> {
        let stall = *self.stall.lock().await;
        if let Some(delay) = stall {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepoError::Persistence("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ArticlesRepo for InMemoryArticles {
    async fn list_articles(&self) -> Result<Vec<ArticleRecord>, RepoError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.gate().await?;
        Ok(self.rows.lock().await.values().cloned().collect())
    }

    async fn find_article(&self, id: i64) -> Result<Option<ArticleRecord>, RepoError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        self.gate().await?;
        Ok(self.rows.lock().await.get(&id).cloned())
    }
}

#[async_trait]
impl ArticlesWriteRepo for InMemoryArticles {
    async fn create_article(
        &self,
        params: CreateArticleParams,
    ) -> Result<ArticleRecord, RepoError> {
        self.gate().await?;
        let mut next_id = self.next_id.lock().await;
        *next_id += 1;
        let now = OffsetDateTime::now_utc();
        let record = ArticleRecord {
            id: *next_id,
            title: params.title,
            content: params.content,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().await.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_article(
        &self,
        params: UpdateArticleParams,
    ) -> Result<ArticleRecord, RepoError> {
        self.gate().await?;
        let mut rows = self.rows.lock().await;
        let row = rows.get_mut(&params.id).ok_or(RepoError::NotFound)?;
        row.title = params.title;
        row.content = params.content;
        row.updated_at = OffsetDateTime::now_utc().max(row.created_at);
        Ok(row.clone())
    }

    async fn delete_article(&self, id: i64) -> Result<(), RepoError> {
        self.gate().await?;
        self.rows
            .lock()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

/// Cache that rejects every call.
pub struct FailingCache;

#[async_trait]
impl CacheStore for FailingCache {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Err(CacheError::unavailable("connection reset by peer"))
    }

    async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::unavailable("connection reset by peer"))
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::unavailable("connection reset by peer"))
    }

    fn backend(&self) -> &'static str {
        "failing"
    }
}

/// Cache that never answers.
pub struct StalledCache;

#[async_trait]
impl CacheStore for StalledCache {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        std::future::pending().await
    }

    async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<(), CacheError> {
        std::future::pending().await
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        std::future::pending().await
    }

    fn backend(&self) -> &'static str {
        "stalled"
    }
}

pub fn service(store: &Arc<InMemoryArticles>, cache: Arc<dyn CacheStore>) -> ArticleService {
    service_with_config(store, cache, CacheConfig::default())
}

pub fn service_with_config(
    store: &Arc<InMemoryArticles>,
    cache: Arc<dyn CacheStore>,
    config: CacheConfig,
) -> ArticleService {
    let reader: Arc<dyn ArticlesRepo> = store.clone();
    let writer: Arc<dyn ArticlesWriteRepo> = store.clone();
    ArticleService::new(reader, writer, cache, config)
}
