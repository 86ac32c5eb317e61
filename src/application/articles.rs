//! Cache-aside coordination for news articles.
//!
//! Reads try the cache first and fall back to the store, repopulating the cache
//! on the way out. Writes go to the store and then drop the per-item snapshot.
//! Cache failures never reach the caller; store failures always do.
//!
//! Mutations leave `news:all` untouched, so the list may lag a write by up to
//! one TTL.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::application::repos::{
    ArticlesRepo, ArticlesWriteRepo, CreateArticleParams, RepoError, UpdateArticleParams,
};
use crate::cache::{ArticleKey, CacheConfig, CacheLookup, CacheStore, read_json, remove, write_json};
use crate::domain::articles::ArticleDraft;
use crate::domain::entities::ArticleRecord;

pub const METRIC_CACHE_HIT: &str = "newsdesk_cache_hit_total";
pub const METRIC_CACHE_MISS: &str = "newsdesk_cache_miss_total";
pub const METRIC_CACHE_ERROR: &str = "newsdesk_cache_error_total";
pub const METRIC_STORE_FETCH: &str = "newsdesk_store_fetch_total";

const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ArticleError {
    #[error("article {id} not found")]
    NotFound { id: i64 },
    #[error(transparent)]
    Store(#[from] RepoError),
}

impl ArticleError {
    fn from_write(id: i64, err: RepoError) -> Self {
        match err {
            RepoError::NotFound => Self::NotFound { id },
            other => Self::Store(other),
        }
    }
}

#[derive(Clone)]
pub struct ArticleService {
    reader: Arc<dyn ArticlesRepo>,
    writer: Arc<dyn ArticlesWriteRepo>,
    cache: Arc<dyn CacheStore>,
    config: CacheConfig,
    store_timeout: Duration,
}

impl ArticleService {
    pub fn new(
        reader: Arc<dyn ArticlesRepo>,
        writer: Arc<dyn ArticlesWriteRepo>,
        cache: Arc<dyn CacheStore>,
        config: CacheConfig,
    ) -> Self {
        Self {
            reader,
            writer,
            cache,
            config,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Bound every store call by `timeout`; an expired call fails with
    /// [`RepoError::Timeout`].
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// All articles, from `news:all` when present.
    pub async fn list(&self) -> Result<Vec<ArticleRecord>, ArticleError> {
        let key = ArticleKey::All;
        if let Some(articles) = self.cached::<Vec<ArticleRecord>>(key).await {
            return Ok(articles);
        }

        counter!(METRIC_STORE_FETCH, "keyspace" => key.keyspace()).increment(1);
        let articles = self
            .bounded(self.reader.list_articles())
            .await
            .inspect_err(|err| error!(error = %err, "failed to list articles from store"))?;

        self.populate(key, &articles).await;
        Ok(articles)
    }

    /// One article, from `news:{id}` when present.
    pub async fn get(&self, id: i64) -> Result<ArticleRecord, ArticleError> {
        let key = ArticleKey::ById(id);
        if let Some(article) = self.cached::<ArticleRecord>(key).await {
            return Ok(article);
        }

        counter!(METRIC_STORE_FETCH, "keyspace" => key.keyspace()).increment(1);
        let article = self
            .bounded(self.reader.find_article(id))
            .await
            .inspect_err(|err| {
                error!(article_id = id, error = %err, "failed to load article from store")
            })?
            .ok_or(ArticleError::NotFound { id })?;

        self.populate(key, &article).await;
        Ok(article)
    }

    /// Insert a new article. The cache is not consulted.
    pub async fn create(&self, draft: ArticleDraft) -> Result<ArticleRecord, ArticleError> {
        let article = self
            .bounded(self.writer.create_article(CreateArticleParams::from(draft)))
            .await
            .inspect_err(|err| error!(error = %err, "failed to create article"))?;

        debug!(
            article_id = article.id,
            cache_key = %ArticleKey::All,
            "article created; collection snapshot kept until it expires"
        );
        Ok(article)
    }

    /// Replace title and content, then drop the cached snapshot for `id`.
    pub async fn update(
        &self,
        id: i64,
        draft: ArticleDraft,
    ) -> Result<ArticleRecord, ArticleError> {
        let article = self
            .bounded(self.writer.update_article(UpdateArticleParams::new(id, draft)))
            .await
            .map_err(|err| ArticleError::from_write(id, err))
            .inspect_err(|err| log_write_failure("update", id, err))?;

        self.invalidate(ArticleKey::ById(id)).await;
        Ok(article)
    }

    /// Remove the article, then drop the cached snapshot for `id`.
    pub async fn delete(&self, id: i64) -> Result<(), ArticleError> {
        self.bounded(self.writer.delete_article(id))
            .await
            .map_err(|err| ArticleError::from_write(id, err))
            .inspect_err(|err| log_write_failure("delete", id, err))?;

        self.invalidate(ArticleKey::ById(id)).await;
        Ok(())
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, RepoError>
    where
        F: Future<Output = Result<T, RepoError>>,
    {
        match tokio::time::timeout(self.store_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(RepoError::Timeout),
        }
    }

    async fn cached<T>(&self, key: ArticleKey) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let rendered = key.to_string();
        let lookup =
            read_json::<T>(self.cache.as_ref(), &rendered, self.config.operation_timeout).await;

        let keyspace = key.keyspace();
        match lookup {
            CacheLookup::Hit(value) => {
                counter!(METRIC_CACHE_HIT, "keyspace" => keyspace).increment(1);
                debug!(cache_key = %rendered, "cache hit");
                return Some(value);
            }
            CacheLookup::Miss => {
                debug!(cache_key = %rendered, "cache miss");
            }
            CacheLookup::Malformed(err) => {
                counter!(METRIC_CACHE_ERROR, "keyspace" => keyspace, "op" => "decode")
                    .increment(1);
                warn!(
                    cache_key = %rendered,
                    backend = self.cache.backend(),
                    error = %err,
                    "discarding malformed cache entry"
                );
            }
            CacheLookup::Unavailable(err) => {
                counter!(METRIC_CACHE_ERROR, "keyspace" => keyspace, "op" => "get").increment(1);
                warn!(
                    cache_key = %rendered,
                    backend = self.cache.backend(),
                    error = %err,
                    "cache read failed; falling back to store"
                );
            }
        }

        counter!(METRIC_CACHE_MISS, "keyspace" => keyspace).increment(1);
        None
    }

    async fn populate<T>(&self, key: ArticleKey, value: &T)
    where
        T: Serialize + ?Sized,
    {
        let rendered = key.to_string();
        let result = write_json(
            self.cache.as_ref(),
            &rendered,
            value,
            self.config.ttl,
            self.config.operation_timeout,
        )
        .await;

        match result {
            Ok(()) => debug!(cache_key = %rendered, ttl = ?self.config.ttl, "cache populated"),
            Err(err) => {
                counter!(METRIC_CACHE_ERROR, "keyspace" => key.keyspace(), "op" => "set")
                    .increment(1);
                warn!(
                    cache_key = %rendered,
                    backend = self.cache.backend(),
                    error = %err,
                    "failed to populate cache"
                );
            }
        }
    }

    async fn invalidate(&self, key: ArticleKey) {
        let rendered = key.to_string();
        match remove(self.cache.as_ref(), &rendered, self.config.operation_timeout).await {
            Ok(()) => info!(
                article_id = key.article_id(),
                cache_key = %rendered,
                "cache invalidated"
            ),
            Err(err) => {
                counter!(METRIC_CACHE_ERROR, "keyspace" => key.keyspace(), "op" => "delete")
                    .increment(1);
                warn!(
                    cache_key = %rendered,
                    backend = self.cache.backend(),
                    error = %err,
                    "failed to invalidate cache entry"
                );
            }
        }
    }
}

fn log_write_failure(op: &'static str, id: i64, err: &ArticleError) {
    match err {
        ArticleError::NotFound { .. } => {
            warn!(article_id = id, op, error = %err, "article write target missing")
        }
        ArticleError::Store(_) => {
            error!(article_id = id, op, error = %err, "failed to write article to store")
        }
    }
}
