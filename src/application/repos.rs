//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::articles::ArticleDraft;
use crate::domain::entities::ArticleRecord;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct CreateArticleParams {
    pub title: String,
    pub content: String,
}

impl From<ArticleDraft> for CreateArticleParams {
    fn from(draft: ArticleDraft) -> Self {
        let (title, content) = draft.into_parts();
        Self { title, content }
    }
}

#[derive(Debug, Clone)]
pub struct UpdateArticleParams {
    pub id: i64,
    pub title: String,
    pub content: String,
}

impl UpdateArticleParams {
    pub fn new(id: i64, draft: ArticleDraft) -> Self {
        let (title, content) = draft.into_parts();
        Self { id, title, content }
    }
}

/// Read side of the authoritative article store.
#[async_trait]
pub trait ArticlesRepo: Send + Sync {
    /// Every article, ordered by id ascending.
    async fn list_articles(&self) -> Result<Vec<ArticleRecord>, RepoError>;

    async fn find_article(&self, id: i64) -> Result<Option<ArticleRecord>, RepoError>;
}

/// Write side of the authoritative article store.
///
/// Implementations assign ids and both timestamps on create and refresh
/// `updated_at` on update. Update and delete report [`RepoError::NotFound`]
/// when no row matches.
#[async_trait]
pub trait ArticlesWriteRepo: Send + Sync {
    async fn create_article(&self, params: CreateArticleParams)
    -> Result<ArticleRecord, RepoError>;

    async fn update_article(&self, params: UpdateArticleParams)
    -> Result<ArticleRecord, RepoError>;

    async fn delete_article(&self, id: i64) -> Result<(), RepoError>;
}
