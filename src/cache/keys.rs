//! Cache key definitions.
//!
//! Two namespaces share the `news:` prefix: the collection key `news:all` and
//! one per-item key `news:{id}`. The collection suffix is not numeric, so it
//! never collides with an item key.

use std::fmt;

const PREFIX: &str = "news";
const COLLECTION_SUFFIX: &str = "all";

/// Identifies one cached snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArticleKey {
    /// The full article list returned by `GET /news`.
    All,
    /// A single article by store id.
    ById(i64),
}

impl ArticleKey {
    /// Label used for metrics and log fields; stable across ids.
    pub fn keyspace(&self) -> &'static str {
        match self {
            ArticleKey::All => "collection",
            ArticleKey::ById(_) => "item",
        }
    }

    pub fn article_id(&self) -> Option<i64> {
        match self {
            ArticleKey::All => None,
            ArticleKey::ById(id) => Some(*id),
        }
    }
}

impl fmt::Display for ArticleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArticleKey::All => write!(f, "{PREFIX}:{COLLECTION_SUFFIX}"),
            ArticleKey::ById(id) => write!(f, "{PREFIX}:{id}"),
        }
    }
}
