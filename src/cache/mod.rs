//! Newsdesk cache layer.
//!
//! The cache is an optimization in front of the article store, never a source
//! of truth. Snapshots are JSON documents stored under two key namespaces:
//!
//! - `news:all` holds the full article list
//! - `news:{id}` holds a single article
//!
//! Backends are chosen by `cache.backend` in `newsdesk.toml`:
//!
//! ```toml
//! [cache]
//! backend = "redis"   # or "memory", "disabled"
//! host = "127.0.0.1"
//! port = 6379
//! database = 0
//! ttl_seconds = 10
//! operation_timeout_ms = 250
//! ```

mod config;
mod disabled;
mod keys;
mod memory;
mod redis_store;
mod store;

pub use config::CacheConfig;
pub use disabled::DisabledCache;
pub use keys::ArticleKey;
pub use memory::MemoryCache;
pub use redis_store::RedisCache;
pub use store::{CacheError, CacheLookup, CacheStore, read_json, remove, write_json};
