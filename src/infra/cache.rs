//! Cache backend selection at startup.

use std::sync::Arc;

use tracing::{info, warn};

use crate::cache::{CacheStore, DisabledCache, MemoryCache, RedisCache};
use crate::config::{CacheBackend, CacheSettings};

/// Build the configured backend.
///
/// An unreachable Redis at startup does not stop the service: the cache is
/// replaced by [`DisabledCache`] and every read goes to the store.
pub async fn connect_cache(settings: &CacheSettings) -> Arc<dyn CacheStore> {
    match settings.backend {
        CacheBackend::Disabled => {
            info!(backend = "disabled", "article cache disabled by configuration");
            Arc::new(DisabledCache)
        }
        CacheBackend::Memory => {
            info!(backend = "memory", "using in-process article cache");
            Arc::new(MemoryCache::new())
        }
        CacheBackend::Redis => {
            let connect = RedisCache::connect(&settings.host, settings.port, settings.database);
            // Connect and PING share one budget of eight operation timeouts.
            let budget = settings.operation_timeout * 8;
            match tokio::time::timeout(budget, connect).await {
                Ok(Ok(cache)) => {
                    info!(
                        backend = "redis",
                        host = %settings.host,
                        port = settings.port,
                        database = settings.database,
                        "redis connected"
                    );
                    Arc::new(cache)
                }
                Ok(Err(err)) => {
                    warn!(
                        backend = "redis",
                        host = %settings.host,
                        port = settings.port,
                        error = %err,
                        "redis unavailable; serving without cache"
                    );
                    Arc::new(DisabledCache)
                }
                Err(_) => {
                    warn!(
                        backend = "redis",
                        host = %settings.host,
                        port = settings.port,
                        timeout = ?budget,
                        "redis connect timed out; serving without cache"
                    );
                    Arc::new(DisabledCache)
                }
            }
        }
    }
}
