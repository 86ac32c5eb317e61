//! Redis cache backend.

use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};

use super::store::{CacheError, CacheStore};

/// [`CacheStore`] backed by a Redis database through a reconnecting
/// [`ConnectionManager`]. Cloning shares the underlying connection.
#[derive(Clone)]
pub struct RedisCache {
    manager: ConnectionManager,
}

impl RedisCache {
    /// Open a managed connection and confirm the server answers `PING`.
    pub async fn connect(host: &str, port: u16, database: i64) -> Result<Self, CacheError> {
        let client = Client::open(connection_url(host, port, database))
            .map_err(CacheError::unavailable)?;
        let mut manager = client
            .get_connection_manager()
            .await
            .map_err(CacheError::unavailable)?;
        let _: String = redis::cmd("PING")
            .query_async(&mut manager)
            .await
            .map_err(CacheError::unavailable)?;
        Ok(Self { manager })
    }
}

fn connection_url(host: &str, port: u16, database: i64) -> String {
    format!("redis://{host}:{port}/{database}")
}

/// `SET ... EX` rejects zero; sub-second TTLs round up to one second.
fn ttl_seconds(ttl: Duration) -> u64 {
    let secs = ttl.as_secs();
    if ttl.subsec_nanos() > 0 { secs + 1 } else { secs.max(1) }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.manager.clone();
        let value: Option<Vec<u8>> = conn.get(key).await.map_err(CacheError::unavailable)?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        let _: () = conn
            .set_ex(key, value, ttl_seconds(ttl))
            .await
            .map_err(CacheError::unavailable)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        let _: () = conn.del(key).await.map_err(CacheError::unavailable)?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_selects_database_index() {
        assert_eq!(connection_url("cache.local", 6380, 3), "redis://cache.local:6380/3");
    }

    #[test]
    fn ttl_rounds_up_to_whole_seconds() {
        assert_eq!(ttl_seconds(Duration::from_secs(10)), 10);
        assert_eq!(ttl_seconds(Duration::from_millis(1500)), 2);
        assert_eq!(ttl_seconds(Duration::from_millis(1)), 1);
        assert_eq!(ttl_seconds(Duration::ZERO), 1);
    }
}
