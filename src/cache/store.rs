//! Cache backend contract and the typed helpers layered on top of it.
//!
//! Backends only move bytes. Serialization, timeouts and the hit/miss/malformed
//! distinction live in [`read_json`], [`write_json`] and [`remove`].

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
    #[error("cache {op} timed out after {after:?}")]
    Timeout { op: &'static str, after: Duration },
    #[error("cache payload could not be encoded: {0}")]
    Serialization(String),
    #[error("cache ttl {0:?} is out of range")]
    TtlOutOfRange(Duration),
}

impl CacheError {
    pub fn unavailable(err: impl std::fmt::Display) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Key/value store with per-entry expiry. Never authoritative.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns `Ok(None)` for absent or expired keys.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;

    /// Deleting an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

/// Outcome of a typed cache read.
#[derive(Debug)]
pub enum CacheLookup<T> {
    Hit(T),
    Miss,
    /// The key held bytes that did not decode into `T`.
    Malformed(serde_json::Error),
    /// The backend failed or did not answer in time.
    Unavailable(CacheError),
}

async fn bounded<F, T>(op: &'static str, after: Duration, fut: F) -> Result<T, CacheError>
where
    F: Future<Output = Result<T, CacheError>>,
{
    match tokio::time::timeout(after, fut).await {
        Ok(result) => result,
        Err(_) => Err(CacheError::Timeout { op, after }),
    }
}

/// Fetch `key` and decode it as JSON into `T`.
pub async fn read_json<T>(cache: &dyn CacheStore, key: &str, timeout: Duration) -> CacheLookup<T>
where
    T: DeserializeOwned,
{
    match bounded("get", timeout, cache.get(key)).await {
        Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
            Ok(value) => CacheLookup::Hit(value),
            Err(err) => CacheLookup::Malformed(err),
        },
        Ok(None) => CacheLookup::Miss,
        Err(err) => CacheLookup::Unavailable(err),
    }
}

/// Encode `value` as JSON and store it under `key` for `ttl`.
pub async fn write_json<T>(
    cache: &dyn CacheStore,
    key: &str,
    value: &T,
    ttl: Duration,
    timeout: Duration,
) -> Result<(), CacheError>
where
    T: Serialize + ?Sized,
{
    let bytes =
        serde_json::to_vec(value).map_err(|err| CacheError::Serialization(err.to_string()))?;
    bounded("set", timeout, cache.set(key, bytes, ttl)).await
}

/// Delete `key`.
pub async fn remove(cache: &dyn CacheStore, key: &str, timeout: Duration) -> Result<(), CacheError> {
    bounded("delete", timeout, cache.delete(key)).await
}
