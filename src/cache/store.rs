//! Backend contract and the fail-soft facade used by the services.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Serialize, de::DeserializeOwned};
use tokio::time::timeout;
use tracing::{debug, warn};

use super::config::{CacheBackendKind, CacheConfig};
use super::error::CacheError;
use super::keys::namespace;
use super::memory::MemoryCacheBackend;
use super::remote::RedisCacheBackend;
use crate::infra::error::InfraError;
use crate::infra::telemetry::{CACHE_ERRORS_TOTAL, CACHE_HITS_TOTAL, CACHE_MISSES_TOTAL};

/// Raw key-value operations a cache service must provide.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError>;

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Removes every key in `keys` and returns how many were present.
    /// Backends with a multi-key delete should override this.
    async fn delete_many(&self, keys: &[String]) -> Result<usize, CacheError> {
        for key in keys {
            self.delete(key).await?;
        }
        Ok(keys.len())
    }

    /// Keys currently stored under `prefix`.
    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, CacheError>;

    fn backend_name(&self) -> &'static str;
}

/// Cache access for the catalog services.
///
/// Every operation is bounded by `op_timeout` and never returns an error:
/// failures are logged, counted and turned into a miss or a no-op.
#[derive(Clone)]
pub struct CacheStore {
    backend: Option<Arc<dyn CacheBackend>>,
    op_timeout: Duration,
}

impl CacheStore {
    pub fn new(backend: Arc<dyn CacheBackend>, op_timeout: Duration) -> Self {
        Self {
            backend: Some(backend),
            op_timeout,
        }
    }

    /// A store that never holds anything.
    pub fn disabled() -> Self {
        Self {
            backend: None,
            op_timeout: Duration::ZERO,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Result<Self, InfraError> {
        if !config.enabled {
            return Ok(Self::disabled());
        }

        let backend: Arc<dyn CacheBackend> = match config.backend {
            CacheBackendKind::Memory => Arc::new(MemoryCacheBackend::new(
                config.memory_capacity_non_zero(),
            )),
            CacheBackendKind::Redis => {
                let url = config.redis_url.as_deref().ok_or_else(|| {
                    InfraError::configuration("cache.redis_url is required for the redis backend")
                })?;
                Arc::new(
                    RedisCacheBackend::open(url)
                        .map_err(|err| InfraError::cache(err.to_string()))?,
                )
            }
        };

        Ok(Self::new(backend, config.op_timeout()))
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend
            .as_ref()
            .map_or("disabled", |backend| backend.backend_name())
    }

    /// Returns the cached value, or `None` on a miss, a backend failure, or
    /// a stored value that no longer decodes as `T`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let backend = self.backend.as_ref()?;
        let label = namespace(key).to_string();

        let bytes = match self.bounded("get", backend.get(key)).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                metrics::counter!(CACHE_MISSES_TOTAL, "namespace" => label).increment(1);
                debug!(key, "cache miss");
                return None;
            }
            Err(err) => {
                self.record_failure("get", key, &err);
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => {
                metrics::counter!(CACHE_HITS_TOTAL, "namespace" => label).increment(1);
                debug!(key, "cache hit");
                Some(value)
            }
            Err(err) => {
                self.record_failure("get", key, &CacheError::Codec(err.to_string()));
                None
            }
        }
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let Some(backend) = self.backend.as_ref() else {
            return;
        };

        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => Bytes::from(bytes),
            Err(err) => {
                self.record_failure("set", key, &CacheError::Codec(err.to_string()));
                return;
            }
        };

        if let Err(err) = self.bounded("set", backend.set(key, bytes, ttl)).await {
            self.record_failure("set", key, &err);
        }
    }

    pub async fn delete(&self, key: &str) {
        let Some(backend) = self.backend.as_ref() else {
            return;
        };

        if let Err(err) = self.bounded("delete", backend.delete(key)).await {
            self.record_failure("delete", key, &err);
        }
    }

    /// Scans for keys under `prefix` and deletes them in one batch.
    ///
    /// The scan and the delete are each bounded by `op_timeout`, so the pass
    /// never waits longer than twice that, however many keys match. Not
    /// atomic: a read that repopulates a key after the scan passed it leaves
    /// that entry in place until its TTL expires. Returns how many keys were
    /// removed.
    pub async fn delete_by_prefix(&self, prefix: &str) -> usize {
        let Some(backend) = self.backend.as_ref() else {
            return 0;
        };

        let keys = match self.bounded("scan", backend.scan_prefix(prefix)).await {
            Ok(keys) => keys,
            Err(err) => {
                self.record_failure("scan", prefix, &err);
                return 0;
            }
        };
        if keys.is_empty() {
            return 0;
        }

        let removed = match self.bounded("delete", backend.delete_many(&keys)).await {
            Ok(removed) => removed,
            Err(err) => {
                self.record_failure("delete", prefix, &err);
                0
            }
        };

        debug!(prefix, scanned = keys.len(), removed, "cache prefix invalidated");
        removed
    }

    async fn bounded<T>(
        &self,
        op: &'static str,
        future: impl Future<Output = Result<T, CacheError>>,
    ) -> Result<T, CacheError> {
        match timeout(self.op_timeout, future).await {
            Ok(result) => result,
            Err(_) => Err(CacheError::Timeout {
                op,
                timeout_ms: u64::try_from(self.op_timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }

    fn record_failure(&self, op: &'static str, key: &str, err: &CacheError) {
        metrics::counter!(CACHE_ERRORS_TOTAL, "op" => op, "kind" => err.kind()).increment(1);
        warn!(
            target = "vitrine::cache",
            op,
            key,
            backend = self.backend_name(),
            error = %err,
            "cache operation failed; continuing without cache"
        );
    }
}
