//! Cache configuration.
//!
//! Controls which backend sits in front of the product store and how long
//! entries may be served.

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::Deserialize;

pub(crate) const DEFAULT_LIST_TTL_SECONDS: u64 = 300;
pub(crate) const DEFAULT_ITEM_TTL_SECONDS: u64 = 60;
pub(crate) const DEFAULT_OP_TIMEOUT_MS: u64 = 250;
pub(crate) const DEFAULT_MEMORY_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackendKind {
    #[default]
    Memory,
    Redis,
}

impl CacheBackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Redis => "redis",
        }
    }
}

impl std::str::FromStr for CacheBackendKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            other => Err(format!("unsupported cache backend `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// When false every cache operation is a miss or a no-op.
    pub enabled: bool,
    pub backend: CacheBackendKind,
    /// Required when `backend` is `redis`.
    pub redis_url: Option<String>,
    /// Lifetime of cached listings and the category list.
    pub list_ttl_seconds: u64,
    /// Lifetime of cached single products.
    pub item_ttl_seconds: u64,
    /// Upper bound for any single backend call.
    pub op_timeout_ms: u64,
    /// Maximum entries held by the in-process backend.
    pub memory_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: CacheBackendKind::Memory,
            redis_url: None,
            list_ttl_seconds: DEFAULT_LIST_TTL_SECONDS,
            item_ttl_seconds: DEFAULT_ITEM_TTL_SECONDS,
            op_timeout_ms: DEFAULT_OP_TIMEOUT_MS,
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
        }
    }
}

impl CacheConfig {
    pub fn list_ttl(&self) -> Duration {
        Duration::from_secs(self.list_ttl_seconds.max(1))
    }

    pub fn item_ttl(&self) -> Duration {
        Duration::from_secs(self.item_ttl_seconds.max(1))
    }

    pub fn op_timeout(&self) -> Duration {
        Duration::from_millis(self.op_timeout_ms.max(1))
    }

    /// Returns the memory capacity as NonZeroUsize, clamping to 1 if zero.
    pub fn memory_capacity_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.memory_capacity).unwrap_or(NonZeroUsize::MIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_keep_items_fresher_than_listings() {
        let config = CacheConfig::default();
        assert!(config.enabled);
        assert_eq!(config.backend, CacheBackendKind::Memory);
        assert_eq!(config.list_ttl(), Duration::from_secs(300));
        assert_eq!(config.item_ttl(), Duration::from_secs(60));
        assert!(config.item_ttl() < config.list_ttl());
        assert_eq!(config.op_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn zero_values_are_clamped() {
        let config = CacheConfig {
            list_ttl_seconds: 0,
            op_timeout_ms: 0,
            memory_capacity: 0,
            ..CacheConfig::default()
        };
        assert_eq!(config.list_ttl(), Duration::from_secs(1));
        assert_eq!(config.op_timeout(), Duration::from_millis(1));
        assert_eq!(config.memory_capacity_non_zero().get(), 1);
    }

    #[test]
    fn backend_kind_parses_case_insensitively() {
        assert_eq!("Redis".parse::<CacheBackendKind>(), Ok(CacheBackendKind::Redis));
        assert_eq!(" memory ".parse::<CacheBackendKind>(), Ok(CacheBackendKind::Memory));
        assert!("memcached".parse::<CacheBackendKind>().is_err());
    }

    #[test]
    fn deserializes_partial_tables() {
        let config: CacheConfig = serde_json::from_value(serde_json::json!({
            "backend": "redis",
            "redis_url": "redis://127.0.0.1:6379",
            "item_ttl_seconds": 30
        }))
        .expect("partial cache table");

        assert_eq!(config.backend, CacheBackendKind::Redis);
        assert_eq!(config.item_ttl_seconds, 30);
        assert_eq!(config.list_ttl_seconds, DEFAULT_LIST_TTL_SECONDS);
    }
}
