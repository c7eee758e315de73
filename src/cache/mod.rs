//! Product cache.
//!
//! A narrow read-through, write-invalidate cache for the catalog:
//!
//! - [`keys`] derives deterministic keys for listings and single products.
//! - [`CacheStore`] is the fail-soft facade the services talk to. Backend
//!   errors and timeouts become misses or no-ops.
//! - [`MemoryCacheBackend`] and [`RedisCacheBackend`] implement
//!   [`CacheBackend`].
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! enabled = true
//! backend = "redis"
//! redis_url = "redis://127.0.0.1:6379"
//! list_ttl_seconds = 300
//! item_ttl_seconds = 60
//! # ... see config.rs for all options
//! ```

mod config;
mod error;
pub mod keys;
mod lock;
mod memory;
mod remote;
mod store;

pub use config::{CacheBackendKind, CacheConfig};
pub use error::CacheError;
pub use memory::MemoryCacheBackend;
pub use remote::RedisCacheBackend;
pub use store::{CacheBackend, CacheStore};
