use std::sync::Arc;

use crate::application::repos::{ProductsRepo, ProductsWriteRepo};
use crate::cache::CacheStore;

use super::types::CacheTtl;

/// Product reads and writes with the cache in front of the store.
///
/// Reads go through the cache first and populate it on a miss. Writes hit
/// the store first and only then drop the affected cache entries.
#[derive(Clone)]
pub struct ProductService {
    pub(crate) reader: Arc<dyn ProductsRepo>,
    pub(crate) writer: Arc<dyn ProductsWriteRepo>,
    pub(crate) cache: CacheStore,
    pub(crate) ttl: CacheTtl,
}

impl ProductService {
    pub fn new(
        reader: Arc<dyn ProductsRepo>,
        writer: Arc<dyn ProductsWriteRepo>,
        cache: CacheStore,
        ttl: CacheTtl,
    ) -> Self {
        Self {
            reader,
            writer,
            cache,
            ttl,
        }
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }
}
