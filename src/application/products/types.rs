use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::application::pagination::Pagination;
use crate::application::repos::RepoError;
use crate::cache::CacheConfig;
use crate::domain::entities::ProductRecord;
use crate::domain::error::DomainError;

/// Failures a catalog operation reports to its caller. Cache problems are
/// absorbed by the cache layer and never show up here.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] DomainError),
    #[error("product `{0}` not found")]
    NotFound(Uuid),
    #[error("product conflicts with an existing record (constraint `{constraint}`)")]
    Conflict { constraint: String },
    #[error("product store unavailable")]
    StoreUnavailable(#[source] RepoError),
}

impl From<RepoError> for CatalogError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Duplicate { constraint } => Self::Conflict { constraint },
            RepoError::InvalidInput { message } => {
                Self::Validation(DomainError::validation("product", message))
            }
            other => Self::StoreUnavailable(other),
        }
    }
}

/// One page of a product listing, cached as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    pub products: Vec<ProductRecord>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BulkUploadOutcome {
    /// Products inserted from the batch.
    pub created: u64,
    /// Products disabled after the upload, across the whole catalog.
    pub disabled: u64,
    /// Batch items the store refused.
    pub failed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtl {
    pub list: Duration,
    pub item: Duration,
}

impl Default for CacheTtl {
    fn default() -> Self {
        Self::from(&CacheConfig::default())
    }
}

impl From<&CacheConfig> for CacheTtl {
    fn from(config: &CacheConfig) -> Self {
        Self {
            list: config.list_ttl(),
            item: config.item_ttl(),
        }
    }
}
