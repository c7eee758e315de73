//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::application::pagination::{DEFAULT_PAGE, DEFAULT_PAGE_LIMIT, PageWindow};
use crate::domain::entities::ProductRecord;
use crate::domain::products::{NewProduct, ProductPatch};
use crate::domain::types::{SortField, SortOrder};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Predicates shared by listing and counting queries. All set fields must
/// match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub search: Option<String>,
    pub is_enabled: Option<bool>,
}

impl ProductFilter {
    pub fn enabled(is_enabled: bool) -> Self {
        Self {
            is_enabled: Some(is_enabled),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProductSort {
    pub field: SortField,
    pub order: SortOrder,
}

/// A fully normalized listing request: page, limit, filter and ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductQuery {
    pub page: u32,
    pub limit: u32,
    pub filter: ProductFilter,
    pub sort: ProductSort,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_PAGE_LIMIT,
            filter: ProductFilter::default(),
            sort: ProductSort::default(),
        }
    }
}

impl ProductQuery {
    pub fn window(&self) -> PageWindow {
        PageWindow::new(self.page, self.limit)
    }

    /// Drops values that carry no meaning (blank text, negative zero) so
    /// equivalent requests compare equal.
    pub fn normalized(mut self) -> Self {
        self.filter.category = non_blank(self.filter.category);
        self.filter.search = non_blank(self.filter.search);
        self.filter.min_price = self.filter.min_price.map(|value| value + 0.0);
        self.filter.max_price = self.filter.max_price.map(|value| value + 0.0);
        self
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}


#[async_trait]
pub trait ProductsRepo: Send + Sync {
    async fn list_products(
        &self,
        filter: &ProductFilter,
        sort: ProductSort,
        window: PageWindow,
    ) -> Result<Vec<ProductRecord>, RepoError>;

    async fn count_products(&self, filter: &ProductFilter) -> Result<u64, RepoError>;

    async fn find_product(&self, id: Uuid) -> Result<Option<ProductRecord>, RepoError>;

    /// Distinct categories in ascending order.
    async fn list_categories(&self) -> Result<Vec<String>, RepoError>;
}

#[async_trait]
pub trait ProductsWriteRepo: Send + Sync {
    async fn create_product(&self, product: NewProduct) -> Result<ProductRecord, RepoError>;

    /// Inserts every product it can. A failing item is skipped and does not
    /// abort the rest of the batch.
    async fn create_products(
        &self,
        products: Vec<NewProduct>,
    ) -> Result<Vec<ProductRecord>, RepoError>;

    async fn update_product(
        &self,
        id: Uuid,
        patch: ProductPatch,
    ) -> Result<Option<ProductRecord>, RepoError>;

    /// Marks every stored product as disabled and returns how many rows changed.
    async fn disable_all_products(&self) -> Result<u64, RepoError>;

    async fn delete_product(&self, id: Uuid) -> Result<Option<ProductRecord>, RepoError>;
}
