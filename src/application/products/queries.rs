use tracing::instrument;
use uuid::Uuid;

use crate::application::pagination::{CatalogCounts, Pagination};
use crate::application::repos::{ProductFilter, ProductQuery};
use crate::cache::keys;
use crate::domain::entities::ProductRecord;

use super::service::ProductService;
use super::types::{CatalogError, ProductPage};

impl ProductService {
    /// Returns one page of products.
    ///
    /// A cached page is returned as stored, without touching the store. On a
    /// miss the page and the catalog-wide total, enabled and disabled counts
    /// are loaded concurrently and cached for the list TTL. The counts ignore
    /// the filter, so `totalPages` describes the whole catalog.
    #[instrument(skip(self, query), fields(page = query.page, limit = query.limit))]
    pub async fn list_products(&self, query: ProductQuery) -> Result<ProductPage, CatalogError> {
        let query = query.normalized();
        let key = keys::collection_key(&query);

        if let Some(page) = self.cache.get::<ProductPage>(&key).await {
            return Ok(page);
        }

        let everything = ProductFilter::default();
        let enabled = ProductFilter::enabled(true);
        let disabled = ProductFilter::enabled(false);
        let (products, total, total_enabled, total_disabled) = tokio::try_join!(
            self.reader
                .list_products(&query.filter, query.sort, query.window()),
            self.reader.count_products(&everything),
            self.reader.count_products(&enabled),
            self.reader.count_products(&disabled),
        )?;

        let pagination = Pagination::compute(
            query.page,
            query.limit,
            CatalogCounts {
                total,
                enabled: total_enabled,
                disabled: total_disabled,
            },
        );
        let page = ProductPage {
            products,
            pagination,
        };

        self.cache.set(&key, &page, self.ttl.list).await;
        Ok(page)
    }

    /// Returns a single product. Missing products are not cached.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> Result<ProductRecord, CatalogError> {
        let key = keys::single_key(id);

        if let Some(product) = self.cache.get::<ProductRecord>(&key).await {
            return Ok(product);
        }

        let product = self
            .reader
            .find_product(id)
            .await?
            .ok_or(CatalogError::NotFound(id))?;

        self.cache.set(&key, &product, self.ttl.item).await;
        Ok(product)
    }

    /// Distinct product categories, sorted ascending.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<String>, CatalogError> {
        let key = keys::categories_key();

        if let Some(categories) = self.cache.get::<Vec<String>>(&key).await {
            return Ok(categories);
        }

        let categories = self.reader.list_categories().await?;
        self.cache.set(&key, &categories, self.ttl.list).await;
        Ok(categories)
    }
}
