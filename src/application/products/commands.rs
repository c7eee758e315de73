use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::application::repos::ProductFilter;
use crate::cache::keys;
use crate::domain::entities::ProductRecord;
use crate::domain::products::{NewProduct, ProductDraft, ProductPatch, validate_batch};
use crate::infra::telemetry::{CACHE_INVALIDATIONS_TOTAL, CATALOG_MUTATIONS_TOTAL};

use super::service::ProductService;
use super::types::{BulkUploadOutcome, CatalogError};

// Every mutation writes to the store first and invalidates afterwards.
// Invalidating earlier would let a concurrent read cache pre-write data.

impl ProductService {
    #[instrument(skip(self, draft), fields(sku = %draft.sku))]
    pub async fn create_product(&self, draft: ProductDraft) -> Result<ProductRecord, CatalogError> {
        let product = draft.validate()?;
        let created = self.writer.create_product(product).await?;

        record_mutation("create");
        info!(product_id = %created.id, "product created");

        self.invalidate_listings().await;
        Ok(created)
    }

    #[instrument(skip(self, patch))]
    pub async fn update_product(
        &self,
        id: Uuid,
        patch: ProductPatch,
    ) -> Result<ProductRecord, CatalogError> {
        let patch = patch.validate()?;
        let updated = self.apply_patch(id, patch).await?;

        record_mutation("update");
        info!(product_id = %id, "product updated");

        self.invalidate_product(id).await;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn toggle_status(
        &self,
        id: Uuid,
        is_enabled: bool,
    ) -> Result<ProductRecord, CatalogError> {
        let updated = self.apply_patch(id, ProductPatch::status(is_enabled)).await?;

        record_mutation("toggle_status");
        info!(product_id = %id, is_enabled, "product status changed");

        self.invalidate_product(id).await;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> Result<ProductRecord, CatalogError> {
        let deleted = self
            .writer
            .delete_product(id)
            .await?
            .ok_or(CatalogError::NotFound(id))?;

        record_mutation("delete");
        info!(product_id = %id, "product deleted");

        self.invalidate_product(id).await;
        Ok(deleted)
    }

    /// Replaces the active catalog: every stored product is disabled, then
    /// the batch is inserted enabled. Items the store refuses are skipped.
    ///
    /// Every row may change, so cached listings and cached single products are
    /// both dropped once, after the batch. This also happens when a later
    /// store step fails, since earlier steps may already be applied.
    ///
    /// Disabling and inserting are separate transactions. A store failure
    /// between them leaves the catalog fully disabled with nothing inserted.
    #[instrument(skip(self, drafts), fields(batch = drafts.len()))]
    pub async fn bulk_upload(
        &self,
        drafts: Vec<ProductDraft>,
    ) -> Result<BulkUploadOutcome, CatalogError> {
        let products = validate_batch(drafts)?;
        let submitted = products.len() as u64;

        let result = self.replace_catalog(products).await;
        self.invalidate_catalog().await;

        let (created, disabled) = result?;
        let outcome = BulkUploadOutcome {
            created,
            disabled,
            failed: submitted.saturating_sub(created),
        };

        record_mutation("bulk_upload");
        if outcome.failed > 0 {
            warn!(
                submitted,
                created = outcome.created,
                failed = outcome.failed,
                "bulk upload skipped items the store rejected"
            );
        }
        info!(
            created = outcome.created,
            disabled = outcome.disabled,
            "bulk upload completed"
        );
        Ok(outcome)
    }

    async fn replace_catalog(
        &self,
        products: Vec<NewProduct>,
    ) -> Result<(u64, u64), CatalogError> {
        let disabled_rows = self.writer.disable_all_products().await?;
        let created = self.writer.create_products(products).await?;
        let disabled = self
            .reader
            .count_products(&ProductFilter::enabled(false))
            .await?;

        info!(disabled_rows, "existing products disabled for bulk upload");
        Ok((created.len() as u64, disabled))
    }

    async fn apply_patch(
        &self,
        id: Uuid,
        patch: ProductPatch,
    ) -> Result<ProductRecord, CatalogError> {
        self.writer
            .update_product(id, patch)
            .await?
            .ok_or(CatalogError::NotFound(id))
    }

    async fn invalidate_product(&self, id: Uuid) {
        self.cache.delete(&keys::single_key(id)).await;
        self.invalidate_listings().await;
    }

    async fn invalidate_catalog(&self) {
        let removed = self.cache.delete_by_prefix(keys::ITEM_PREFIX).await;
        info!(removed, "product cache invalidated");
        self.invalidate_listings().await;
    }

    async fn invalidate_listings(&self) {
        let removed = self.cache.delete_by_prefix(keys::COLLECTION_PREFIX).await;
        metrics::counter!(CACHE_INVALIDATIONS_TOTAL).increment(1);
        info!(removed, "listing cache invalidated");
    }
}

fn record_mutation(op: &'static str) {
    metrics::counter!(CATALOG_MUTATIONS_TOTAL, "op" => op).increment(1);
}
