#![allow(dead_code)]

use std::cmp::Ordering as CmpOrdering;
use std::collections::BTreeSet;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use vitrine::application::pagination::PageWindow;
use vitrine::application::products::{CacheTtl, ProductService};
use vitrine::application::repos::{
    ProductFilter, ProductSort, ProductsRepo, ProductsWriteRepo, RepoError,
};
use vitrine::cache::{CacheBackend, CacheError, CacheStore, MemoryCacheBackend};
use vitrine::domain::entities::ProductRecord;
use vitrine::domain::products::{NewProduct, ProductDraft, ProductPatch};
use vitrine::domain::types::{SortField, SortOrder};

/// In-memory product store. Every call yields once so concurrent requests
/// interleave the way they would against a real database.
#[derive(Default)]
pub struct MemoryProducts {
    products: Mutex<Vec<ProductRecord>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    /// SKUs whose insertion fails, to exercise partial batches.
    rejected_skus: Mutex<BTreeSet<String>>,
    unavailable: std::sync::atomic::AtomicBool,
}

impl MemoryProducts {
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn reject_sku(&self, sku: &str) {
        self.rejected_skus.lock().await.insert(sku.to_string());
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn snapshot(&self) -> Vec<ProductRecord> {
        self.products.lock().await.clone()
    }

    async fn enter_read(&self) -> Result<(), RepoError> {
        tokio::task::yield_now().await;
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check_available()
    }

    async fn enter_write(&self) -> Result<(), RepoError> {
        tokio::task::yield_now().await;
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check_available()
    }

    fn check_available(&self) -> Result<(), RepoError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepoError::Timeout);
        }
        Ok(())
    }
}

fn record_from(product: NewProduct) -> ProductRecord {
    let now = OffsetDateTime::now_utc();
    ProductRecord {
        id: Uuid::new_v4(),
        name: product.name,
        description: product.description,
        price: product.price,
        category: product.category,
        sku: product.sku,
        image_url: product.image_url,
        stock: product.stock,
        tags: product.tags,
        is_enabled: product.is_enabled,
        created_at: now,
        updated_at: now,
    }
}

fn matches(filter: &ProductFilter, product: &ProductRecord) -> bool {
    if let Some(category) = filter.category.as_deref() {
        if product.category != category {
            return false;
        }
    }
    if let Some(min) = filter.min_price {
        if product.price < min {
            return false;
        }
    }
    if let Some(max) = filter.max_price {
        if product.price > max {
            return false;
        }
    }
    if let Some(search) = filter.search.as_deref() {
        let needle = search.to_lowercase();
        let haystack = format!("{} {}", product.name, product.description).to_lowercase();
        if !haystack.contains(&needle) {
            return false;
        }
    }
    if let Some(is_enabled) = filter.is_enabled {
        if product.is_enabled != is_enabled {
            return false;
        }
    }
    true
}

fn compare(sort: ProductSort, a: &ProductRecord, b: &ProductRecord) -> CmpOrdering {
    let ordering = match sort.field {
        SortField::Name => a.name.cmp(&b.name),
        SortField::Price => a.price.total_cmp(&b.price),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    };
    let ordering = ordering.then_with(|| a.id.cmp(&b.id));
    match sort.order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

#[async_trait]
impl ProductsRepo for MemoryProducts {
    async fn list_products(
        &self,
        filter: &ProductFilter,
        sort: ProductSort,
        window: PageWindow,
    ) -> Result<Vec<ProductRecord>, RepoError> {
        self.enter_read().await?;
        let mut products: Vec<ProductRecord> = self
            .products
            .lock()
            .await
            .iter()
            .filter(|product| matches(filter, product))
            .cloned()
            .collect();
        products.sort_by(|a, b| compare(sort, a, b));
        Ok(products
            .into_iter()
            .skip(window.skip as usize)
            .take(window.limit as usize)
            .collect())
    }

    async fn count_products(&self, filter: &ProductFilter) -> Result<u64, RepoError> {
        self.enter_read().await?;
        let products = self.products.lock().await;
        Ok(products
            .iter()
            .filter(|product| matches(filter, product))
            .count() as u64)
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<ProductRecord>, RepoError> {
        self.enter_read().await?;
        let products = self.products.lock().await;
        Ok(products.iter().find(|product| product.id == id).cloned())
    }

    async fn list_categories(&self) -> Result<Vec<String>, RepoError> {
        self.enter_read().await?;
        let products = self.products.lock().await;
        let categories: BTreeSet<String> = products
            .iter()
            .map(|product| product.category.clone())
            .collect();
        Ok(categories.into_iter().collect())
    }
}

#[async_trait]
impl ProductsWriteRepo for MemoryProducts {
    async fn create_product(&self, product: NewProduct) -> Result<ProductRecord, RepoError> {
        self.enter_write().await?;
        let record = record_from(product);
        self.products.lock().await.push(record.clone());
        Ok(record)
    }

    async fn create_products(
        &self,
        products: Vec<NewProduct>,
    ) -> Result<Vec<ProductRecord>, RepoError> {
        self.enter_write().await?;
        let rejected = self.rejected_skus.lock().await.clone();
        let mut stored = self.products.lock().await;
        let mut created = Vec::new();
        for product in products {
            if rejected.contains(&product.sku) {
                continue;
            }
            let record = record_from(product);
            stored.push(record.clone());
            created.push(record);
        }
        Ok(created)
    }

    async fn update_product(
        &self,
        id: Uuid,
        patch: ProductPatch,
    ) -> Result<Option<ProductRecord>, RepoError> {
        self.enter_write().await?;
        let mut products = self.products.lock().await;
        let Some(product) = products.iter_mut().find(|product| product.id == id) else {
            return Ok(None);
        };

        if let Some(name) = patch.name {
            product.name = name;
        }
        if let Some(description) = patch.description {
            product.description = description;
        }
        if let Some(price) = patch.price {
            product.price = price;
        }
        if let Some(category) = patch.category {
            product.category = category;
        }
        if let Some(sku) = patch.sku {
            product.sku = sku;
        }
        if let Some(image_url) = patch.image_url {
            product.image_url = Some(image_url);
        }
        if let Some(stock) = patch.stock {
            product.stock = stock;
        }
        if let Some(tags) = patch.tags {
            product.tags = tags;
        }
        if let Some(is_enabled) = patch.is_enabled {
            product.is_enabled = is_enabled;
        }
        product.updated_at = OffsetDateTime::now_utc();
        Ok(Some(product.clone()))
    }

    async fn disable_all_products(&self) -> Result<u64, RepoError> {
        self.enter_write().await?;
        let mut products = self.products.lock().await;
        let mut changed = 0;
        for product in products.iter_mut().filter(|product| product.is_enabled) {
            product.is_enabled = false;
            changed += 1;
        }
        Ok(changed)
    }

    async fn delete_product(&self, id: Uuid) -> Result<Option<ProductRecord>, RepoError> {
        self.enter_write().await?;
        let mut products = self.products.lock().await;
        let position = products.iter().position(|product| product.id == id);
        Ok(position.map(|index| products.remove(index)))
    }
}

/// Memory backend that counts every call the facade makes.
pub struct RecordingBackend {
    inner: MemoryCacheBackend,
    pub gets: AtomicUsize,
    pub sets: AtomicUsize,
    pub deletes: AtomicUsize,
    pub scans: AtomicUsize,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            inner: MemoryCacheBackend::new(NonZeroUsize::new(1024).expect("non-zero")),
            gets: AtomicUsize::new(0),
            sets: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
            scans: AtomicUsize::new(0),
        }
    }

    /// Calls that remove or look for entries to remove.
    pub fn invalidation_calls(&self) -> usize {
        self.deletes.load(Ordering::SeqCst) + self.scans.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub async fn keys(&self, prefix: &str) -> Vec<String> {
        self.inner.scan_prefix(prefix).await.expect("memory scan")
    }
}

#[async_trait]
impl CacheBackend for RecordingBackend {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        tokio::task::yield_now().await;
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError> {
        tokio::task::yield_now().await;
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        tokio::task::yield_now().await;
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(key).await
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, CacheError> {
        tokio::task::yield_now().await;
        self.scans.fetch_add(1, Ordering::SeqCst);
        self.inner.scan_prefix(prefix).await
    }

    fn backend_name(&self) -> &'static str {
        "recording"
    }
}

/// Backend whose every call fails as if the server were down.
pub struct DownBackend;

#[async_trait]
impl CacheBackend for DownBackend {
    async fn get(&self, _key: &str) -> Result<Option<Bytes>, CacheError> {
        Err(CacheError::unavailable("connection refused"))
    }

    async fn set(&self, _key: &str, _value: Bytes, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::unavailable("connection refused"))
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::unavailable("connection refused"))
    }

    async fn scan_prefix(&self, _prefix: &str) -> Result<Vec<String>, CacheError> {
        Err(CacheError::unavailable("connection refused"))
    }

    fn backend_name(&self) -> &'static str {
        "down"
    }
}

pub struct Harness {
    pub store: Arc<MemoryProducts>,
    pub cache: Arc<RecordingBackend>,
    pub service: ProductService,
}

pub fn harness() -> Harness {
    let store = Arc::new(MemoryProducts::default());
    let cache = Arc::new(RecordingBackend::new());
    let service = service_with(
        store.clone(),
        CacheStore::new(cache.clone(), Duration::from_millis(250)),
    );
    Harness {
        store,
        cache,
        service,
    }
}

pub fn service_with(store: Arc<MemoryProducts>, cache: CacheStore) -> ProductService {
    let reader: Arc<dyn ProductsRepo> = store.clone();
    let writer: Arc<dyn ProductsWriteRepo> = store;
    ProductService::new(reader, writer, cache, CacheTtl::default())
}

pub fn draft(name: &str, category: &str, price: f64) -> ProductDraft {
    ProductDraft {
        name: name.to_string(),
        description: format!("{name} description"),
        price,
        category: category.to_string(),
        sku: format!("SKU-{}", name.to_uppercase().replace(' ', "-")),
        ..ProductDraft::default()
    }
}

pub fn numbered_drafts(count: usize) -> Vec<ProductDraft> {
    (0..count)
        .map(|index| draft(&format!("Item {index}"), "Bulk", index as f64))
        .collect()
}
