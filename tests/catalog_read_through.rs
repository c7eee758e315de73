mod support;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use uuid::Uuid;

use vitrine::application::products::CatalogError;
use vitrine::application::repos::{ProductFilter, ProductQuery};
use vitrine::cache::{CacheStore, keys};

use support::{DownBackend, MemoryProducts, draft, harness, service_with};

#[tokio::test]
async fn repeated_get_is_served_from_cache() {
    let h = harness();
    let created = h
        .service
        .create_product(draft("Desk Lamp", "Lighting", 40.0))
        .await
        .unwrap();

    let first = h.service.get_product(created.id).await.unwrap();
    let reads_after_first = h.store.reads();
    let second = h.service.get_product(created.id).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(h.store.reads(), reads_after_first);
    assert_eq!(reads_after_first, 1);
}

#[tokio::test]
async fn missing_product_is_not_cached() {
    let h = harness();
    let id = Uuid::new_v4();

    let err = h.service.get_product(id).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(missing) if missing == id));
    assert_eq!(h.cache.sets.load(Ordering::SeqCst), 0);

    h.service.get_product(id).await.unwrap_err();
    assert_eq!(h.store.reads(), 2);
}

#[tokio::test]
async fn listing_hit_skips_store_and_recomputation() {
    let h = harness();
    for index in 0..3 {
        h.service
            .create_product(draft(&format!("Chair {index}"), "Seating", 90.0))
            .await
            .unwrap();
    }

    let query = ProductQuery::default();
    let first = h.service.list_products(query.clone()).await.unwrap();
    // One page query plus three counts.
    assert_eq!(h.store.reads(), 4);

    let second = h.service.list_products(query).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(h.store.reads(), 4);
    assert_eq!(second.products.len(), 3);
}

#[tokio::test]
async fn equivalent_queries_share_one_entry() {
    let h = harness();
    h.service
        .create_product(draft("Sofa", "Seating", 500.0))
        .await
        .unwrap();

    let blank = ProductQuery {
        filter: ProductFilter {
            category: Some("  ".to_string()),
            search: Some(String::new()),
            ..ProductFilter::default()
        },
        ..ProductQuery::default()
    };
    h.service.list_products(blank).await.unwrap();
    let reads = h.store.reads();

    h.service
        .list_products(ProductQuery::default())
        .await
        .unwrap();
    assert_eq!(h.store.reads(), reads);
    assert_eq!(h.cache.keys(keys::COLLECTION_PREFIX).await.len(), 1);
}

#[tokio::test]
async fn listing_counts_cover_the_whole_catalog() {
    let h = harness();
    h.service
        .create_product(draft("Lamp", "Lighting", 20.0))
        .await
        .unwrap();
    h.service
        .create_product(draft("Bulb", "Lighting", 5.0))
        .await
        .unwrap();
    let chair = h
        .service
        .create_product(draft("Chair", "Seating", 80.0))
        .await
        .unwrap();
    h.service.toggle_status(chair.id, false).await.unwrap();

    let page = h
        .service
        .list_products(ProductQuery {
            limit: 1,
            filter: ProductFilter {
                category: Some("Lighting".to_string()),
                ..ProductFilter::default()
            },
            ..ProductQuery::default()
        })
        .await
        .unwrap();

    let pagination = page.pagination;
    assert_eq!(page.products.len(), 1);
    assert_eq!(pagination.total_count, 3);
    assert_eq!(pagination.total_pages, 3);
    assert!(pagination.has_next);
    assert!(!pagination.has_prev);
    assert_eq!(pagination.total_enabled_count, 2);
    assert_eq!(pagination.total_disabled_count, 1);
}

#[tokio::test]
async fn page_past_the_end_is_empty() {
    let h = harness();
    h.service
        .create_product(draft("Rug", "Textiles", 60.0))
        .await
        .unwrap();

    let page = h
        .service
        .list_products(ProductQuery {
            page: 5,
            ..ProductQuery::default()
        })
        .await
        .unwrap();

    assert!(page.products.is_empty());
    assert_eq!(page.pagination.current_page, 5);
    assert_eq!(page.pagination.total_pages, 1);
    assert!(!page.pagination.has_next);
    assert!(page.pagination.has_prev);
}

#[tokio::test]
async fn empty_catalog_reports_no_neighbour_pages() {
    let h = harness();

    let page = h
        .service
        .list_products(ProductQuery {
            page: 3,
            ..ProductQuery::default()
        })
        .await
        .unwrap();

    assert!(page.products.is_empty());
    assert_eq!(page.pagination.total_pages, 0);
    assert!(!page.pagination.has_next);
    assert!(!page.pagination.has_prev);
}

#[tokio::test]
async fn categories_are_sorted_and_cached() {
    let h = harness();
    for (name, category) in [("Lamp", "Lighting"), ("Chair", "Seating"), ("Mat", "Bath")] {
        h.service
            .create_product(draft(name, category, 10.0))
            .await
            .unwrap();
    }

    let categories = h.service.list_categories().await.unwrap();
    assert_eq!(categories, vec!["Bath", "Lighting", "Seating"]);

    let reads = h.store.reads();
    h.service.list_categories().await.unwrap();
    assert_eq!(h.store.reads(), reads);
}

#[tokio::test]
async fn unavailable_cache_falls_back_to_the_store() {
    let store = Arc::new(MemoryProducts::default());
    let service = service_with(
        store.clone(),
        CacheStore::new(Arc::new(DownBackend), Duration::from_millis(250)),
    );

    let created = service
        .create_product(draft("Stool", "Seating", 35.0))
        .await
        .unwrap();

    assert_eq!(service.get_product(created.id).await.unwrap(), created);
    assert_eq!(service.get_product(created.id).await.unwrap(), created);
    let page = service.list_products(ProductQuery::default()).await.unwrap();
    assert_eq!(page.products, vec![created]);
    assert_eq!(store.reads(), 6);
}

#[tokio::test]
async fn store_failures_surface_as_unavailable() {
    let h = harness();
    h.store.set_unavailable(true);

    let err = h
        .service
        .list_products(ProductQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::StoreUnavailable(_)));
    assert_eq!(h.cache.sets.load(Ordering::SeqCst), 0);
}
