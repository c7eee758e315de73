//! Postgres adapter checks.
//!
//! - Need a reachable Postgres through `DATABASE_URL`; `sqlx::test` creates a
//!   scratch database per test and applies `./migrations`.
//! - Marked `#[ignore]` so they only run with `cargo test -- --ignored`.

use sqlx::PgPool;
use uuid::Uuid;

use vitrine::application::pagination::PageWindow;
use vitrine::application::repos::{
    ProductFilter, ProductSort, ProductsRepo, ProductsWriteRepo,
};
use vitrine::domain::products::{ProductDraft, ProductPatch};
use vitrine::domain::types::{SortField, SortOrder};
use vitrine::infra::db::PostgresRepositories;

fn product(name: &str, category: &str, price: f64) -> ProductDraft {
    ProductDraft {
        name: name.to_string(),
        description: format!("{name} for the living room"),
        price,
        category: category.to_string(),
        sku: format!("SKU-{name}"),
        tags: Some(vec!["home".to_string()]),
        ..ProductDraft::default()
    }
}

async fn seed(repos: &PostgresRepositories) {
    for (name, category, price) in [
        ("Lamp", "Lighting", 40.0),
        ("Bulb", "Lighting", 5.0),
        ("Sofa", "Seating", 800.0),
    ] {
        repos
            .create_product(product(name, category, price).validate().unwrap())
            .await
            .expect("insert product");
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn filters_sort_and_count(pool: PgPool) {
    let repos = PostgresRepositories::new(pool);
    seed(&repos).await;

    let filter = ProductFilter {
        category: Some("Lighting".to_string()),
        max_price: Some(40.0),
        ..ProductFilter::default()
    };
    let sort = ProductSort {
        field: SortField::Price,
        order: SortOrder::Asc,
    };
    let products = repos
        .list_products(&filter, sort, PageWindow::new(1, 10))
        .await
        .expect("list products");

    let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Bulb", "Lamp"]);
    assert_eq!(repos.count_products(&filter).await.expect("count"), 2);

    let second_page = repos
        .list_products(&filter, sort, PageWindow::new(2, 1))
        .await
        .expect("list second page");
    assert_eq!(second_page.len(), 1);
    assert_eq!(second_page[0].name, "Lamp");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn full_text_search_matches_name_and_description(pool: PgPool) {
    let repos = PostgresRepositories::new(pool);
    seed(&repos).await;

    let filter = ProductFilter {
        search: Some("sofa".to_string()),
        ..ProductFilter::default()
    };
    assert_eq!(repos.count_products(&filter).await.expect("count"), 1);

    let filter = ProductFilter {
        search: Some("living room".to_string()),
        ..ProductFilter::default()
    };
    assert_eq!(repos.count_products(&filter).await.expect("count"), 3);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn categories_are_distinct_and_sorted(pool: PgPool) {
    let repos = PostgresRepositories::new(pool);
    seed(&repos).await;

    assert_eq!(
        repos.list_categories().await.expect("categories"),
        vec!["Lighting".to_string(), "Seating".to_string()]
    );
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn update_disable_and_delete(pool: PgPool) {
    let repos = PostgresRepositories::new(pool);
    seed(&repos).await;
    let all = repos
        .list_products(&ProductFilter::default(), ProductSort::default(), PageWindow::new(1, 10))
        .await
        .expect("list");
    let target = all[0].clone();

    let updated = repos
        .update_product(
            target.id,
            ProductPatch {
                stock: Some(7),
                tags: Some(Vec::new()),
                ..ProductPatch::default()
            },
        )
        .await
        .expect("update")
        .expect("product exists");
    assert_eq!(updated.stock, 7);
    assert!(updated.tags.is_empty());
    assert_eq!(updated.name, target.name);
    assert!(updated.updated_at >= target.updated_at);

    assert!(
        repos
            .update_product(Uuid::new_v4(), ProductPatch::status(false))
            .await
            .expect("update missing")
            .is_none()
    );

    assert_eq!(repos.disable_all_products().await.expect("disable"), 3);
    assert_eq!(
        repos
            .count_products(&ProductFilter::enabled(false))
            .await
            .expect("count disabled"),
        3
    );

    let deleted = repos
        .delete_product(target.id)
        .await
        .expect("delete")
        .expect("product existed");
    assert_eq!(deleted.id, target.id);
    assert!(repos.find_product(target.id).await.expect("find").is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn batch_insert_returns_created_rows(pool: PgPool) {
    let repos = PostgresRepositories::new(pool);
    let batch = (0..5)
        .map(|index| {
            product(&format!("Chair{index}"), "Seating", 50.0)
                .validate()
                .unwrap()
        })
        .collect();

    let created = repos.create_products(batch).await.expect("batch insert");

    assert_eq!(created.len(), 5);
    assert_eq!(
        repos
            .count_products(&ProductFilter::default())
            .await
            .expect("count"),
        5
    );
}
