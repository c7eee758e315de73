//! Postgres-backed repository implementations.

mod products;
mod util;

pub use util::map_sqlx_error;

use std::sync::Arc;

use sqlx::{
    Postgres, QueryBuilder,
    postgres::{PgPool, PgPoolOptions},
    query,
};

use crate::application::repos::{ProductFilter, ProductSort};
use crate::domain::types::{SortField, SortOrder};

const PRODUCT_COLUMNS: &str = "id, name, description, price, category, sku, image_url, stock, \
    tags, is_enabled, created_at, updated_at";

const PRODUCT_SEARCH_EXPR: &str = "to_tsvector('simple', name || ' ' || description)";

#[derive(Clone)]
pub struct PostgresRepositories {
    pool: Arc<PgPool>,
}

impl PostgresRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
    }

    pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(pool).await
    }

    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        query("SELECT 1").execute(self.pool()).await.map(|_| ())
    }

    fn apply_product_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
        if let Some(category) = filter.category.as_ref() {
            qb.push(" AND category = ");
            qb.push_bind(category.clone());
        }

        if let Some(min_price) = filter.min_price {
            qb.push(" AND price >= ");
            qb.push_bind(min_price);
        }

        if let Some(max_price) = filter.max_price {
            qb.push(" AND price <= ");
            qb.push_bind(max_price);
        }

        if let Some(search) = filter.search.as_ref() {
            qb.push(" AND ");
            qb.push(PRODUCT_SEARCH_EXPR);
            qb.push(" @@ plainto_tsquery('simple', ");
            qb.push_bind(search.clone());
            qb.push(")");
        }

        if let Some(is_enabled) = filter.is_enabled {
            qb.push(" AND is_enabled = ");
            qb.push_bind(is_enabled);
        }
    }

    fn push_product_order(qb: &mut QueryBuilder<'_, Postgres>, sort: ProductSort) {
        let column = match sort.field {
            SortField::Name => "name",
            SortField::Price => "price",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        };
        let direction = match sort.order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };

        qb.push(" ORDER BY ");
        qb.push(column);
        qb.push(" ");
        qb.push(direction);
        qb.push(", id ");
        qb.push(direction);
    }
}
