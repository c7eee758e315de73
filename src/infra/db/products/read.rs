use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::application::pagination::PageWindow;
use crate::application::repos::{ProductFilter, ProductSort, ProductsRepo, RepoError};
use crate::domain::entities::ProductRecord;

use super::super::util::convert_count;
use super::super::{PRODUCT_COLUMNS, PostgresRepositories, map_sqlx_error};
use super::types::ProductRow;

#[async_trait]
impl ProductsRepo for PostgresRepositories {
    async fn list_products(
        &self,
        filter: &ProductFilter,
        sort: ProductSort,
        window: PageWindow,
    ) -> Result<Vec<ProductRecord>, RepoError> {
        let offset = i64::try_from(window.skip).map_err(|_| RepoError::InvalidInput {
            message: format!("page offset {} is out of range", window.skip),
        })?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE TRUE"
        ));
        Self::apply_product_filter(&mut qb, filter);
        Self::push_product_order(&mut qb, sort);
        qb.push(" LIMIT ");
        qb.push_bind(i64::from(window.limit));
        qb.push(" OFFSET ");
        qb.push_bind(offset);

        let rows = qb
            .build_query_as::<ProductRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ProductRecord::from).collect())
    }

    async fn count_products(&self, filter: &ProductFilter) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products WHERE TRUE");
        Self::apply_product_filter(&mut qb, filter);

        let count: i64 = qb
            .build_query_scalar::<i64>()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        convert_count(count)
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<ProductRecord>, RepoError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(ProductRecord::from))
    }

    async fn list_categories(&self) -> Result<Vec<String>, RepoError> {
        sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT category FROM products ORDER BY category ASC",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }
}
