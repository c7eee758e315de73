use async_trait::async_trait;
use sqlx::{Acquire, Executor, Postgres, QueryBuilder};
use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

use crate::application::repos::{ProductsWriteRepo, RepoError};
use crate::domain::entities::ProductRecord;
use crate::domain::products::{NewProduct, ProductPatch};

use super::super::{PRODUCT_COLUMNS, PostgresRepositories, map_sqlx_error};
use super::types::ProductRow;

async fn insert_product<'e, E>(executor: E, product: NewProduct) -> Result<ProductRow, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let NewProduct {
        name,
        description,
        price,
        category,
        sku,
        image_url,
        stock,
        tags,
        is_enabled,
    } = product;

    let now = OffsetDateTime::now_utc();
    let sql = format!(
        "INSERT INTO products (
            id, name, description, price, category, sku, image_url, stock, tags, is_enabled,
            created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
        RETURNING {PRODUCT_COLUMNS}"
    );
    sqlx::query_as::<_, ProductRow>(&sql)
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(category)
        .bind(sku)
        .bind(image_url)
        .bind(stock)
        .bind(tags)
        .bind(is_enabled)
        .bind(now)
        .fetch_one(executor)
        .await
}

#[async_trait]
impl ProductsWriteRepo for PostgresRepositories {
    async fn create_product(&self, product: NewProduct) -> Result<ProductRecord, RepoError> {
        let row = insert_product(self.pool(), product)
            .await
            .map_err(map_sqlx_error)?;
        Ok(ProductRecord::from(row))
    }

    async fn create_products(
        &self,
        products: Vec<NewProduct>,
    ) -> Result<Vec<ProductRecord>, RepoError> {
        let mut tx = self.pool().begin().await.map_err(map_sqlx_error)?;
        let mut created = Vec::with_capacity(products.len());

        for (index, product) in products.into_iter().enumerate() {
            let mut savepoint = tx.begin().await.map_err(map_sqlx_error)?;
            match insert_product(&mut *savepoint, product).await {
                Ok(row) => {
                    savepoint.commit().await.map_err(map_sqlx_error)?;
                    created.push(ProductRecord::from(row));
                }
                Err(err) => {
                    savepoint.rollback().await.map_err(map_sqlx_error)?;
                    warn!(
                        target = "vitrine::db::products",
                        index,
                        error = %err,
                        "skipping product rejected during bulk insert"
                    );
                }
            }
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(created)
    }

    async fn update_product(
        &self,
        id: Uuid,
        patch: ProductPatch,
    ) -> Result<Option<ProductRecord>, RepoError> {
        let ProductPatch {
            name,
            description,
            price,
            category,
            sku,
            image_url,
            stock,
            tags,
            is_enabled,
        } = patch;

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE products SET updated_at = ");
        qb.push_bind(OffsetDateTime::now_utc());

        if let Some(name) = name {
            qb.push(", name = ");
            qb.push_bind(name);
        }
        if let Some(description) = description {
            qb.push(", description = ");
            qb.push_bind(description);
        }
        if let Some(price) = price {
            qb.push(", price = ");
            qb.push_bind(price);
        }
        if let Some(category) = category {
            qb.push(", category = ");
            qb.push_bind(category);
        }
        if let Some(sku) = sku {
            qb.push(", sku = ");
            qb.push_bind(sku);
        }
        if let Some(image_url) = image_url {
            qb.push(", image_url = ");
            qb.push_bind(image_url);
        }
        if let Some(stock) = stock {
            qb.push(", stock = ");
            qb.push_bind(stock);
        }
        if let Some(tags) = tags {
            qb.push(", tags = ");
            qb.push_bind(tags);
        }
        if let Some(is_enabled) = is_enabled {
            qb.push(", is_enabled = ");
            qb.push_bind(is_enabled);
        }

        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.push(" RETURNING ");
        qb.push(PRODUCT_COLUMNS);

        let row = qb
            .build_query_as::<ProductRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(ProductRecord::from))
    }

    async fn disable_all_products(&self) -> Result<u64, RepoError> {
        let result = sqlx::query(
            "UPDATE products SET is_enabled = FALSE, updated_at = $1 WHERE is_enabled",
        )
        .bind(OffsetDateTime::now_utc())
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }

    async fn delete_product(&self, id: Uuid) -> Result<Option<ProductRecord>, RepoError> {
        let sql = format!("DELETE FROM products WHERE id = $1 RETURNING {PRODUCT_COLUMNS}");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(ProductRecord::from))
    }
}
