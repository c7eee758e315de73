use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::entities::ProductRecord;

#[derive(sqlx::FromRow)]
pub(crate) struct ProductRow {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) price: f64,
    pub(crate) category: String,
    pub(crate) sku: String,
    pub(crate) image_url: Option<String>,
    pub(crate) stock: i64,
    pub(crate) tags: Vec<String>,
    pub(crate) is_enabled: bool,
    pub(crate) created_at: OffsetDateTime,
    pub(crate) updated_at: OffsetDateTime,
}

impl From<ProductRow> for ProductRecord {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            category: row.category,
            sku: row.sku,
            image_url: row.image_url,
            stock: row.stock,
            tags: row.tags,
            is_enabled: row.is_enabled,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
