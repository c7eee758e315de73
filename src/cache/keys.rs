//! Cache key derivation.
//!
//! Listing keys live under [`COLLECTION_PREFIX`] so a single prefix delete
//! drops every cached listing. Single-product keys use a separate namespace
//! and are removed one by one.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::application::repos::ProductQuery;

pub const COLLECTION_PREFIX: &str = "products:";
pub const ITEM_PREFIX: &str = "product:";

const CATEGORIES_SUFFIX: &str = "categories";

/// Key for one page of a product listing.
///
/// The query is rendered as a JSON object whose keys are sorted, with absent
/// optional fields left out, and then base64 encoded. Two queries with the
/// same meaningful values always map to the same key.
pub fn collection_key(query: &ProductQuery) -> String {
    let mut params = Map::new();
    params.insert("page".into(), Value::from(query.page));
    params.insert("limit".into(), Value::from(query.limit));
    params.insert("sortBy".into(), Value::from(query.sort.field.as_str()));
    params.insert("sortOrder".into(), Value::from(query.sort.order.as_str()));

    let filter = &query.filter;
    if let Some(category) = filter.category.as_deref() {
        params.insert("category".into(), Value::from(category));
    }
    if let Some(min_price) = filter.min_price {
        params.insert("minPrice".into(), Value::from(min_price));
    }
    if let Some(max_price) = filter.max_price {
        params.insert("maxPrice".into(), Value::from(max_price));
    }
    if let Some(search) = filter.search.as_deref() {
        params.insert("search".into(), Value::from(search));
    }
    if let Some(is_enabled) = filter.is_enabled {
        params.insert("isEnabled".into(), Value::from(is_enabled));
    }

    let canonical = Value::Object(params).to_string();
    format!("{COLLECTION_PREFIX}{}", URL_SAFE_NO_PAD.encode(canonical))
}

pub fn single_key(id: Uuid) -> String {
    format!("{ITEM_PREFIX}{id}")
}

/// Key for the distinct category list. It shares the listing namespace so
/// listing invalidation refreshes it too; collection tokens always start
/// with the encoding of `{"`, so it cannot collide with one.
pub fn categories_key() -> String {
    format!("{COLLECTION_PREFIX}{CATEGORIES_SUFFIX}")
}

/// Namespace label used for metrics, e.g. `products` or `product`.
pub fn namespace(key: &str) -> &str {
    key.split_once(':').map_or(key, |(namespace, _)| namespace)
}
