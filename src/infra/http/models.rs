use serde::{Deserialize, Serialize};

use crate::application::pagination::MAX_PAGE_LIMIT;
use crate::application::products::BulkUploadOutcome;
use crate::application::repos::{ProductFilter, ProductQuery};
use crate::domain::error::DomainError;
use crate::domain::products::{ProductDraft, ProductPatch};
use crate::domain::types::{SortField, SortOrder};

/// Raw listing parameters as they arrive in the query string.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub search: Option<String>,
    pub is_enabled: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl ProductListQuery {
    pub fn into_query(self) -> Result<ProductQuery, DomainError> {
        let mut query = ProductQuery::default();

        if let Some(page) = present(self.page) {
            query.page = page
                .parse::<u32>()
                .ok()
                .filter(|page| *page >= 1)
                .ok_or_else(|| DomainError::validation("page", "must be a positive integer"))?;
        }

        if let Some(limit) = present(self.limit) {
            query.limit = limit
                .parse::<u32>()
                .ok()
                .filter(|limit| (1..=MAX_PAGE_LIMIT).contains(limit))
                .ok_or_else(|| {
                    DomainError::validation(
                        "limit",
                        format!("must be an integer between 1 and {MAX_PAGE_LIMIT}"),
                    )
                })?;
        }

        if let Some(sort_by) = present(self.sort_by) {
            query.sort.field = sort_by.parse::<SortField>().map_err(|_| {
                DomainError::validation(
                    "sortBy",
                    "must be one of name, price, createdAt, updatedAt",
                )
            })?;
        }

        if let Some(sort_order) = present(self.sort_order) {
            query.sort.order = sort_order
                .parse::<SortOrder>()
                .map_err(|_| DomainError::validation("sortOrder", "must be asc or desc"))?;
        }

        query.filter = ProductFilter {
            category: self.category,
            min_price: present(self.min_price)
                .map(|value| price_bound(&value, "minPrice"))
                .transpose()?,
            max_price: present(self.max_price)
                .map(|value| price_bound(&value, "maxPrice"))
                .transpose()?,
            search: self.search,
            is_enabled: self.is_enabled.as_deref().and_then(tri_state),
        };

        Ok(query.normalized())
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn price_bound(value: &str, field: &'static str) -> Result<f64, DomainError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| DomainError::validation(field, "must be a number"))
}

/// `"true"` and `"false"` select a status; anything else leaves it unset.
fn tri_state(value: &str) -> Option<bool> {
    match value {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub sku: String,
    pub image_url: Option<String>,
    pub stock: Option<i64>,
    pub tags: Option<Vec<String>>,
    pub is_enabled: Option<bool>,
}

impl From<CreateProductRequest> for ProductDraft {
    fn from(request: CreateProductRequest) -> Self {
        Self {
            name: request.name,
            description: request.description,
            price: request.price,
            category: request.category,
            sku: request.sku,
            image_url: request.image_url,
            stock: request.stock,
            tags: request.tags,
            is_enabled: request.is_enabled,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub sku: Option<String>,
    pub image_url: Option<String>,
    pub stock: Option<i64>,
    pub tags: Option<Vec<String>>,
    pub is_enabled: Option<bool>,
}

impl From<UpdateProductRequest> for ProductPatch {
    fn from(request: UpdateProductRequest) -> Self {
        Self {
            name: request.name,
            description: request.description,
            price: request.price,
            category: request.category,
            sku: request.sku,
            image_url: request.image_url,
            stock: request.stock,
            tags: request.tags,
            is_enabled: request.is_enabled,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleStatusRequest {
    pub is_enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct BulkUploadResponse {
    pub message: &'static str,
    pub created: u64,
    pub disabled: u64,
}

impl From<BulkUploadOutcome> for BulkUploadResponse {
    fn from(outcome: BulkUploadOutcome) -> Self {
        Self {
            message: "Bulk upload completed successfully",
            created: outcome.created,
            disabled: outcome.disabled,
        }
    }
}
