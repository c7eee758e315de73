//! Product field constraints and write-side validation.
//!
//! Every write reaching a repository goes through [`ProductDraft::validate`]
//! or [`ProductPatch::validate`], so price and stock are never negative in
//! storage.

use url::Url;

use crate::domain::error::DomainError;

pub const NAME_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;
pub const CATEGORY_MAX_CHARS: usize = 100;
pub const SKU_MAX_CHARS: usize = 50;
pub const BULK_UPLOAD_MAX_ITEMS: usize = 1000;

/// Unvalidated product fields as submitted by a client.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductDraft {
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

/// Validated, normalized product ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub sku: String,
    pub image_url: Option<String>,
    pub stock: i64,
    pub tags: Vec<String>,
    pub is_enabled: bool,
}

/// Partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
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

impl ProductDraft {
    pub fn validate(self) -> Result<NewProduct, DomainError> {
        Ok(NewProduct {
            name: bounded_text(self.name, "name", NAME_MAX_CHARS)?,
            description: bounded_text(self.description, "description", DESCRIPTION_MAX_CHARS)?,
            price: non_negative_price(self.price)?,
            category: bounded_text(self.category, "category", CATEGORY_MAX_CHARS)?,
            sku: bounded_text(self.sku, "sku", SKU_MAX_CHARS)?,
            image_url: self.image_url.map(image_url).transpose()?,
            stock: non_negative_stock(self.stock.unwrap_or(0))?,
            tags: normalize_tags(self.tags.unwrap_or_default()),
            is_enabled: self.is_enabled.unwrap_or(true),
        })
    }
}

impl ProductPatch {
    pub fn validate(self) -> Result<ProductPatch, DomainError> {
        Ok(ProductPatch {
            name: self
                .name
                .map(|value| bounded_text(value, "name", NAME_MAX_CHARS))
                .transpose()?,
            description: self
                .description
                .map(|value| bounded_text(value, "description", DESCRIPTION_MAX_CHARS))
                .transpose()?,
            price: self.price.map(non_negative_price).transpose()?,
            category: self
                .category
                .map(|value| bounded_text(value, "category", CATEGORY_MAX_CHARS))
                .transpose()?,
            sku: self
                .sku
                .map(|value| bounded_text(value, "sku", SKU_MAX_CHARS))
                .transpose()?,
            image_url: self.image_url.map(image_url).transpose()?,
            stock: self.stock.map(non_negative_stock).transpose()?,
            tags: self.tags.map(normalize_tags),
            is_enabled: self.is_enabled,
        })
    }

    pub fn status(is_enabled: bool) -> Self {
        Self {
            is_enabled: Some(is_enabled),
            ..Self::default()
        }
    }
}

/// Validates a bulk upload batch. Items are checked in order and the first
/// failure names its position.
pub fn validate_batch(drafts: Vec<ProductDraft>) -> Result<Vec<NewProduct>, DomainError> {
    if drafts.is_empty() {
        return Err(DomainError::validation(
            "products",
            "batch must contain at least one product",
        ));
    }
    if drafts.len() > BULK_UPLOAD_MAX_ITEMS {
        return Err(DomainError::validation(
            "products",
            format!("batch must contain at most {BULK_UPLOAD_MAX_ITEMS} products"),
        ));
    }

    drafts
        .into_iter()
        .enumerate()
        .map(|(index, draft)| {
            draft
                .validate()
                .map(|product| NewProduct {
                    is_enabled: true,
                    ..product
                })
                .map_err(|err| match err {
                    DomainError::Validation { field, message } => {
                        DomainError::validation(field, format!("item {index}: {message}"))
                    }
                })
        })
        .collect()
}

fn bounded_text(value: String, field: &'static str, max_chars: usize) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(field, "must not be empty"));
    }
    if trimmed.chars().count() > max_chars {
        return Err(DomainError::validation(
            field,
            format!("must be at most {max_chars} characters"),
        ));
    }
    Ok(trimmed.to_string())
}

fn non_negative_price(value: f64) -> Result<f64, DomainError> {
    if !value.is_finite() || value < 0.0 {
        return Err(DomainError::validation(
            "price",
            "must be a number greater than or equal to 0",
        ));
    }
    Ok(value)
}

fn non_negative_stock(value: i64) -> Result<i64, DomainError> {
    if value < 0 {
        return Err(DomainError::validation(
            "stock",
            "must be greater than or equal to 0",
        ));
    }
    Ok(value)
}

fn image_url(value: String) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    Url::parse(trimmed)
        .map(|_| trimmed.to_string())
        .map_err(|_| DomainError::validation("imageUrl", "must be a valid URL or empty"))
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}
