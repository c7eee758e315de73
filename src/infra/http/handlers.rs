//! Product handlers

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::domain::products::{ProductDraft, ProductPatch};

use super::HttpState;
use super::error::ApiError;
use super::models::{
    BulkUploadResponse, CreateProductRequest, MessageResponse, ProductListQuery,
    ToggleStatusRequest, UpdateProductRequest,
};

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw)
        .map_err(|_| ApiError::validation(format!("`{raw}` is not a valid product id")))
}

pub async fn list_products(
    State(state): State<HttpState>,
    query: Result<Query<ProductListQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let query = query.into_query()?;

    let page = state.products.list_products(query).await?;
    Ok(Json(page))
}

pub async fn list_categories(
    State(state): State<HttpState>,
) -> Result<impl IntoResponse, ApiError> {
    let categories = state.products.list_categories().await?;
    Ok(Json(categories))
}

pub async fn get_product(
    State(state): State<HttpState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;

    let product = state.products.get_product(id).await?;
    Ok(Json(product))
}

pub async fn create_product(
    State(state): State<HttpState>,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;

    let product = state
        .products
        .create_product(ProductDraft::from(payload))
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<HttpState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateProductRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let Json(payload) = payload?;

    let product = state
        .products
        .update_product(id, ProductPatch::from(payload))
        .await?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<HttpState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;

    state.products.delete_product(id).await?;
    Ok(Json(MessageResponse {
        message: "Product deleted successfully",
    }))
}

pub async fn toggle_status(
    State(state): State<HttpState>,
    Path(id): Path<String>,
    payload: Result<Json<ToggleStatusRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let Json(payload) = payload?;

    let product = state.products.toggle_status(id, payload.is_enabled).await?;
    Ok(Json(product))
}

pub async fn bulk_upload(
    State(state): State<HttpState>,
    payload: Result<Json<Vec<CreateProductRequest>>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let drafts = payload.into_iter().map(ProductDraft::from).collect();

    let outcome = state.products.bulk_upload(drafts).await?;
    Ok((StatusCode::CREATED, Json(BulkUploadResponse::from(outcome))))
}
