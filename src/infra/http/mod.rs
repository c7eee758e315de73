//! HTTP surface for the product catalog.

mod error;
mod handlers;
mod health;
mod middleware;
pub mod models;

pub use error::{ApiError, ApiErrorBody, ApiErrorMessage, codes};

use std::time::Instant;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, patch, post},
};

use crate::application::products::ProductService;
use crate::infra::db::PostgresRepositories;

use middleware::{log_responses, set_request_context};

#[derive(Clone)]
pub struct HttpState {
    pub products: ProductService,
    pub db: Option<PostgresRepositories>,
    pub started_at: Instant,
}

impl HttpState {
    pub fn new(products: ProductService, db: Option<PostgresRepositories>) -> Self {
        Self {
            products,
            db,
            started_at: Instant::now(),
        }
    }
}

pub fn build_router(state: HttpState, max_request_bytes: usize) -> Router {
    Router::new()
        .route("/", get(health::service_health))
        .route("/_health/db", get(health::database_health))
        .route(
            "/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route("/products/categories", get(handlers::list_categories))
        .route("/products/bulk-upload", post(handlers::bulk_upload))
        .route(
            "/products/{id}",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route(
            "/products/{id}/toggle-status",
            patch(handlers::toggle_status),
        )
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_request_bytes))
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}
