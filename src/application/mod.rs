//! Application services orchestrating the catalog, its store and its cache.

pub mod error;
pub mod pagination;
pub mod products;
pub mod repos;
