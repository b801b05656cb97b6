//! Caching layer for card database responses

pub mod catalog_cache;

pub use catalog_cache::{fetch_cards_cached, CatalogCache};
