//! Clients for external services (card database, shared collections)

pub mod share;
pub mod ygoprodeck;

// Re-exports for public API convenience
pub use share::{extract_last_path_segment, fetch_shared_collection, SharedCard};
pub use ygoprodeck::{CardIdentifier, RateLimiter, YgoProDeckClient};
