pub mod api;
pub mod attach;
pub mod cache;
pub mod collection;
pub mod config;
pub mod error;
pub mod formatters;
pub mod io;
pub mod models;
pub mod pricing;
pub mod reconcile;
pub mod session;

// Re-export commonly used items
pub use api::{CardIdentifier, YgoProDeckClient};
pub use attach::{attach_quantities, CardId};
pub use cache::{fetch_cards_cached, CatalogCache};
pub use collection::{
    merge_collection_lists, merge_deck_lists, merge_lists, normalize_name, parse_quantity,
    MergeOptions, Normalizer, SortPolicy,
};
pub use config::AppConfig;
pub use error::{DeckCheckError, Error, Result};
pub use formatters::{format_price_report, format_reconciliation};
pub use models::{
    CardData, CardEntry, CollectionData, DeckList, ImportSource, ReconciliationResult,
    ReconciliationStats, YdkData,
};
pub use pricing::{compare_prices, PriceComparison, PriceQuote, PriceSource};
pub use reconcile::{reconcile, reconcile_merged, reconcile_sorted};
pub use session::{Session, WizardStep};
