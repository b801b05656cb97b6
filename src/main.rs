//! deck_check - compare deck lists against a card collection
//!
//! Imports collections (CSV exports or shared collection pages) and decks
//! (YDK or plain text), reports which cards are missing and optionally
//! prices them across vendors.

use clap::Parser;
use deck_check::api::share::{
    extract_last_path_segment, fetch_shared_collection, shared_collection_to_data,
};
use deck_check::io::{
    deck_from_ydk, export_collection_csv, export_missing_text, read_collection_file,
    read_deck_file, DeckSource,
};
use deck_check::{
    compare_prices, fetch_cards_cached, format_price_report, format_reconciliation,
    merge_collection_lists, AppConfig, CardData, CatalogCache, MergeOptions, Normalizer,
    PriceComparison, Session, SortPolicy, YgoProDeckClient,
};
use std::path::PathBuf;

/// Find the cards your decks need that your collection is missing
#[derive(Parser, Debug)]
#[command(name = "deck_check")]
#[command(version, about, long_about = None)]
struct Args {
    /// Collection CSV export (repeatable)
    #[arg(long = "collection", value_name = "FILE")]
    collections: Vec<PathBuf>,

    /// Shared collection slug or URL (repeatable)
    #[arg(long = "share", value_name = "SLUG|URL")]
    shares: Vec<String>,

    /// Compare against an empty collection
    #[arg(long, default_value_t = false)]
    empty_collection: bool,

    /// Deck file, .ydk or .txt (repeatable)
    #[arg(long = "deck", value_name = "FILE", required = true)]
    decks: Vec<PathBuf>,

    /// Order of the reported cards: none, alpha or qtyDesc
    #[arg(long)]
    sort: Option<SortPolicy>,

    /// Look up vendor prices for missing cards
    #[arg(long, default_value_t = false)]
    prices: bool,

    /// Write the missing cards as a text list
    #[arg(long, value_name = "FILE")]
    export_missing: Option<PathBuf>,

    /// Write the merged collection as CSV
    #[arg(long, value_name = "FILE")]
    export_collection: Option<PathBuf>,

    /// Configuration file (default: <config dir>/deck_check/config.json)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() {
    // Initialize logger. Set RUST_LOG environment variable to control log level.
    // Examples: RUST_LOG=info, RUST_LOG=warn, RUST_LOG=deck_check=debug
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if let Err(e) = run(&args) {
        log::error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Card lookup by id, through the cache unless caching is disabled
fn lookup_ids(
    cache: &mut Option<CatalogCache>,
    client: &YgoProDeckClient,
    ids: &[u64],
) -> Vec<CardData> {
    match cache {
        Some(cache) => fetch_cards_cached(cache, client, ids),
        None => client.cards_by_ids(ids).unwrap_or_else(|e| {
            log::warn!("Failed to fetch cards by ids: {}", e);
            Vec::new()
        }),
    }
}

fn run(args: &Args) -> deck_check::Result<()> {
    let config = AppConfig::load_or_default(args.config.as_deref())?;
    let client = config.client();
    let mut cache = config.use_cache.then(CatalogCache::load);
    let mut session = Session::new();

    // Step 1: collection
    if args.empty_collection {
        session.skip_collection();
    }
    for path in &args.collections {
        let collection = read_collection_file(path, config.max_file_size)?;
        log::info!(
            "Imported {} cards from {}",
            collection.total_cards,
            path.display()
        );
        session.add_collection(collection);
    }
    for input in &args.shares {
        let slug = extract_last_path_segment(input);
        let shared = fetch_shared_collection(&config.share_base_url, &slug)?;
        let ids: Vec<u64> = shared.iter().map(|card| card.id).collect();
        let catalog = lookup_ids(&mut cache, &client, &ids);
        session.add_collection(shared_collection_to_data(&slug, &shared, &catalog));
    }
    if session.collections().is_none() {
        log::info!("No collection given, comparing against an empty collection");
        session.skip_collection();
    }
    session.next_step();

    // Step 2: decks
    for path in &args.decks {
        let deck = match read_deck_file(path, config.max_file_size)? {
            DeckSource::Ydk { name, ids } => {
                let catalog = lookup_ids(&mut cache, &client, &ids.all_ids());
                deck_from_ydk(&name, &ids, &catalog)
            }
            DeckSource::Text(deck) => deck,
        };
        log::info!("Loaded deck with {} cards from {}", deck.card_count(), path.display());
        session.add_deck(deck);
    }
    session.next_step();

    // Step 3: comparison
    let sort = args.sort.unwrap_or(config.sort);
    let result = session.compare(sort).clone();

    if let Some(path) = &args.export_missing {
        let today = chrono::Local::now().date_naive();
        std::fs::write(path, export_missing_text(&result.missing, today))?;
        log::info!("Wrote missing cards to {}", path.display());
    }
    if let Some(path) = &args.export_collection {
        let options = MergeOptions::new(Normalizer::CaseInsensitive, sort);
        let merged = merge_collection_lists(session.collections().unwrap_or(&[]), &options);
        std::fs::write(path, export_collection_csv(&merged)?)?;
        log::info!("Wrote collection to {}", path.display());
    }

    // Step 4: prices
    let comparisons = if args.prices && session.next_step() {
        let comparisons = price_missing(&client, &result.missing, &config);
        session.complete_prices();
        Some(comparisons)
    } else {
        if args.prices {
            log::info!("Nothing missing, skipping price lookup");
        }
        None
    };

    if args.json {
        let output = serde_json::json!({
            "result": result,
            "prices": comparisons,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", format_reconciliation(&result));
        if let Some(comparisons) = &comparisons {
            println!();
            print!("{}", format_price_report(comparisons));
        }
    }

    Ok(())
}

/// Prices the missing cards. Entries without their own price data (text
/// decks) are looked up by name first.
fn price_missing(
    client: &YgoProDeckClient,
    missing: &[deck_check::CardEntry],
    config: &AppConfig,
) -> Vec<PriceComparison> {
    let names: Vec<String> = missing
        .iter()
        .filter(|card| card.prices.is_none())
        .map(|card| card.name.trim().to_string())
        .collect();

    let catalog = client.cards_by_names(&names).unwrap_or_else(|e| {
        log::warn!("Failed to fetch prices by name: {}", e);
        Vec::new()
    });

    compare_prices(missing, &catalog, &config.price_sources)
}
