//! Vendor price selection for missing cards.

use crate::collection::normalize_name;
use crate::models::{CardData, CardEntry, CardPrices};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One vendor field in the card database price row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSource {
    pub vendor: String,
    pub field: String,
    pub currency: String,
}

impl PriceSource {
    pub fn new(vendor: &str, field: &str, currency: &str) -> Self {
        Self {
            vendor: vendor.to_string(),
            field: field.to_string(),
            currency: currency.to_string(),
        }
    }
}

/// Vendors reported by the card database
pub fn default_price_sources() -> Vec<PriceSource> {
    vec![
        PriceSource::new("CardMarket", "cardmarket_price", "EUR"),
        PriceSource::new("TCGPlayer", "tcgplayer_price", "USD"),
        PriceSource::new("eBay", "ebay_price", "USD"),
        PriceSource::new("Amazon", "amazon_price", "USD"),
        PriceSource::new("CoolStuffInc", "coolstuffinc_price", "USD"),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    pub vendor: String,
    pub price: f64,
    pub currency: String,
}

/// Usable quotes for `prices`, cheapest first.
///
/// Fields that are absent, non-numeric or not strictly positive are skipped.
pub fn all_prices(prices: &CardPrices, sources: &[PriceSource]) -> Vec<PriceQuote> {
    let mut quotes: Vec<PriceQuote> = sources
        .iter()
        .filter_map(|source| {
            let raw = prices.get(&source.field)?;
            let price = raw.trim().parse::<f64>().ok()?;
            if !price.is_finite() || price <= 0.0 {
                return None;
            }
            Some(PriceQuote {
                vendor: source.vendor.clone(),
                price,
                currency: source.currency.clone(),
            })
        })
        .collect();

    quotes.sort_by(|a, b| a.price.total_cmp(&b.price));
    quotes
}

pub fn best_price(prices: &CardPrices, sources: &[PriceSource]) -> Option<PriceQuote> {
    all_prices(prices, sources).into_iter().next()
}

/// Price lookup result for one missing card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceComparison {
    pub card: CardEntry,
    pub best_price: Option<PriceQuote>,
    pub all_prices: Vec<PriceQuote>,
    /// `best_price * quantity`, 0 when no price is known
    pub total: f64,
}

/// Prices every missing card, preferring catalog data over the entry's own
/// price map.
pub fn compare_prices(
    missing: &[CardEntry],
    catalog: &[CardData],
    sources: &[PriceSource],
) -> Vec<PriceComparison> {
    let by_name: HashMap<String, &CardData> = catalog
        .iter()
        .map(|card| (normalize_name(&card.name), card))
        .collect();

    missing
        .iter()
        .map(|card| {
            let prices = by_name
                .get(&normalize_name(&card.name))
                .and_then(|data| data.prices())
                .or(card.prices.as_ref());

            let quotes = match prices {
                Some(prices) => all_prices(prices, sources),
                None => {
                    log::debug!("No price data for {}", card.name);
                    Vec::new()
                }
            };
            let best = quotes.first().cloned();
            let total = best
                .as_ref()
                .map(|quote| quote.price * f64::from(card.quantity))
                .unwrap_or(0.0);

            PriceComparison {
                card: card.clone(),
                best_price: best,
                all_prices: quotes,
                total,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prices(pairs: &[(&str, &str)]) -> CardPrices {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_best_of_five() {
        let p = prices(&[
            ("cardmarket_price", "0.50"),
            ("tcgplayer_price", "0.21"),
            ("ebay_price", "0.99"),
            ("amazon_price", "1.25"),
            ("coolstuffinc_price", "0.49"),
        ]);

        let best = best_price(&p, &default_price_sources()).unwrap();
        assert_eq!(best.vendor, "TCGPlayer");
        assert_eq!(best.currency, "USD");
        assert!((best.price - 0.21).abs() < f64::EPSILON);

        let all = all_prices(&p, &default_price_sources());
        let vendors: Vec<&str> = all.iter().map(|q| q.vendor.as_str()).collect();
        assert_eq!(
            vendors,
            vec!["TCGPlayer", "CoolStuffInc", "CardMarket", "eBay", "Amazon"]
        );
    }

    #[test]
    fn test_zero_and_garbage_are_skipped() {
        let p = prices(&[
            ("cardmarket_price", "0.00"),
            ("tcgplayer_price", "n/a"),
            ("ebay_price", ""),
            ("amazon_price", "-3"),
        ]);
        assert!(best_price(&p, &default_price_sources()).is_none());
    }

    #[test]
    fn test_custom_sources() {
        let p = prices(&[("cardmarket_price", "2.00"), ("tcgplayer_price", "0.10")]);
        let sources = vec![PriceSource::new("CardMarket", "cardmarket_price", "EUR")];

        let best = best_price(&p, &sources).unwrap();
        assert_eq!(best.vendor, "CardMarket");
    }

    #[test]
    fn test_compare_prices_prefers_catalog() {
        let catalog: Vec<CardData> = serde_json::from_value(serde_json::json!([{
            "id": 1,
            "name": "Pot of Greed",
            "card_prices": [{ "cardmarket_price": "1.00" }]
        }]))
        .unwrap();

        let mut missing = CardEntry::named("pot of greed ", 3);
        missing.prices = Some(prices(&[("cardmarket_price", "9.00")]));

        let result = compare_prices(&[missing], &catalog, &default_price_sources());
        assert_eq!(result.len(), 1);
        assert!((result[0].total - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_compare_prices_falls_back_to_entry_prices() {
        let mut missing = CardEntry::named("Raigeki", 2);
        missing.prices = Some(prices(&[("tcgplayer_price", "1.50")]));
        let unpriced = CardEntry::named("Unknown Card", 1);

        let result = compare_prices(&[missing, unpriced], &[], &default_price_sources());

        assert!((result[0].total - 3.0).abs() < 1e-9);
        assert!(result[1].best_price.is_none());
        assert_eq!(result[1].total, 0.0);
    }
}
