use crate::models::{CardEntry, ReconciliationResult};
use crate::pricing::PriceComparison;
use std::collections::BTreeMap;

fn push_cards(output: &mut String, cards: &[CardEntry]) {
    for card in cards {
        output.push_str(&format!("  {}x {}\n", card.quantity, card.name));
    }
}

pub fn format_reconciliation(result: &ReconciliationResult) -> String {
    let stats = &result.stats;
    let mut output = String::new();

    if stats.total_required == 0 {
        output.push_str("No cards required by the selected decks.\n");
        return output;
    }

    if !result.missing.is_empty() {
        output.push_str(&format!("Missing cards ({}):\n", stats.total_missing));
        push_cards(&mut output, &result.missing);
        output.push('\n');
    }

    if !result.owned.is_empty() {
        output.push_str(&format!("Owned cards ({}):\n", stats.total_owned));
        push_cards(&mut output, &result.owned);
        output.push('\n');
    }

    output.push_str("========================\n");
    output.push_str(&format!("Total cards required: {}\n", stats.total_required));
    output.push_str(&format!("Total cards owned: {}\n", stats.total_owned));
    output.push_str(&format!("Total cards missing: {}\n", stats.total_missing));
    output.push_str(&format!("Completion: {}%\n", stats.completion_percentage));

    output
}

pub fn format_price_report(comparisons: &[PriceComparison]) -> String {
    let mut output = String::new();

    if comparisons.is_empty() {
        output.push_str("No missing cards to price.\n");
        return output;
    }

    // Vendors quote in different currencies, so totals stay separate
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();

    for comparison in comparisons {
        let card = &comparison.card;
        match &comparison.best_price {
            Some(best) => {
                output.push_str(&format!(
                    "{}x {} - best: {} {:.2} {} (total: {:.2} {})\n",
                    card.quantity,
                    card.name,
                    best.vendor,
                    best.price,
                    best.currency,
                    comparison.total,
                    best.currency
                ));
                for quote in comparison.all_prices.iter().skip(1) {
                    output.push_str(&format!(
                        "    {} {:.2} {}\n",
                        quote.vendor, quote.price, quote.currency
                    ));
                }
                *totals.entry(best.currency.as_str()).or_insert(0.0) += comparison.total;
            }
            None => {
                output.push_str(&format!(
                    "{}x {} - no price available\n",
                    card.quantity, card.name
                ));
            }
        }
    }

    output.push_str("========================\n");
    if totals.is_empty() {
        output.push_str("No prices available for missing cards.\n");
    }
    for (currency, total) in totals {
        output.push_str(&format!("Total estimated cost: {total:.2} {currency}\n"));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReconciliationStats;
    use crate::pricing::PriceQuote;

    fn quote(vendor: &str, price: f64, currency: &str) -> PriceQuote {
        PriceQuote {
            vendor: vendor.to_string(),
            price,
            currency: currency.to_string(),
        }
    }

    #[test]
    fn test_format_reconciliation_empty() {
        let output = format_reconciliation(&ReconciliationResult {
            stats: ReconciliationStats::from_totals(0, 0),
            ..Default::default()
        });
        assert!(output.contains("No cards required"));
    }

    #[test]
    fn test_format_reconciliation_sections() {
        let result = ReconciliationResult {
            missing: vec![CardEntry::named("Pot of Greed", 3)],
            owned: vec![CardEntry::named("Raigeki", 2)],
            stats: ReconciliationStats::from_totals(2, 3),
        };

        let output = format_reconciliation(&result);

        assert!(output.contains("Missing cards (3):\n  3x Pot of Greed\n"));
        assert!(output.contains("Owned cards (2):\n  2x Raigeki\n"));
        assert!(output.contains("Total cards required: 5\n"));
        assert!(output.contains("Completion: 40%\n"));
    }

    #[test]
    fn test_format_price_report_totals_per_currency() {
        let comparisons = vec![
            PriceComparison {
                card: CardEntry::named("Pot of Greed", 2),
                best_price: Some(quote("CardMarket", 0.5, "EUR")),
                all_prices: vec![quote("CardMarket", 0.5, "EUR"), quote("eBay", 0.9, "USD")],
                total: 1.0,
            },
            PriceComparison {
                card: CardEntry::named("Raigeki", 1),
                best_price: Some(quote("TCGPlayer", 2.25, "USD")),
                all_prices: vec![quote("TCGPlayer", 2.25, "USD")],
                total: 2.25,
            },
            PriceComparison {
                card: CardEntry::named("Mystery Card", 1),
                best_price: None,
                all_prices: vec![],
                total: 0.0,
            },
        ];

        let output = format_price_report(&comparisons);

        assert!(output.contains("2x Pot of Greed - best: CardMarket 0.50 EUR (total: 1.00 EUR)\n"));
        assert!(output.contains("    eBay 0.90 USD\n"));
        assert!(output.contains("1x Mystery Card - no price available\n"));
        assert!(output.contains("Total estimated cost: 1.00 EUR\n"));
        assert!(output.contains("Total estimated cost: 2.25 USD\n"));
    }

    #[test]
    fn test_format_price_report_empty() {
        assert!(format_price_report(&[]).contains("No missing cards"));
    }
}
