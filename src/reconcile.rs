//! Splits required card quantities into owned and missing portions.

use crate::collection::{merge_lists, normalize_name, MergeOptions, Normalizer, SortPolicy};
use crate::models::{CardEntry, ReconciliationResult, ReconciliationStats};
use std::collections::HashMap;

impl ReconciliationStats {
    /// Builds the statistics record from owned/missing totals.
    ///
    /// Nothing required counts as complete. While anything is missing the
    /// percentage never rounds up to 100.
    pub fn from_totals(total_owned: u32, total_missing: u32) -> Self {
        let total = u64::from(total_owned) + u64::from(total_missing);
        let completion_percentage = if total == 0 {
            100
        } else {
            let rounded = (200 * u64::from(total_owned) + total) / (2 * total);
            if total_missing > 0 {
                rounded.min(99) as u8
            } else {
                rounded as u8
            }
        };

        Self {
            total_required: total_owned.saturating_add(total_missing),
            total_owned,
            total_missing,
            completion_percentage,
        }
    }
}

/// Merges the required groups (lowercase+trim keys) and reconciles them
/// against the owned cards.
pub fn reconcile<'a, I>(required_groups: I, owned: Option<&[CardEntry]>) -> ReconciliationResult
where
    I: IntoIterator<Item = &'a [CardEntry]>,
{
    reconcile_sorted(required_groups, owned, SortPolicy::None)
}

/// Like [`reconcile`], with the required list emitted in `sort` order
pub fn reconcile_sorted<'a, I>(
    required_groups: I,
    owned: Option<&[CardEntry]>,
    sort: SortPolicy,
) -> ReconciliationResult
where
    I: IntoIterator<Item = &'a [CardEntry]>,
{
    let options = MergeOptions::new(Normalizer::CaseInsensitive, sort);
    let required = merge_lists(required_groups, &options);
    reconcile_merged(&required, owned)
}

/// Reconciles an already-merged required list.
///
/// Owned stock is looked up per required entry and never decremented, so a
/// name that appears twice in `required` reads the full owned quantity both
/// times. A warning is logged when that happens.
pub fn reconcile_merged(required: &[CardEntry], owned: Option<&[CardEntry]>) -> ReconciliationResult {
    warn_on_duplicate_keys(required);

    let owned = match owned {
        Some(cards) if !cards.is_empty() => cards,
        _ => return all_missing(required),
    };

    let mut stock: HashMap<String, u32> = HashMap::new();
    for card in owned {
        let available = stock.entry(normalize_name(&card.name)).or_insert(0);
        *available = available.saturating_add(card.quantity);
    }

    let mut result = ReconciliationResult::default();
    let mut total_owned: u32 = 0;
    let mut total_missing: u32 = 0;

    for card in required {
        let needed = card.quantity;
        let available = stock.get(&normalize_name(&card.name)).copied().unwrap_or(0);

        if available == 0 {
            result.missing.push(card.with_portion(needed, false));
            total_missing = total_missing.saturating_add(needed);
        } else if available >= needed {
            result.owned.push(card.with_portion(needed, true));
            total_owned = total_owned.saturating_add(needed);
        } else {
            result.owned.push(card.with_portion(available, true));
            result.missing.push(card.with_portion(needed - available, false));
            total_owned = total_owned.saturating_add(available);
            total_missing = total_missing.saturating_add(needed - available);
        }
    }

    result.stats = ReconciliationStats::from_totals(total_owned, total_missing);

    log::debug!(
        "Reconciled {} required cards: {} owned, {} missing ({}%)",
        result.stats.total_required,
        result.stats.total_owned,
        result.stats.total_missing,
        result.stats.completion_percentage
    );

    result
}

fn all_missing(required: &[CardEntry]) -> ReconciliationResult {
    let missing: Vec<CardEntry> = required
        .iter()
        .map(|card| card.with_portion(card.quantity, false))
        .collect();
    let total_missing = missing
        .iter()
        .fold(0u32, |sum, card| sum.saturating_add(card.quantity));

    ReconciliationResult {
        missing,
        owned: Vec::new(),
        stats: ReconciliationStats::from_totals(0, total_missing),
    }
}

fn warn_on_duplicate_keys(required: &[CardEntry]) {
    let mut seen: HashMap<String, usize> = HashMap::new();
    for card in required {
        *seen.entry(normalize_name(&card.name)).or_insert(0) += 1;
    }
    for (key, count) in seen.into_iter().filter(|(_, count)| *count > 1) {
        log::warn!(
            "Required list contains '{}' {} times; owned stock is counted for each occurrence",
            key,
            count
        );
    }
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
