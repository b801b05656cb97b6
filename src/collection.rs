//! List merging: folds card groups (deck zones, collection imports) into
//! one list with unique names and summed quantities.

use crate::models::{CardEntry, CollectionData, DeckList};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Maps a display name to the key used for deduplication
#[derive(Clone, Copy, Default)]
pub enum Normalizer {
    /// Names must match exactly
    #[default]
    Exact,
    /// Lowercase and trim surrounding whitespace
    CaseInsensitive,
    Custom(fn(&str) -> String),
}

impl Normalizer {
    pub fn key(&self, name: &str) -> String {
        match self {
            Normalizer::Exact => name.to_string(),
            Normalizer::CaseInsensitive => normalize_name(name),
            Normalizer::Custom(f) => f(name),
        }
    }
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Normalizer::Exact => write!(f, "Exact"),
            Normalizer::CaseInsensitive => write!(f, "CaseInsensitive"),
            Normalizer::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Lowercase + trim, the comparison key used by reconciliation
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Output order of a merged list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortPolicy {
    /// First-seen order
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "alpha")]
    Alpha,
    /// Descending quantity, ties keep first-seen order
    #[serde(rename = "qtyDesc")]
    QtyDesc,
}

impl FromStr for SortPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(SortPolicy::None),
            "alpha" => Ok(SortPolicy::Alpha),
            "qtydesc" | "qty-desc" => Ok(SortPolicy::QtyDesc),
            other => Err(format!(
                "unknown sort policy '{other}' (expected none, alpha or qtyDesc)"
            )),
        }
    }
}

impl fmt::Display for SortPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortPolicy::None => write!(f, "none"),
            SortPolicy::Alpha => write!(f, "alpha"),
            SortPolicy::QtyDesc => write!(f, "qtyDesc"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MergeOptions {
    pub normalizer: Normalizer,
    pub sort: SortPolicy,
}

impl MergeOptions {
    pub fn new(normalizer: Normalizer, sort: SortPolicy) -> Self {
        Self { normalizer, sort }
    }
}

/// Parses a quantity field, falling back to 0 for anything that is not a
/// non-negative integer.
pub fn parse_quantity(raw: &str) -> u32 {
    raw.trim().parse::<u32>().unwrap_or(0)
}

/// Merges card groups into one list keyed by normalized name.
///
/// Groups are walked in order, entries within a group in order. The first
/// occurrence of a key fixes its position and descriptive attributes; every
/// occurrence adds its quantity.
pub fn merge_lists<'a, I>(groups: I, options: &MergeOptions) -> Vec<CardEntry>
where
    I: IntoIterator<Item = &'a [CardEntry]>,
{
    let mut merged: Vec<CardEntry> = Vec::new();
    let mut index_by_key: HashMap<String, usize> = HashMap::new();

    for group in groups {
        for card in group {
            let key = options.normalizer.key(&card.name);
            match index_by_key.get(&key) {
                Some(&idx) => {
                    merged[idx].quantity = merged[idx].quantity.saturating_add(card.quantity);
                }
                None => {
                    index_by_key.insert(key, merged.len());
                    merged.push(card.clone());
                }
            }
        }
    }

    sort_entries(&mut merged, options.sort);
    merged
}

fn sort_entries(entries: &mut [CardEntry], sort: SortPolicy) {
    match sort {
        SortPolicy::None => {}
        SortPolicy::Alpha => entries.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        }),
        // sort_by is stable, so equal quantities stay in first-seen order
        SortPolicy::QtyDesc => entries.sort_by(|a, b| b.quantity.cmp(&a.quantity)),
    }
}

/// Merges the main, extra and side zones of every deck
pub fn merge_deck_lists(decks: &[DeckList], options: &MergeOptions) -> Vec<CardEntry> {
    merge_lists(decks.iter().flat_map(|deck| deck.zones()), options)
}

/// Merges several collection imports into one owned list
pub fn merge_collection_lists(
    collections: &[CollectionData],
    options: &MergeOptions,
) -> Vec<CardEntry> {
    merge_lists(collections.iter().map(|c| c.cards.as_slice()), options)
}
