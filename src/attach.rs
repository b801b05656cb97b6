//! Turns raw card-id lists (YDK zones, scraped collections) into entries by
//! counting repeats and joining against catalog data.

use crate::models::{CardData, CardEntry};
use std::collections::HashMap;

/// Anything that may name a catalog id
pub trait CardId {
    /// The numeric id, or None when the token is not a valid id
    fn card_id(&self) -> Option<u64>;
}

impl CardId for u64 {
    fn card_id(&self) -> Option<u64> {
        Some(*self)
    }
}

impl CardId for u32 {
    fn card_id(&self) -> Option<u64> {
        Some(u64::from(*self))
    }
}

impl CardId for &str {
    fn card_id(&self) -> Option<u64> {
        self.trim().parse().ok()
    }
}

impl CardId for String {
    fn card_id(&self) -> Option<u64> {
        self.as_str().card_id()
    }
}

/// Counts ids in first-seen order and attaches catalog attributes.
///
/// Ids that fail to parse are skipped; ids missing from the catalog are
/// dropped without error, since catalog lookups may legitimately miss.
pub fn attach_quantities<T: CardId>(ids: &[T], catalog: &[CardData]) -> Vec<CardEntry> {
    let mut order: Vec<u64> = Vec::new();
    let mut counts: HashMap<u64, u32> = HashMap::new();

    for raw in ids {
        let Some(id) = raw.card_id() else {
            log::debug!("Skipping unparseable card id");
            continue;
        };
        let count = counts.entry(id).or_insert_with(|| {
            order.push(id);
            0
        });
        *count += 1;
    }

    let by_id: HashMap<u64, &CardData> = catalog.iter().map(|c| (c.id, c)).collect();

    order
        .into_iter()
        .filter_map(|id| match by_id.get(&id) {
            Some(card) => Some(CardEntry::from_card_data(card, counts[&id])),
            None => {
                log::debug!("Card id {} not found in catalog, dropping", id);
                None
            }
        })
        .collect()
}
