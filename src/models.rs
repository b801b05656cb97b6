use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Vendor price field (e.g. "cardmarket_price") -> decimal string
pub type CardPrices = BTreeMap<String, String>;

/// Printing of a card in a specific set
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CardSet {
    #[serde(default)]
    pub set_name: String,
    #[serde(default)]
    pub set_code: String,
    #[serde(default)]
    pub set_rarity: String,
    #[serde(default)]
    pub set_rarity_code: String,
    #[serde(default)]
    pub set_price: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardImage {
    pub id: u64,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub image_url_small: String,
    #[serde(default)]
    pub image_url_cropped: String,
}

/// Card record as returned by the card database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardData {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type", default)]
    pub card_type: String,
    #[serde(rename = "frameType", default)]
    pub frame_type: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub atk: Option<i64>,
    #[serde(default)]
    pub def: Option<i64>,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub race: String,
    #[serde(default)]
    pub attribute: Option<String>,
    #[serde(default)]
    pub archetype: Option<String>,
    #[serde(default)]
    pub ygoprodeck_url: Option<String>,
    #[serde(default)]
    pub card_sets: Vec<CardSet>,
    #[serde(default)]
    pub card_images: Vec<CardImage>,
    #[serde(default)]
    pub card_prices: Vec<CardPrices>,
}

impl CardData {
    /// First price row, which is where the database puts vendor prices
    pub fn prices(&self) -> Option<&CardPrices> {
        self.card_prices.first()
    }
}

/// Set listing from `cardsets.php`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSetInfo {
    pub set_name: String,
    #[serde(default)]
    pub set_code: String,
    #[serde(default)]
    pub num_of_cards: u32,
    #[serde(default)]
    pub tcg_date: Option<String>,
}

/// A name + quantity record flowing through merge and reconciliation.
///
/// Only `name` and `quantity` are examined by the core; everything else
/// is carried along from the first occurrence.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CardEntry {
    /// Catalog id, 0 when the entry came from a name-only source
    #[serde(default)]
    pub id: u64,
    pub name: String,
    #[serde(rename = "type", default)]
    pub card_type: String,
    pub quantity: u32,
    #[serde(default)]
    pub owned: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sets: Vec<CardSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prices: Option<CardPrices>,
}

impl CardEntry {
    /// Name-only entry, as produced by the text and CSV importers
    pub fn named(name: impl Into<String>, quantity: u32) -> Self {
        Self {
            name: name.into(),
            quantity,
            ..Default::default()
        }
    }

    /// Entry built from a catalog record
    pub fn from_card_data(card: &CardData, quantity: u32) -> Self {
        Self {
            id: card.id,
            name: card.name.clone(),
            card_type: card.card_type.clone(),
            quantity,
            owned: false,
            sets: card.card_sets.clone(),
            prices: card.prices().cloned(),
        }
    }

    /// Copy of this entry with a new quantity and ownership flag
    pub fn with_portion(&self, quantity: u32, owned: bool) -> Self {
        Self {
            quantity,
            owned,
            ..self.clone()
        }
    }
}

/// Deck split into its three zones
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeckList {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub main: Vec<CardEntry>,
    #[serde(default)]
    pub extra: Vec<CardEntry>,
    #[serde(default)]
    pub side: Vec<CardEntry>,
}

impl DeckList {
    /// Zones in traversal order: main, extra, side
    pub fn zones(&self) -> [&[CardEntry]; 3] {
        [self.main.as_slice(), self.extra.as_slice(), self.side.as_slice()]
    }

    /// Total number of cards across all zones
    pub fn card_count(&self) -> u32 {
        self.zones()
            .iter()
            .flat_map(|zone| zone.iter())
            .map(|card| card.quantity)
            .sum()
    }
}

/// Card ids of a YDK file, one entry per copy
#[derive(Debug, Clone, PartialEq, Default)]
pub struct YdkData {
    pub main: Vec<u64>,
    pub extra: Vec<u64>,
    pub side: Vec<u64>,
}

impl YdkData {
    /// All ids in main, extra, side order
    pub fn all_ids(&self) -> Vec<u64> {
        self.main
            .iter()
            .chain(&self.extra)
            .chain(&self.side)
            .copied()
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportSource {
    Csv,
    Manual,
    Share,
}

/// One imported collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionData {
    #[serde(default)]
    pub name: Option<String>,
    pub cards: Vec<CardEntry>,
    pub total_cards: u32,
    pub import_source: ImportSource,
}

impl CollectionData {
    pub fn new(name: Option<String>, cards: Vec<CardEntry>, import_source: ImportSource) -> Self {
        let total_cards = cards.iter().map(|c| c.quantity).sum();
        Self {
            name,
            cards,
            total_cards,
            import_source,
        }
    }
}

/// Summary statistics attached to a reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationStats {
    pub total_required: u32,
    pub total_owned: u32,
    pub total_missing: u32,
    /// 0..=100, rounded
    pub completion_percentage: u8,
}

/// Missing/owned partition of the required cards
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub missing: Vec<CardEntry>,
    pub owned: Vec<CardEntry>,
    pub stats: ReconciliationStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_data_deserialize_minimal() {
        let json = r#"{"id": 89631139, "name": "Blue-Eyes White Dragon"}"#;
        let card: CardData = serde_json::from_str(json).unwrap();
        assert_eq!(card.id, 89631139);
        assert!(card.card_sets.is_empty());
        assert!(card.prices().is_none());
    }

    #[test]
    fn test_card_data_prices_map() {
        let json = r#"{
            "id": 46986414,
            "name": "Dark Magician",
            "type": "Normal Monster",
            "frameType": "normal",
            "card_prices": [{"cardmarket_price": "0.02", "tcgplayer_price": "0.21"}]
        }"#;
        let card: CardData = serde_json::from_str(json).unwrap();
        assert_eq!(card.card_type, "Normal Monster");
        let prices = card.prices().unwrap();
        assert_eq!(prices.get("cardmarket_price").map(String::as_str), Some("0.02"));
    }

    #[test]
    fn test_entry_from_card_data_keeps_attributes() {
        let json = r#"{"id": 1, "name": "Pot of Greed", "type": "Spell Card",
            "card_sets": [{"set_name": "LOB", "set_code": "LOB-119"}]}"#;
        let card: CardData = serde_json::from_str(json).unwrap();
        let entry = CardEntry::from_card_data(&card, 2);
        assert_eq!(entry.id, 1);
        assert_eq!(entry.quantity, 2);
        assert_eq!(entry.card_type, "Spell Card");
        assert_eq!(entry.sets.len(), 1);
        assert!(!entry.owned);
    }

    #[test]
    fn test_deck_card_count() {
        let deck = DeckList {
            name: None,
            main: vec![CardEntry::named("A", 3)],
            extra: vec![CardEntry::named("B", 1)],
            side: vec![CardEntry::named("C", 2)],
        };
        assert_eq!(deck.card_count(), 6);
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let stats = ReconciliationStats {
            total_required: 5,
            total_owned: 2,
            total_missing: 3,
            completion_percentage: 40,
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"totalRequired\":5"));
        assert!(json.contains("\"completionPercentage\":40"));
    }
}
