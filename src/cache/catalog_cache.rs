use crate::api::ygoprodeck::YgoProDeckClient;
use crate::error::{DeckCheckError, Result};
use crate::models::CardData;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Persistent cache for card database lookups
/// Stores cards in a JSON file to avoid redundant API calls
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct CatalogCache {
    /// Map of card id to card data
    cards: HashMap<u64, CardData>,
    #[serde(skip)]
    path: PathBuf,
}

impl CatalogCache {
    /// Get the default cache file path
    pub fn default_path() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("deck_check")
            .join("catalog_cache.json")
    }

    /// Load the cache from the default location
    pub fn load() -> Self {
        Self::at(&Self::default_path())
    }

    /// Load cache from `path`, or create empty if it doesn't exist
    pub fn at(path: &Path) -> Self {
        let mut cache = Self::default();
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match serde_json::from_str::<CatalogCache>(&content) {
                    Ok(loaded) => {
                        log::info!("Loaded catalog cache with {} entries", loaded.cards.len());
                        cache = loaded;
                    }
                    Err(e) => {
                        log::warn!("Failed to parse cache file, starting fresh: {}", e);
                    }
                },
                Err(e) => {
                    log::warn!("Failed to read cache file, starting fresh: {}", e);
                }
            }
        } else {
            log::info!("Starting with empty catalog cache");
        }
        cache.path = path.to_path_buf();
        cache
    }

    /// Save cache to disk
    pub fn save(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(DeckCheckError::Cache("cache has no file path".to_string()));
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&self.path, content)?;

        log::debug!("Saved catalog cache with {} entries", self.cards.len());
        Ok(())
    }

    pub fn get(&self, id: u64) -> Option<&CardData> {
        self.cards.get(&id)
    }

    pub fn insert(&mut self, card: CardData) {
        self.cards.insert(card.id, card);
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Fetch cards by id, checking the cache first.
///
/// Uncached ids are requested in one batch. A failed batch is logged and the
/// result falls back to whatever the cache already holds, so callers see
/// fewer cards rather than an error.
pub fn fetch_cards_cached(
    cache: &mut CatalogCache,
    client: &YgoProDeckClient,
    ids: &[u64],
) -> Vec<CardData> {
    let mut seen = HashSet::new();
    let distinct: Vec<u64> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();

    let uncached: Vec<u64> = distinct
        .iter()
        .copied()
        .filter(|id| cache.get(*id).is_none())
        .collect();

    if uncached.is_empty() {
        log::info!("Cache hit for all {} card ids", distinct.len());
    } else {
        log::info!(
            "Cache miss for {} of {} card ids, fetching from card database",
            uncached.len(),
            distinct.len()
        );
        match client.cards_by_ids(&uncached) {
            Ok(cards) => {
                for card in cards {
                    cache.insert(card);
                }
                if let Err(e) = cache.save() {
                    log::warn!("Failed to save cache: {}", e);
                }
            }
            Err(e) => log::warn!("Failed to fetch cards by ids: {}", e),
        }
    }

    distinct
        .into_iter()
        .filter_map(|id| cache.get(id).cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn card(id: u64, name: &str) -> CardData {
        serde_json::from_value(serde_json::json!({ "id": id, "name": name })).unwrap()
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("cache.json");

        let mut cache = CatalogCache::at(&path);
        assert!(cache.is_empty());
        cache.insert(card(1, "One"));
        cache.save().unwrap();

        let reloaded = CatalogCache::at(&path);
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.get(1).unwrap().name, "One");
    }

    #[test]
    fn test_save_without_path_fails() {
        let cache = CatalogCache::default();
        assert!(matches!(cache.save(), Err(DeckCheckError::Cache(_))));
    }

    #[test]
    fn test_corrupt_file_starts_fresh() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "{ not json").unwrap();

        let cache = CatalogCache::at(&path);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_only_uncached_ids() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("id", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{ "id": 2, "name": "Two" }]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let uri = mock_server.uri();

        let (cards, cached) = tokio::task::spawn_blocking(move || {
            let client = YgoProDeckClient::new(&uri, Duration::ZERO);
            let mut cache = CatalogCache::at(&path);
            cache.insert(card(1, "One"));
            let cards = fetch_cards_cached(&mut cache, &client, &[2, 1, 2]);
            (cards, cache.len())
        })
        .await
        .unwrap();

        let names: Vec<&str> = cards.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Two", "One"]);
        assert_eq!(cached, 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_degrades_to_cached() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let uri = mock_server.uri();

        let cards = tokio::task::spawn_blocking(move || {
            let client = YgoProDeckClient::new(&uri, Duration::ZERO);
            let mut cache = CatalogCache::at(&path);
            cache.insert(card(1, "One"));
            fetch_cards_cached(&mut cache, &client, &[1, 99])
        })
        .await
        .unwrap();

        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].id, 1);
    }
}
