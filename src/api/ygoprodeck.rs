use crate::error::{DeckCheckError, Result};
use crate::models::{CardData, CardSetInfo};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub const BASE_URL: &str = "https://db.ygoprodeck.com/api/v7";

/// 100ms between requests keeps us under the 20 requests/second limit
pub const RATE_LIMIT_DELAY: Duration = Duration::from_millis(100);

const USER_AGENT: &str = "deck_check/1.0";

/// Card database response envelope
#[derive(Debug, Deserialize)]
pub struct YgoProDeckResponse {
    #[serde(default)]
    pub data: Vec<CardData>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Spaces requests at least `min_interval` apart
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// Blocks until the next request is allowed
    pub fn throttle(&self) {
        let mut last = match self.last_request.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                std::thread::sleep(self.min_interval - elapsed);
            }
        }

        *last = Some(Instant::now());
    }
}

/// Either way of naming a card for validation
#[derive(Debug, Clone, PartialEq)]
pub enum CardIdentifier {
    Id(u64),
    Name(String),
}

/// Blocking client for the YGOPRODeck card database
#[derive(Debug)]
pub struct YgoProDeckClient {
    http: reqwest::blocking::Client,
    base_url: String,
    limiter: RateLimiter,
}

impl Default for YgoProDeckClient {
    fn default() -> Self {
        Self::new(BASE_URL, RATE_LIMIT_DELAY)
    }
}

impl YgoProDeckClient {
    /// Client against `base_url` (tests point this at a mock server)
    pub fn new(base_url: &str, min_interval: Duration) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            limiter: RateLimiter::new(min_interval),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.limiter.throttle();
        log::info!("Fetching from card database: {}", url);

        let response = self.http.get(url).header("User-Agent", USER_AGENT).send()?;
        let status = response.status();

        if !status.is_success() {
            // The database reports misses as 400 with {"error": "..."}
            return match response.json::<ErrorBody>() {
                Ok(body) => Err(DeckCheckError::ApiResponse {
                    code: status.as_u16().to_string(),
                    details: body.error,
                }),
                Err(_) => Err(DeckCheckError::HttpStatus(status)),
            };
        }

        let body = response.text()?;
        Ok(serde_json::from_str(&body)?)
    }

    fn card_info(&self, query: &str) -> Result<Vec<CardData>> {
        let url = format!("{}/cardinfo.php?{}", self.base_url, query);
        let response: YgoProDeckResponse = self.request(&url)?;

        if let Some(error) = response.error {
            return Err(DeckCheckError::ApiResponse {
                code: "200".to_string(),
                details: error,
            });
        }
        Ok(response.data)
    }

    /// Card by catalog id
    pub fn card_by_id(&self, id: u64) -> Result<Option<CardData>> {
        Ok(self.card_info(&format!("id={id}"))?.into_iter().next())
    }

    /// Batch lookup, one request for all ids
    pub fn cards_by_ids(&self, ids: &[u64]) -> Result<Vec<CardData>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let joined = ids
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self.card_info(&format!("id={joined}"))
    }

    /// Card by exact name
    pub fn card_by_name(&self, name: &str) -> Result<Option<CardData>> {
        let query = format!("name={}", urlencoding::encode(name));
        Ok(self.card_info(&query)?.into_iter().next())
    }

    /// Batch lookup by exact names, pipe-separated
    pub fn cards_by_names(&self, names: &[String]) -> Result<Vec<CardData>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let joined = names
            .iter()
            .map(|n| urlencoding::encode(n).into_owned())
            .collect::<Vec<_>>()
            .join("|");
        self.card_info(&format!("name={joined}"))
    }

    /// Fuzzy name search
    pub fn search_cards(&self, term: &str) -> Result<Vec<CardData>> {
        if term.trim().is_empty() {
            return Ok(Vec::new());
        }
        self.card_info(&format!("fname={}", urlencoding::encode(term)))
    }

    /// All card sets
    pub fn card_sets(&self) -> Result<Vec<CardSetInfo>> {
        self.request(&format!("{}/cardsets.php", self.base_url))
    }

    pub fn random_card(&self) -> Result<Option<CardData>> {
        let response: YgoProDeckResponse =
            self.request(&format!("{}/randomcard.php", self.base_url))?;
        Ok(response.data.into_iter().next())
    }

    /// Looks up each identifier one at a time, keeping hits.
    ///
    /// Misses and failures are logged and skipped. `on_progress` receives
    /// (completed, total) after every lookup.
    pub fn validate_cards<F>(&self, identifiers: &[CardIdentifier], mut on_progress: F) -> Vec<CardData>
    where
        F: FnMut(usize, usize),
    {
        let total = identifiers.len();
        let mut results = Vec::new();

        for (i, identifier) in identifiers.iter().enumerate() {
            let lookup = match identifier {
                CardIdentifier::Id(id) => self.card_by_id(*id),
                CardIdentifier::Name(name) => self.card_by_name(name),
            };

            match lookup {
                Ok(Some(card)) => results.push(card),
                Ok(None) => log::warn!("No card found for {:?}", identifier),
                Err(e) => log::warn!("Failed to fetch card {:?}: {}", identifier, e),
            }

            on_progress(i + 1, total);
        }

        results
    }
}

#[cfg(test)]
#[path = "ygoprodeck_tests.rs"]
mod tests;
