//! Shared-collection pages: slug extraction and HTML scraping.
//!
//! Collection share pages have no JSON API, so card ids and counts are
//! pulled from the rendered markup.

use crate::error::{DeckCheckError, Result};
use crate::models::{CardData, CardEntry, CollectionData, ImportSource};
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Url;
use std::collections::HashMap;

pub const SHARE_BASE_URL: &str = "https://ygoprodeck.com/collection/share";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

lazy_static! {
    static ref CARD_ROW: Regex =
        Regex::new(r#"<div[^>]*class="card-row"[^>]*data-id="\d+"[^>]*>[\s\S]*?</div>"#).unwrap();
    static ref DATA_ID: Regex = Regex::new(r#"data-id="(\d+)""#).unwrap();
    static ref FLOATING_QTY: Regex =
        Regex::new(r#"<div[^>]*class="floating-quantity"[^>]*>x(\d+)</div>"#).unwrap();
}

/// Card id and count scraped from a share page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharedCard {
    pub id: u64,
    pub quantity: u32,
}

/// Reduces a pasted URL, domain path or bare slug to its last path segment.
///
/// "https://ygoprodeck.com/collection/share/abc123/" and
/// "ygoprodeck.com/collection/share/abc123" both yield "abc123".
pub fn extract_last_path_segment(input: &str) -> String {
    let trimmed = input.trim();
    let unquoted = trimmed
        .strip_prefix(['"', '\''])
        .unwrap_or(trimmed);
    let unquoted = unquoted.strip_suffix(['"', '\'']).unwrap_or(unquoted);

    let mut s = unquoted.to_string();
    if let Ok(url) = Url::parse(&s) {
        s = url.path().to_string();
    } else if !s.starts_with('/') && (s.contains('.') || s.contains(':')) {
        if let Ok(url) = Url::parse(&format!("https://{s}")) {
            s = url.path().to_string();
        }
    }

    let s = s.trim_end_matches('/');
    let last = s.split('/').filter(|p| !p.is_empty()).last().unwrap_or(s);
    let last = last.split(['?', '#']).next().unwrap_or(last);

    match urlencoding::decode(last) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => last.to_string(),
    }
}

/// Scrapes card rows out of a share page. Rows without a quantity badge
/// count as one copy.
pub fn parse_collection_html(html: &str) -> Vec<SharedCard> {
    CARD_ROW
        .find_iter(html)
        .filter_map(|row| {
            let row = row.as_str();
            let id = DATA_ID.captures(row)?.get(1)?.as_str().parse::<u64>().ok()?;
            let quantity = FLOATING_QTY
                .captures(row)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse::<u32>().ok())
                .unwrap_or(1);
            Some(SharedCard { id, quantity })
        })
        .collect()
}

/// Downloads and scrapes the shared collection `<base_url>/<slug>`
pub fn fetch_shared_collection(base_url: &str, slug: &str) -> Result<Vec<SharedCard>> {
    let slug = slug.trim();
    if slug.is_empty() {
        return Err(DeckCheckError::InvalidInput(
            "Collection slug is required".to_string(),
        ));
    }

    let url = format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(slug)
    );
    log::info!("Fetching shared collection: {}", url);

    let response = reqwest::blocking::Client::new()
        .get(&url)
        .header("User-Agent", BROWSER_USER_AGENT)
        .send()?;

    if !response.status().is_success() {
        return Err(DeckCheckError::HttpStatus(response.status()));
    }

    let html = response.text()?;
    let cards = parse_collection_html(&html);
    log::info!("Scraped {} card rows from shared collection", cards.len());
    Ok(cards)
}

/// Joins scraped ids against catalog data into an owned collection.
/// Ids missing from the catalog are dropped.
pub fn shared_collection_to_data(
    name: &str,
    cards: &[SharedCard],
    catalog: &[CardData],
) -> CollectionData {
    let by_id: HashMap<u64, &CardData> = catalog.iter().map(|c| (c.id, c)).collect();

    let entries = cards
        .iter()
        .filter_map(|shared| {
            let card = by_id.get(&shared.id)?;
            let mut entry = CardEntry::from_card_data(card, shared.quantity);
            entry.owned = true;
            Some(entry)
        })
        .collect();

    CollectionData::new(Some(name.to_string()), entries, ImportSource::Share)
}
