//! File importers and exporters: collection CSV, YDK decks, free-text deck
//! lists, plus file-type detection and validation.

use crate::attach::attach_quantities;
use crate::collection::parse_quantity;
use crate::error::{DeckCheckError, Result};
use crate::models::{CardData, CardEntry, CardSet, CollectionData, DeckList, ImportSource, YdkData};
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

/// Default upload limit (10 MiB)
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

lazy_static! {
    /// "3x Name" or "3 Name"
    static ref PREFIX_QTY: Regex = Regex::new(r"^(\d+)x?\s+(.+)$").unwrap();
    /// "Name x3"
    static ref SUFFIX_QTY: Regex = Regex::new(r"^(.+?)\s+x(\d+)$").unwrap();
    /// "Name (3)"
    static ref PAREN_QTY: Regex = Regex::new(r"^(.+?)\s*\((\d+)\)$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Ydk,
    Csv,
    Txt,
    Unknown,
}

/// Detects the file type from the extension, falling back to content sniffing
pub fn detect_file_type(file_name: &str, content: Option<&str>) -> FileType {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match extension.as_deref() {
        Some("ydk") => FileType::Ydk,
        Some("csv") => FileType::Csv,
        Some("txt") => FileType::Txt,
        _ => match content {
            Some(c) if c.contains("#main") || c.contains("#extra") || c.contains("#side") => {
                FileType::Ydk
            }
            Some(c) if c.contains(',') && c.lines().count() > 1 => FileType::Csv,
            _ => FileType::Unknown,
        },
    }
}

/// Checks size and extension before a file is read
pub fn validate_file(file_name: &str, size: u64, max_size: u64) -> Result<FileType> {
    if size > max_size {
        return Err(DeckCheckError::FileTooLarge {
            size,
            max: max_size,
        });
    }

    match detect_file_type(file_name, None) {
        FileType::Unknown => Err(DeckCheckError::UnsupportedFileType(file_name.to_string())),
        file_type => Ok(file_type),
    }
}

/// Parses a YDK deck file into per-zone id lists.
///
/// `!side` is accepted as a side marker alongside `#side`. Lines before any
/// section marker are ignored.
pub fn parse_ydk(content: &str) -> YdkData {
    #[derive(Clone, Copy)]
    enum Section {
        Main,
        Extra,
        Side,
    }

    let mut ydk = YdkData::default();
    let mut section: Option<Section> = None;

    for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line.starts_with("#main") {
            section = Some(Section::Main);
            continue;
        } else if line.starts_with("#extra") {
            section = Some(Section::Extra);
            continue;
        } else if line.starts_with("#side") || line.starts_with("!side") {
            section = Some(Section::Side);
            continue;
        } else if line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        let digits: String = line.chars().take_while(char::is_ascii_digit).collect();
        let id = match digits.parse::<u64>() {
            Ok(id) if id > 0 => id,
            _ => {
                log::debug!("Skipping YDK line '{}'", line);
                continue;
            }
        };

        match section {
            Some(Section::Main) => ydk.main.push(id),
            Some(Section::Extra) => ydk.extra.push(id),
            Some(Section::Side) => ydk.side.push(id),
            None => log::debug!("Card id {} outside of any section, ignoring", id),
        }
    }

    ydk
}

/// Builds a deck from YDK ids, attaching each zone against the catalog
pub fn deck_from_ydk(name: &str, ydk: &YdkData, catalog: &[CardData]) -> DeckList {
    DeckList {
        name: Some(name.to_string()),
        main: attach_quantities(&ydk.main, catalog),
        extra: attach_quantities(&ydk.extra, catalog),
        side: attach_quantities(&ydk.side, catalog),
    }
}

fn parse_text_line(line: &str) -> (u32, &str) {
    if let Some(caps) = PREFIX_QTY.captures(line) {
        return (parse_quantity(&caps[1]), caps.get(2).map_or("", |m| m.as_str()));
    }
    if let Some(caps) = SUFFIX_QTY.captures(line) {
        return (parse_quantity(&caps[2]), caps.get(1).map_or("", |m| m.as_str()));
    }
    if let Some(caps) = PAREN_QTY.captures(line) {
        return (parse_quantity(&caps[2]), caps.get(1).map_or("", |m| m.as_str()));
    }
    (1, line)
}

/// Parses a free-text deck list; every card lands in the main zone.
///
/// Understands "3x Name", "3 Name", "Name x3" and "Name (3)". Lines without a
/// quantity count as one copy.
pub fn parse_text_deck_list(name: &str, content: &str) -> DeckList {
    let mut cards = Vec::new();

    for line in content.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
            continue;
        }

        let (quantity, card_name) = parse_text_line(line);
        let card_name = card_name.trim();
        if card_name.is_empty() {
            continue;
        }

        cards.push(CardEntry::named(card_name, quantity));
    }

    DeckList {
        name: Some(name.to_string()),
        main: cards,
        extra: Vec::new(),
        side: Vec::new(),
    }
}

/// One row of a collection CSV export
#[derive(Debug, Deserialize)]
struct CollectionRow {
    cardname: String,
    #[serde(default)]
    cardq: String,
    #[serde(default)]
    cardrarity: String,
    #[serde(default)]
    cardset: String,
    #[serde(default)]
    cardcode: String,
    #[serde(default)]
    cardid: String,
}

/// Parses a collection CSV with at least a `cardname` column
pub fn parse_collection_csv(content: &str) -> Result<CollectionData> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        return Err(DeckCheckError::EmptyCsv);
    }
    if !headers.iter().any(|h| h == "cardname") {
        return Err(DeckCheckError::UnrecognizedCsv);
    }

    let mut cards = Vec::new();
    let mut rows = 0usize;

    for result in rdr.deserialize() {
        let row: CollectionRow = result?;
        rows += 1;

        if row.cardname.is_empty() {
            continue;
        }

        // Some exports put the count into the name ("3x Card Name")
        let name = match PREFIX_QTY.captures(&row.cardname) {
            Some(caps) => caps[2].to_string(),
            None => row.cardname.clone(),
        };

        let mut card = CardEntry::named(name, parse_quantity(&row.cardq));
        card.id = row.cardid.trim().parse().unwrap_or(0);
        card.owned = true;
        if !row.cardset.is_empty() {
            card.sets.push(CardSet {
                set_name: row.cardset,
                set_code: row.cardcode,
                set_rarity: row.cardrarity,
                ..Default::default()
            });
        }
        cards.push(card);
    }

    if rows == 0 {
        return Err(DeckCheckError::EmptyCsv);
    }

    log::info!("Parsed {} collection rows into {} cards", rows, cards.len());
    Ok(CollectionData::new(None, cards, ImportSource::Csv))
}

/// File name without its extension, used as the import's display name
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn read_validated(path: &Path, max_size: u64) -> Result<(FileType, String)> {
    let size = std::fs::metadata(path)?.len();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let file_type = validate_file(&file_name, size, max_size)?;
    let content = std::fs::read_to_string(path)?;
    Ok((file_type, content))
}

/// Reads and parses a collection CSV file, naming it after the file stem
pub fn read_collection_file(path: &Path, max_size: u64) -> Result<CollectionData> {
    log::info!("Importing collection from {}", path.display());

    let (file_type, content) = read_validated(path, max_size)?;
    if file_type != FileType::Csv {
        return Err(DeckCheckError::UnsupportedFileType(path.display().to_string()));
    }

    let mut collection = parse_collection_csv(&content)?;
    collection.name = Some(file_stem(path));
    Ok(collection)
}

/// A deck file after parsing; YDK decks still need a catalog lookup
#[derive(Debug, Clone, PartialEq)]
pub enum DeckSource {
    Ydk { name: String, ids: YdkData },
    Text(DeckList),
}

/// Reads a .ydk or .txt deck file. Other extensions are rejected before the
/// file is read, so extensionless files never reach content detection.
pub fn read_deck_file(path: &Path, max_size: u64) -> Result<DeckSource> {
    log::info!("Importing deck from {}", path.display());

    let (_, content) = read_validated(path, max_size)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let name = file_stem(path);

    match detect_file_type(&file_name, Some(&content)) {
        FileType::Ydk => Ok(DeckSource::Ydk {
            name,
            ids: parse_ydk(&content),
        }),
        FileType::Txt => Ok(DeckSource::Text(parse_text_deck_list(&name, &content))),
        _ => Err(DeckCheckError::UnsupportedFileType(file_name)),
    }
}

/// First non-blank vendor price, cardmarket before tcgplayer
fn export_price(card: &CardEntry) -> &str {
    let prices = match card.prices.as_ref() {
        Some(prices) => prices,
        None => return "0",
    };
    ["cardmarket_price", "tcgplayer_price"]
        .iter()
        .filter_map(|field| prices.get(*field))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
        .unwrap_or("0")
}

/// Exports cards as CSV: name, quantity, type, rarity, set, price
pub fn export_collection_csv(cards: &[CardEntry]) -> Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(vec![]);

    wtr.write_record(["Card Name", "Quantity", "Type", "Rarity", "Set", "Price"])?;

    for card in cards {
        let first_set = card.sets.first();
        let quantity = card.quantity.to_string();
        wtr.write_record([
            card.name.as_str(),
            quantity.as_str(),
            card.card_type.as_str(),
            first_set.map_or("", |s| s.set_rarity.as_str()),
            first_set.map_or("", |s| s.set_name.as_str()),
            export_price(card),
        ])?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| DeckCheckError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| DeckCheckError::InvalidInput(e.to_string()))
}

/// Exports missing cards as an "Nx Name" list with a dated header
pub fn export_missing_text(cards: &[CardEntry], date: NaiveDate) -> String {
    let mut lines = vec![
        "# Missing Cards List".to_string(),
        format!("# Generated on {}", date.format("%Y-%m-%d")),
        String::new(),
    ];
    lines.extend(cards.iter().map(|c| format!("{}x {}", c.quantity, c.name)));
    lines.join("\n")
}
