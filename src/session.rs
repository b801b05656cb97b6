//! Four-step import/compare/price workflow state.
//!
//! A `Session` is owned by whoever drives the workflow (the CLI, a test).
//! Steps unlock as their inputs arrive: a collection (possibly empty) opens
//! the deck step, a non-empty deck list opens the comparison, and a
//! comparison with missing cards opens price comparison.

use crate::collection::{merge_collection_lists, MergeOptions, Normalizer, SortPolicy};
use crate::models::{CardEntry, CollectionData, DeckList, ReconciliationResult};
use crate::reconcile::reconcile_sorted;
use serde::Serialize;

pub const STEP_IMPORT_COLLECTION: u8 = 1;
pub const STEP_ADD_DECK: u8 = 2;
pub const STEP_COMPARE: u8 = 3;
pub const STEP_PRICES: u8 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WizardStep {
    pub id: u8,
    pub title: &'static str,
    pub description: &'static str,
    pub is_complete: bool,
    pub is_accessible: bool,
}

fn initial_steps() -> Vec<WizardStep> {
    let step = |id: u8, title: &'static str, description: &'static str| WizardStep {
        id,
        title,
        description,
        is_complete: false,
        is_accessible: id == STEP_IMPORT_COLLECTION,
    };

    vec![
        step(
            STEP_IMPORT_COLLECTION,
            "Import Collection",
            "Upload your collection data from YGOPRODeck CSV or enter manually",
        ),
        step(
            STEP_ADD_DECK,
            "Add Deck List",
            "Upload YDK file or paste your desired deck list",
        ),
        step(
            STEP_COMPARE,
            "Compare Collection",
            "Compare your deck with your collection to find missing cards",
        ),
        step(
            STEP_PRICES,
            "Price Comparison",
            "View prices for missing cards and find the best deals",
        ),
    ]
}

#[derive(Debug, Clone)]
pub struct Session {
    current_step: u8,
    steps: Vec<WizardStep>,
    /// `None` until the user imports or skips; `Some(vec![])` is a deliberate
    /// empty collection
    collections: Option<Vec<CollectionData>>,
    decks: Vec<DeckList>,
    result: Option<ReconciliationResult>,
    is_loading: bool,
    error: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            current_step: STEP_IMPORT_COLLECTION,
            steps: initial_steps(),
            collections: None,
            decks: Vec::new(),
            result: None,
            is_loading: false,
            error: None,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    // ── step bookkeeping ────────────────────────────────────────────────

    fn step_mut(&mut self, id: u8) -> Option<&mut WizardStep> {
        self.steps.iter_mut().find(|step| step.id == id)
    }

    fn step(&self, id: u8) -> Option<&WizardStep> {
        self.steps.iter().find(|step| step.id == id)
    }

    fn set_complete(&mut self, id: u8, complete: bool) {
        if let Some(step) = self.step_mut(id) {
            step.is_complete = complete;
        }
    }

    fn unlock(&mut self, id: u8) {
        if let Some(step) = self.step_mut(id) {
            step.is_accessible = true;
        }
    }

    /// Locks and uncompletes every step after `id`
    fn lock_after(&mut self, id: u8) {
        for step in self.steps.iter_mut().filter(|step| step.id > id) {
            step.is_accessible = false;
            step.is_complete = false;
        }
        if self.current_step > id {
            self.current_step = id;
        }
    }

    /// New inputs make any earlier comparison stale
    fn invalidate_result(&mut self) {
        if self.result.take().is_some() {
            self.set_complete(STEP_COMPARE, false);
            self.lock_after(STEP_COMPARE);
        }
    }

    // ── collections ─────────────────────────────────────────────────────

    pub fn collections(&self) -> Option<&[CollectionData]> {
        self.collections.as_deref()
    }

    pub fn set_collections(&mut self, collections: Option<Vec<CollectionData>>) {
        self.invalidate_result();
        match collections {
            Some(list) => {
                log::debug!("Collection step complete with {} imports", list.len());
                self.collections = Some(list);
                self.set_complete(STEP_IMPORT_COLLECTION, true);
                self.unlock(STEP_ADD_DECK);
            }
            None => {
                self.collections = None;
                self.set_complete(STEP_IMPORT_COLLECTION, false);
                self.lock_after(STEP_IMPORT_COLLECTION);
            }
        }
    }

    pub fn add_collection(&mut self, collection: CollectionData) {
        let mut list = self.collections.take().unwrap_or_default();
        list.push(collection);
        self.set_collections(Some(list));
    }

    /// Removes the import at `index`. Removing the last import returns the
    /// session to "no collection yet".
    pub fn remove_collection(&mut self, index: usize) -> Option<CollectionData> {
        let mut list = self.collections.take()?;
        if index >= list.len() {
            self.collections = Some(list);
            return None;
        }

        let removed = list.remove(index);
        if list.is_empty() {
            self.set_collections(None);
        } else {
            self.set_collections(Some(list));
        }
        Some(removed)
    }

    /// Proceed without owning any cards
    pub fn skip_collection(&mut self) {
        self.set_collections(Some(Vec::new()));
    }

    // ── decks ───────────────────────────────────────────────────────────

    pub fn decks(&self) -> &[DeckList] {
        &self.decks
    }

    pub fn set_decks(&mut self, decks: Vec<DeckList>) {
        self.invalidate_result();
        self.decks = decks;
        if self.decks.is_empty() {
            self.set_complete(STEP_ADD_DECK, false);
            self.lock_after(STEP_ADD_DECK);
        } else {
            log::debug!("Deck step complete with {} decks", self.decks.len());
            self.set_complete(STEP_ADD_DECK, true);
            self.unlock(STEP_COMPARE);
        }
    }

    pub fn add_deck(&mut self, deck: DeckList) {
        let mut decks = std::mem::take(&mut self.decks);
        decks.push(deck);
        self.set_decks(decks);
    }

    pub fn remove_deck(&mut self, index: usize) -> Option<DeckList> {
        if index >= self.decks.len() {
            return None;
        }
        let mut decks = std::mem::take(&mut self.decks);
        let removed = decks.remove(index);
        self.set_decks(decks);
        Some(removed)
    }

    // ── comparison ──────────────────────────────────────────────────────

    /// Reconciles every deck against the merged collections and stores the
    /// result. Price comparison unlocks when anything is missing.
    pub fn compare(&mut self, sort: SortPolicy) -> &ReconciliationResult {
        let owned = self.collections.as_deref().map(|collections| {
            let options = MergeOptions::new(Normalizer::CaseInsensitive, SortPolicy::None);
            merge_collection_lists(collections, &options)
        });

        let result = reconcile_sorted(
            self.decks.iter().flat_map(|deck| deck.zones()),
            owned.as_deref(),
            sort,
        );

        log::info!(
            "Compared {} decks: {} of {} cards owned ({}%)",
            self.decks.len(),
            result.stats.total_owned,
            result.stats.total_required,
            result.stats.completion_percentage
        );

        self.set_complete(STEP_COMPARE, true);
        if result.missing.is_empty() {
            self.lock_after(STEP_COMPARE);
        } else {
            self.unlock(STEP_PRICES);
        }

        self.result.insert(result)
    }

    pub fn result(&self) -> Option<&ReconciliationResult> {
        self.result.as_ref()
    }

    pub fn missing_cards(&self) -> &[CardEntry] {
        self.result
            .as_ref()
            .map(|result| result.missing.as_slice())
            .unwrap_or(&[])
    }

    /// Marks the price step as visited
    pub fn complete_prices(&mut self) {
        if self.step(STEP_PRICES).is_some_and(|step| step.is_accessible) {
            self.set_complete(STEP_PRICES, true);
        }
    }

    // ── navigation ──────────────────────────────────────────────────────

    pub fn current_step(&self) -> u8 {
        self.current_step
    }

    pub fn steps(&self) -> &[WizardStep] {
        &self.steps
    }

    pub fn current_wizard_step(&self) -> Option<&WizardStep> {
        self.step(self.current_step)
    }

    /// Moves forward when the next step is unlocked. Returns whether it moved.
    pub fn next_step(&mut self) -> bool {
        if self.can_go_next() {
            self.current_step += 1;
            true
        } else {
            false
        }
    }

    pub fn prev_step(&mut self) -> bool {
        if self.can_go_back() {
            self.current_step -= 1;
            true
        } else {
            false
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.current_step > STEP_IMPORT_COLLECTION
    }

    pub fn can_go_next(&self) -> bool {
        self.step(self.current_step + 1)
            .is_some_and(|step| step.is_accessible)
    }

    /// Whether the current step is complete
    pub fn can_proceed(&self) -> bool {
        self.current_wizard_step()
            .is_some_and(|step| step.is_complete)
    }

    /// Completed steps as a rounded percentage
    pub fn progress(&self) -> u8 {
        let total = self.steps.len();
        if total == 0 {
            return 0;
        }
        let completed = self.steps.iter().filter(|step| step.is_complete).count();
        ((completed * 200 + total) / (2 * total)) as u8
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // ── loading / error ─────────────────────────────────────────────────

    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn set_error(&mut self, error: Option<String>) {
        if let Some(message) = &error {
            log::warn!("{}", message);
        }
        self.error = error;
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
