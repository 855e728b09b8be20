//! Autocomplete list state.
//!
//! [`SuggestionState`] holds everything the UI renders for one input field and
//! the pure transitions between its phases. Timers and the asynchronous lookup
//! live in infrastructure; they talk to this state through generation numbers,
//! so a lookup that was scheduled before the latest keystroke can never apply
//! its results.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A candidate completion returned by a suggestion source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Suggestion {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Tuning for one suggestion engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionConfig {
    /// Queries shorter than this (in characters) never trigger a lookup.
    pub min_chars: usize,
    /// Quiet time required before a lookup is dispatched.
    pub debounce: Duration,
    /// Results beyond this count are dropped.
    pub max_suggestions: usize,
}

impl SuggestionConfig {
    pub fn new(
        min_chars: usize,
        debounce: Duration,
        max_suggestions: usize,
    ) -> Result<Self, DomainError> {
        if max_suggestions == 0 {
            return Err(DomainError::InvalidConfig(
                "max_suggestions must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            min_chars,
            debounce,
            max_suggestions,
        })
    }
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            min_chars: 2,
            debounce: Duration::from_millis(300),
            max_suggestions: 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionPhase {
    /// Query below the minimum length, nothing scheduled.
    #[default]
    Idle,
    /// A lookup is scheduled or in flight.
    Debouncing,
    /// Suggestions are populated and shown.
    Open,
    /// The list was closed by selection, escape, blur, an empty result or a failed lookup.
    Closed,
}

/// Keys the suggestion list reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavKey {
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
}

impl FromStr for NavKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ArrowDown" | "Down" => Ok(NavKey::ArrowDown),
            "ArrowUp" | "Up" => Ok(NavKey::ArrowUp),
            "Enter" => Ok(NavKey::Enter),
            "Escape" | "Esc" => Ok(NavKey::Escape),
            other => Err(DomainError::Validation(format!("unsupported key '{other}'"))),
        }
    }
}

/// What the caller has to do after an input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// Query too short; the list was reset and nothing needs scheduling.
    BelowMinimum,
    /// Schedule a lookup for `query` tagged with `generation`.
    Schedule { generation: u64, query: String },
}

/// Read-only view handed to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionSnapshot {
    pub query: String,
    pub suggestions: Vec<Suggestion>,
    pub is_open: bool,
    pub selected_index: Option<usize>,
    pub phase: SuggestionPhase,
}

/// State of one autocomplete field.
///
/// Invariants: `selected` always indexes into `suggestions`, and a closed list
/// has no selection.
#[derive(Debug, Clone, Default)]
pub struct SuggestionState {
    raw_query: String,
    last_dispatched: Option<String>,
    /// Generation of a dispatched lookup whose outcome has not been applied.
    in_flight: Option<u64>,
    suggestions: Vec<Suggestion>,
    is_open: bool,
    selected: Option<usize>,
    phase: SuggestionPhase,
    generation: u64,
}

impl SuggestionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.raw_query
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn phase(&self) -> SuggestionPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn last_dispatched(&self) -> Option<&str> {
        self.last_dispatched.as_deref()
    }

    pub fn snapshot(&self) -> SuggestionSnapshot {
        SuggestionSnapshot {
            query: self.raw_query.clone(),
            suggestions: self.suggestions.clone(),
            is_open: self.is_open,
            selected_index: self.selected,
            phase: self.phase,
        }
    }

    /// Record a keystroke. Every call out-dates whatever was scheduled before.
    pub fn input(&mut self, query: &str, config: &SuggestionConfig) -> InputOutcome {
        self.raw_query = query.to_string();
        self.outdate();

        if query.chars().count() < config.min_chars {
            self.suggestions.clear();
            self.close();
            self.last_dispatched = None;
            self.phase = SuggestionPhase::Idle;
            return InputOutcome::BelowMinimum;
        }

        self.phase = SuggestionPhase::Debouncing;
        InputOutcome::Schedule {
            generation: self.generation,
            query: query.to_string(),
        }
    }

    /// Called when the debounce timer for `generation` fires.
    ///
    /// Returns `true` when the caller should query the source. A query equal
    /// to the last dispatched one is skipped and the current list kept.
    pub fn begin_lookup(&mut self, generation: u64, query: &str) -> bool {
        if generation != self.generation {
            return false;
        }

        if self.last_dispatched.as_deref() == Some(query) {
            self.phase = if self.is_open {
                SuggestionPhase::Open
            } else {
                SuggestionPhase::Closed
            };
            return false;
        }

        self.last_dispatched = Some(query.to_string());
        self.in_flight = Some(generation);
        true
    }

    /// Apply lookup results. Returns `false` if they were stale and dropped.
    pub fn apply_results(
        &mut self,
        generation: u64,
        mut results: Vec<Suggestion>,
        max_suggestions: usize,
    ) -> bool {
        if generation != self.generation {
            return false;
        }

        self.in_flight = None;
        results.truncate(max_suggestions);
        self.suggestions = results;
        self.is_open = !self.suggestions.is_empty();
        self.selected = None;
        self.phase = if self.is_open {
            SuggestionPhase::Open
        } else {
            SuggestionPhase::Closed
        };
        true
    }

    /// Apply a failed lookup. Returns `false` if the lookup was stale.
    ///
    /// The dedup guard is cleared so the same query can be retried.
    pub fn apply_failure(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }

        self.in_flight = None;
        self.suggestions.clear();
        self.close();
        self.last_dispatched = None;
        self.phase = SuggestionPhase::Closed;
        true
    }

    /// Keyboard navigation. Only `Enter` on a selected row yields a value,
    /// and it leaves the state untouched.
    pub fn key(&mut self, key: NavKey) -> Option<Suggestion> {
        if !self.is_open {
            return None;
        }

        let last = self.suggestions.len().checked_sub(1);
        match key {
            NavKey::ArrowDown => {
                self.selected = match (self.selected, last) {
                    (_, None) => None,
                    (None, Some(_)) => Some(0),
                    (Some(i), Some(last)) => Some((i + 1).min(last)),
                };
                None
            }
            NavKey::ArrowUp => {
                self.selected = self.selected.and_then(|i| i.checked_sub(1));
                None
            }
            NavKey::Enter => self.selected.and_then(|i| self.suggestions.get(i).cloned()),
            NavKey::Escape => {
                self.dismiss();
                None
            }
        }
    }

    /// Close the list after the user picked `suggestion`.
    pub fn select(&mut self, suggestion: Suggestion) -> Suggestion {
        self.suggestions.clear();
        self.dismiss();
        suggestion
    }

    /// Close and clear the list, e.g. when the field loses focus.
    pub fn blur(&mut self) {
        self.suggestions.clear();
        self.dismiss();
    }

    /// Out-date anything scheduled without touching what is displayed.
    pub fn cancel_pending(&mut self) {
        self.outdate();
        if self.phase == SuggestionPhase::Debouncing {
            self.phase = SuggestionPhase::Idle;
        }
    }

    /// Explicit closure. Suggestions are kept for the caller to clear.
    fn dismiss(&mut self) {
        self.close();
        self.last_dispatched = None;
        self.outdate();
        self.phase = SuggestionPhase::Closed;
    }

    /// Invalidate every scheduled or running lookup. A lookup that was
    /// dispatched but never applied leaves nothing on screen for its query,
    /// so the dedup guard must not hold it back.
    fn outdate(&mut self) {
        self.generation += 1;
        if self.in_flight.take().is_some() {
            self.last_dispatched = None;
        }
    }

    fn close(&mut self) {
        self.is_open = false;
        self.selected = None;
    }
}
