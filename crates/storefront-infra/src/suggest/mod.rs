//! Debounced suggestion engine.

mod engine;

pub use engine::SuggestionEngine;
