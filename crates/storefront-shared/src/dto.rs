//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Serialize};

/// Permission state of one submission limiter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitStatusResponse {
    pub limiter: String,
    pub allowed: bool,
    pub remaining: u32,
    pub limit: u32,
    /// `daily` or `weekly`.
    pub period: String,
    /// Local time the next window opens, `YYYY-MM-DDTHH:MM:SS`.
    pub resets_at: String,
    /// Text the UI shows next to the submit button.
    pub message: String,
}

/// Query string of `GET /api/products/search`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionItem {
    pub id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub suggestions: Vec<SuggestionItem>,
}
