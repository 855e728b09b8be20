//! Product suggestion lookup.

use actix_web::{HttpResponse, web};

use storefront_core::ErrorKind;
use storefront_core::ports::ErrorReport;
use storefront_shared::dto::{SearchQuery, SearchResponse, SuggestionItem};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/products/search?q=<query>&limit=<n>
///
/// Queries shorter than the configured minimum return no suggestions.
pub async fn search(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> AppResult<HttpResponse> {
    let SearchQuery { q, limit } = query.into_inner();
    let config = &state.suggestions;

    let limit = match limit {
        Some(0) => return Err(AppError::BadRequest("limit must be at least 1".to_string())),
        Some(n) => n.min(config.max_suggestions),
        None => config.max_suggestions,
    };

    if q.trim().chars().count() < config.min_chars {
        return Ok(HttpResponse::Ok().json(SearchResponse {
            query: q,
            suggestions: Vec::new(),
        }));
    }

    let results = match state.catalog.search(&q).await {
        Ok(results) => results,
        Err(e) => {
            state.reporter.report(
                ErrorReport::new(ErrorKind::LookupFailed, e.to_string()).with_context(q.clone()),
            );
            return Err(e.into());
        }
    };

    let suggestions = results
        .into_iter()
        .take(limit)
        .map(|s| SuggestionItem {
            id: s.id,
            label: s.label,
            category: s.category,
        })
        .collect();

    Ok(HttpResponse::Ok().json(SearchResponse { query: q, suggestions }))
}
