//! Submission limit handlers.
//!
//! The UI checks a limiter before sending a form and records the submission
//! only after the send was dispatched. Recording never refuses: the decision
//! was already made by the preceding check.

use actix_web::{HttpResponse, web};

use storefront_core::domain::LimitDecision;
use storefront_shared::ApiResponse;
use storefront_shared::dto::LimitStatusResponse;

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn to_response(name: &str, decision: &LimitDecision) -> LimitStatusResponse {
    LimitStatusResponse {
        limiter: name.to_string(),
        allowed: decision.allowed,
        remaining: decision.remaining,
        limit: decision.limit,
        period: decision.period.to_string(),
        resets_at: decision.resets_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        message: decision.message(),
    }
}

/// GET /api/limits/{name}
pub async fn status(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let name = path.into_inner();
    let limiter = state
        .limiter(&name)
        .ok_or_else(|| AppError::NotFound(format!("Unknown limiter '{}'", name)))?;

    let decision = limiter.check().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(to_response(&name, &decision))))
}

/// POST /api/limits/{name}/submissions
pub async fn record(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let name = path.into_inner();
    let limiter = state
        .limiter(&name)
        .ok_or_else(|| AppError::NotFound(format!("Unknown limiter '{}'", name)))?;

    let decision = limiter.record().await?;
    tracing::info!(
        limiter = %name,
        remaining = decision.remaining,
        "Submission recorded"
    );

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        to_response(&name, &decision),
        "Submission recorded",
    )))
}
