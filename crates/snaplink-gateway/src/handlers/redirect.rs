use crate::error::{AppError, Result};
use crate::model::ResolveResponse;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use snaplink_core::{ShortCode, UrlCache};
use tracing::{trace, warn};

/// A malformed code can never name a mapping, so it is reported as not found.
fn parse_code(raw: &str) -> Result<ShortCode> {
    ShortCode::new(raw).map_err(|_| AppError::NotFound)
}

/// Authoritative lookup for remote redirectors. Answers from the mapping
/// store and primes the cache on the way out.
pub async fn resolve_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ResolveResponse>> {
    let code = parse_code(&short_code)?;

    let mapping = state
        .shortener()
        .find(&code)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Err(e) = state
        .cache()
        .set_url(&code, &mapping.long_url, state.cache_ttl())
        .await
    {
        warn!(code = %code, error = %e, "failed to prime cache from resolve endpoint");
    }

    Ok(Json(ResolveResponse {
        long_url: mapping.long_url,
    }))
}

pub async fn redirect_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    let code = parse_code(&short_code)?;
    let resolved = state.resolver().resolve(&code).await?;
    trace!(code = %code, source = ?resolved.source, "redirecting");

    Ok((StatusCode::FOUND, [(header::LOCATION, resolved.long_url)]).into_response())
}
