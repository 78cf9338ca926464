use crate::domain::catalog::BookSummary;
use crate::domain::LedgerError;
use crate::infra::catalog_client::DEFAULT_MAX_RESULTS;
use crate::transport::http::error::ApiError;
use crate::transport::http::types::{respond, ApiResponse, AppState, SearchQuery};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;

/// Largest page the volumes API serves.
pub const MAX_RESULTS_CAP: u32 = 40;

pub fn clamp_max(requested: Option<u32>) -> u32 {
    match requested {
        Some(0) | None => DEFAULT_MAX_RESULTS,
        Some(n) => n.min(MAX_RESULTS_CAP),
    }
}

#[utoipa::path(
    get,
    path = "/api/books/google",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching catalog records", body = Vec<BookSummary>),
        (status = 400, description = "Empty query", body = ApiResponse),
        (status = 502, description = "Catalog unavailable", body = ApiResponse)
    )
)]
pub async fn search_handler(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Response, ApiError> {
    let q = query.q.trim();
    if q.is_empty() {
        return Err(LedgerError::validation("q required").into());
    }
    let books = state.catalog.search(q, clamp_max(query.max)).await?;
    Ok(respond(StatusCode::OK, books))
}

#[utoipa::path(
    get,
    path = "/api/books/google/{id}",
    params(
        ("id" = String, Path, description = "Catalog volume id")
    ),
    responses(
        (status = 200, description = "Catalog record", body = BookSummary),
        (status = 400, description = "Malformed id", body = ApiResponse),
        (status = 502, description = "Catalog unavailable", body = ApiResponse)
    )
)]
pub async fn fetch_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let book = state.catalog.fetch_by_id(&id).await?;
    Ok(respond(StatusCode::OK, book))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_results_defaults_and_caps() {
        assert_eq!(clamp_max(None), 12);
        assert_eq!(clamp_max(Some(0)), 12);
        assert_eq!(clamp_max(Some(5)), 5);
        assert_eq!(clamp_max(Some(500)), 40);
    }
}
