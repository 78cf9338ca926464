use crate::domain::catalog::CatalogPayload;
use crate::domain::status::ReadingStatus;
use crate::domain::views::{CollectionView, LibraryView};
use crate::domain::LedgerError;
use crate::transport::http::error::ApiError;
use crate::transport::http::extract::AuthUser;
use crate::transport::http::types::{
    json_422, respond, AddBookRequest, AddBooksToCollectionRequest, ApiResponse, AppState,
    BookAdded, CollectionCreated, CreateCollectionRequest, UpdateStatusRequest,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;

#[utoipa::path(
    get,
    path = "/api/me/books",
    responses(
        (status = 200, description = "Caller's library, sorted by title", body = Vec<LibraryView>),
        (status = 401, description = "Missing or invalid session", body = ApiResponse)
    ),
    security(("bearer" = []))
)]
pub async fn list_books_handler(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Response, ApiError> {
    let books = state.ledger.list_library(user_id).await?;
    Ok(respond(StatusCode::OK, books))
}

#[utoipa::path(
    post,
    path = "/api/me/books",
    request_body = AddBookRequest,
    responses(
        (status = 200, description = "Book added or updated", body = BookAdded),
        (status = 400, description = "Missing id or title, or unknown status", body = ApiResponse),
        (status = 401, description = "Missing or invalid session", body = ApiResponse),
        (status = 422, description = "Invalid JSON body", body = ApiResponse),
        (status = 502, description = "Catalog lookup failed", body = ApiResponse)
    ),
    security(("bearer" = []))
)]
pub async fn add_book_handler(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    request: Result<Json<AddBookRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return Ok(json_422(e, r#"{"googleId": "...", "title": "...", "status": "planned"}"#)),
    };
    let status = request.status()?;

    // Bare ids are completed from the catalog.
    let payload = if request.title.trim().is_empty() && !request.external_id().is_empty() {
        let summary = state.catalog.fetch_by_id(request.external_id()).await?;
        CatalogPayload::from(summary)
    } else {
        request.into_payload()
    };

    let book_id = state.ledger.add_or_update_book(user_id, payload, status).await?;
    Ok(respond(StatusCode::OK, BookAdded { book_id }))
}

#[utoipa::path(
    patch,
    path = "/api/me/books/status",
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse),
        (status = 400, description = "No book reference or unknown status", body = ApiResponse),
        (status = 404, description = "Book unknown", body = ApiResponse),
        (status = 409, description = "Book not in the caller's library", body = ApiResponse)
    ),
    security(("bearer" = []))
)]
pub async fn update_status_handler(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    request: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return Ok(json_422(e, r#"{"googleId": "...", "bookId": 0, "status": "reading"}"#)),
    };
    let book = request.book_ref()?;
    let status = ReadingStatus::parse_optional(Some(request.status.as_str()))?
        .ok_or_else(|| LedgerError::validation("status required"))?;

    state.ledger.set_status(user_id, book, status).await?;
    Ok(respond(StatusCode::OK, serde_json::json!({ "status": status })))
}

#[utoipa::path(
    get,
    path = "/api/me/collections",
    responses(
        (status = 200, description = "Caller's collections, sorted by name", body = Vec<CollectionView>),
        (status = 401, description = "Missing or invalid session", body = ApiResponse)
    ),
    security(("bearer" = []))
)]
pub async fn list_collections_handler(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Response, ApiError> {
    let collections = state.ledger.list_collections(user_id).await?;
    Ok(respond(StatusCode::OK, collections))
}

#[utoipa::path(
    post,
    path = "/api/me/collections",
    request_body = CreateCollectionRequest,
    responses(
        (status = 200, description = "Collection created or reused", body = CollectionCreated),
        (status = 400, description = "Empty name or book list", body = ApiResponse),
        (status = 409, description = "A book is not in the caller's library", body = ApiResponse)
    ),
    security(("bearer" = []))
)]
pub async fn create_collection_handler(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    request: Result<Json<CreateCollectionRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return Ok(json_422(e, r#"{"name": "...", "bookIds": [1, 2]}"#)),
    };
    let id = state
        .ledger
        .create_collection(user_id, &request.name, &request.book_ids)
        .await?;
    Ok(respond(StatusCode::OK, CollectionCreated { id }))
}

#[utoipa::path(
    post,
    path = "/api/me/collections/add-books",
    request_body = AddBooksToCollectionRequest,
    responses(
        (status = 200, description = "Books linked", body = ApiResponse),
        (status = 400, description = "Missing collection id or book list", body = ApiResponse),
        (status = 404, description = "Unknown catalog id", body = ApiResponse),
        (status = 409, description = "Foreign collection or book outside the library", body = ApiResponse)
    ),
    security(("bearer" = []))
)]
pub async fn add_books_to_collection_handler(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    request: Result<Json<AddBooksToCollectionRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return Ok(json_422(e, r#"{"collectionId": 1, "googleIds": ["..."]}"#)),
    };
    state
        .ledger
        .add_books_to_collection(user_id, request.collection_id, &request.google_ids)
        .await?;
    Ok(respond(StatusCode::OK, serde_json::json!({ "status": "ok" })))
}
