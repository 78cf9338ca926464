use crate::domain::views::ReviewView;
use crate::transport::http::error::ApiError;
use crate::transport::http::extract::AuthUser;
use crate::transport::http::types::{json_422, respond, ApiResponse, AppState, CreateReviewRequest};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;

#[utoipa::path(
    get,
    path = "/api/books/reviews/{googleId}",
    params(
        ("googleId" = String, Path, description = "Catalog id of the book")
    ),
    responses(
        (status = 200, description = "Reviews, newest first", body = Vec<ReviewView>),
        (status = 404, description = "Book unknown", body = ApiResponse)
    )
)]
pub async fn list_reviews_handler(
    State(state): State<AppState>,
    Path(google_id): Path<String>,
) -> Result<Response, ApiError> {
    let book_id = state.ledger.resolve_book(&google_id).await?;
    let reviews = state.ledger.list_reviews(book_id).await?;
    Ok(respond(StatusCode::OK, reviews))
}

#[utoipa::path(
    post,
    path = "/api/books/reviews/{googleId}",
    params(
        ("googleId" = String, Path, description = "Catalog id of the book")
    ),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review stored", body = ReviewView),
        (status = 400, description = "Rating out of range or empty text", body = ApiResponse),
        (status = 401, description = "Missing or invalid session", body = ApiResponse),
        (status = 404, description = "Book unknown", body = ApiResponse)
    ),
    security(("bearer" = []))
)]
pub async fn create_review_handler(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(google_id): Path<String>,
    request: Result<Json<CreateReviewRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return Ok(json_422(e, r#"{"rating": 5, "text": "..."}"#)),
    };
    let book_id = state.ledger.resolve_book(&google_id).await?;
    let review = state
        .ledger
        .upsert_review(user_id, book_id, request.rating, &request.text)
        .await?;
    Ok(respond(StatusCode::CREATED, review))
}
