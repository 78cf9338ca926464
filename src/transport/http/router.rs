use crate::domain::catalog::BookSummary;
use crate::domain::status::ReadingStatus;
use crate::domain::views::{
    AuthSession, BookId, CollectionId, CollectionView, GenreStat, LibraryView, MonthStat,
    ReviewId, ReviewView, StatsView, UserId, UserProfile,
};
use crate::transport::http::handlers::{auth, catalog, health, library, reviews, stats};
use crate::transport::http::types::{
    AddBookRequest, AddBooksToCollectionRequest, ApiResponse, AppState, BookAdded,
    CollectionCreated, CreateCollectionRequest, CreateReviewRequest, LoginRequest, NameUpdated,
    RegisterRequest, UpdatePasswordRequest, UpdateProfileRequest, UpdateStatusRequest,
};
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        catalog::search_handler,
        catalog::fetch_handler,
        auth::register_handler,
        auth::login_handler,
        auth::me_handler,
        auth::update_profile_handler,
        auth::update_password_handler,
        library::list_books_handler,
        library::add_book_handler,
        library::update_status_handler,
        library::list_collections_handler,
        library::create_collection_handler,
        library::add_books_to_collection_handler,
        reviews::list_reviews_handler,
        reviews::create_review_handler,
        stats::stats_handler
    ),
    components(schemas(
        ApiResponse,
        UserId,
        BookId,
        CollectionId,
        ReviewId,
        ReadingStatus,
        UserProfile,
        AuthSession,
        BookSummary,
        LibraryView,
        CollectionView,
        ReviewView,
        GenreStat,
        MonthStat,
        StatsView,
        RegisterRequest,
        LoginRequest,
        UpdateProfileRequest,
        UpdatePasswordRequest,
        AddBookRequest,
        UpdateStatusRequest,
        CreateCollectionRequest,
        AddBooksToCollectionRequest,
        CreateReviewRequest,
        BookAdded,
        CollectionCreated,
        NameUpdated
    )),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::healthcheck_handler))
        .route("/api/books/google", get(catalog::search_handler))
        .route("/api/books/google/:id", get(catalog::fetch_handler))
        .route(
            "/api/books/reviews/:google_id",
            get(reviews::list_reviews_handler).post(reviews::create_review_handler),
        )
        .route("/api/auth/register", post(auth::register_handler))
        .route("/api/auth/login", post(auth::login_handler))
        .route("/api/auth/me", get(auth::me_handler))
        .route("/api/me/profile", patch(auth::update_profile_handler))
        .route("/api/me/password", patch(auth::update_password_handler))
        .route(
            "/api/me/books",
            get(library::list_books_handler).post(library::add_book_handler),
        )
        .route("/api/me/books/status", patch(library::update_status_handler))
        .route(
            "/api/me/collections",
            get(library::list_collections_handler).post(library::create_collection_handler),
        )
        .route(
            "/api/me/collections/add-books",
            post(library::add_books_to_collection_handler),
        )
        .route("/api/me/stats", get(stats::stats_handler))
        .with_state(app_state)
}

/// The full service: routes, Swagger UI, CORS, request tracing and the
/// per-request deadline.
pub fn build_app(app_state: AppState, request_timeout: Duration) -> Router {
    let router = create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));
    with_service_layers(router, request_timeout)
}

fn with_service_layers(router: Router, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .layer(TimeoutLayer::new(request_timeout))
        .layer(middleware::map_response(timeout_envelope))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Gives the bare 408 from `TimeoutLayer` the usual failure envelope.
async fn timeout_envelope(response: Response) -> Response {
    if response.status() != StatusCode::REQUEST_TIMEOUT {
        return response;
    }
    (
        StatusCode::REQUEST_TIMEOUT,
        Json(ApiResponse::failure("request_timeout", "request timed out")),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    async fn slow() -> &'static str {
        tokio::time::sleep(Duration::from_secs(5)).await;
        "late"
    }

    #[tokio::test]
    async fn request_deadline_answers_with_the_envelope() {
        let router = Router::new()
            .route("/slow", get(slow))
            .route("/fast", get(|| async { "ok" }));
        let app = with_service_layers(router, Duration::from_millis(50));

        let resp = app
            .clone()
            .oneshot(Request::builder().uri("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::REQUEST_TIMEOUT);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "request_timeout");

        let resp = app
            .oneshot(Request::builder().uri("/fast").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
