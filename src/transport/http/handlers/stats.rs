use crate::domain::views::StatsView;
use crate::transport::http::error::ApiError;
use crate::transport::http::extract::AuthUser;
use crate::transport::http::types::{respond, ApiResponse, AppState};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;

#[utoipa::path(
    get,
    path = "/api/me/stats",
    responses(
        (status = 200, description = "Finished books per genre and additions per month", body = StatsView),
        (status = 401, description = "Missing or invalid session", body = ApiResponse)
    ),
    security(("bearer" = []))
)]
pub async fn stats_handler(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Response, ApiError> {
    let stats = state.stats.stats(user_id).await?;
    Ok(respond(StatusCode::OK, stats))
}
