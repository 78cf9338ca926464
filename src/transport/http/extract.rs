use crate::domain::views::UserId;
use crate::transport::http::error::ApiError;
use crate::transport::http::types::AppState;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

/// The caller's user id, resolved from the `Authorization` header.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub UserId);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        Ok(AuthUser(state.guard.resolve(header)?))
    }
}
