use crate::domain::error::LedgerError;
use crate::transport::http::types::ApiResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// A `LedgerError` on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub LedgerError);

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError(err)
    }
}

pub fn status_for(err: &LedgerError) -> StatusCode {
    match err {
        LedgerError::Validation(_) => StatusCode::BAD_REQUEST,
        LedgerError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
        LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
        LedgerError::Conflict(_) => StatusCode::CONFLICT,
        LedgerError::Storage(_) | LedgerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        LedgerError::DeadlineExceeded => StatusCode::SERVICE_UNAVAILABLE,
        LedgerError::Catalog(_) => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = status_for(&err);
        let message = if err.is_server_side() {
            tracing::error!(code = err.code(), error = %err, "request failed");
            match &err {
                LedgerError::DeadlineExceeded => "storage deadline exceeded".to_string(),
                LedgerError::Catalog(_) => "catalog unavailable".to_string(),
                _ => "internal server error".to_string(),
            }
        } else {
            err.to_string()
        };
        (status, Json(ApiResponse::failure(err.code(), message))).into_response()
    }
}
