use crate::app::{AuthService, BookRef, IdentityStore, LibraryLedger, SessionGuard, StatsReporter};
use crate::domain::catalog::CatalogPayload;
use crate::domain::error::LedgerResult;
use crate::domain::status::ReadingStatus;
use crate::domain::views::{BookId, CollectionId};
use crate::infra::catalog_client::{CatalogClient, GoogleBooksClient};
use crate::infra::config::Config;
use crate::infra::credentials::BcryptHasher;
use crate::infra::tokens::{SignedTokenCodec, TokenCodec};
use crate::storage::Store;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub ledger: Arc<LibraryLedger>,
    pub stats: Arc<StatsReporter>,
    pub guard: Arc<SessionGuard>,
    pub catalog: Arc<dyn CatalogClient>,
    pub store: Store,
}

impl AppState {
    /// Wires every component onto one store handle.
    pub fn from_config(config: &Config, store: Store) -> anyhow::Result<Self> {
        let tokens: Arc<dyn TokenCodec> =
            Arc::new(SignedTokenCodec::new(&config.token_secret, config.token_ttl));
        let identity = IdentityStore::new(store.clone());
        let catalog = GoogleBooksClient::new(config.catalog_base_url.clone(), config.catalog_timeout)?;

        Ok(AppState {
            auth: Arc::new(AuthService::new(
                identity.clone(),
                Arc::new(BcryptHasher::new(config.bcrypt_cost)),
                tokens.clone(),
            )),
            ledger: Arc::new(LibraryLedger::new(store.clone(), identity)),
            stats: Arc::new(StatsReporter::new(store.clone())),
            guard: Arc::new(SessionGuard::new(tokens)),
            catalog: Arc::new(catalog),
            store,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Stable machine-readable reason, set on failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ApiResponse {
    pub fn ok<T: Serialize>(data: T) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => ApiResponse {
                success: true,
                data: Some(value),
                error: None,
                code: None,
            },
            Err(e) => ApiResponse::failure("internal", format!("response encoding failed: {}", e)),
        }
    }

    pub fn failure(code: &str, error: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(error.into()),
            code: Some(code.to_string()),
        }
    }
}

/// Serializes `data` into a success envelope with the given status.
pub fn respond<T: Serialize>(status: StatusCode, data: T) -> Response {
    (status, Json(ApiResponse::ok(data))).into_response()
}

pub fn json_422(err: JsonRejection, expected: &str) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiResponse::failure(
            "invalid_json",
            format!("Invalid JSON body: {} (expected: {})", err, expected),
        )),
    )
        .into_response()
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct UpdateProfileRequest {
    pub name: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct UpdatePasswordRequest {
    pub password: String,
}

/// A catalog record to add to the caller's library.
///
/// Only the external id is required. When `title` is missing the record is
/// fetched from the catalog first.
#[derive(Deserialize, Debug, Default, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct AddBookRequest {
    pub google_id: String,
    /// Alias of `googleId`, as returned by the catalog search.
    pub id: String,
    pub title: String,
    pub author: String,
    pub cover_url: String,
    pub description: String,
    pub categories: Vec<String>,
    pub published_year: Option<i32>,
    pub page_count: Option<i32>,
    pub maturity: String,
    pub status: Option<String>,
}

impl AddBookRequest {
    pub fn external_id(&self) -> &str {
        match self.google_id.trim() {
            "" => self.id.trim(),
            id => id,
        }
    }

    pub fn status(&self) -> LedgerResult<Option<ReadingStatus>> {
        ReadingStatus::parse_optional(self.status.as_deref())
    }

    pub fn into_payload(self) -> CatalogPayload {
        CatalogPayload {
            external_id: self.external_id().to_string(),
            title: self.title,
            author: self.author,
            cover_url: self.cover_url,
            description: self.description,
            published_year: self.published_year,
            page_count: self.page_count,
            maturity_tag: self.maturity,
            category_paths: self.categories,
        }
    }
}

#[derive(Deserialize, Debug, Default, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub google_id: String,
    pub book_id: Option<BookId>,
    pub status: String,
}

impl UpdateStatusRequest {
    pub fn book_ref(&self) -> LedgerResult<BookRef> {
        BookRef::from_parts(self.book_id, Some(self.google_id.as_str()))
    }
}

#[derive(Deserialize, Debug, Default, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateCollectionRequest {
    pub name: String,
    pub book_ids: Vec<BookId>,
}

#[derive(Deserialize, Debug, Default, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct AddBooksToCollectionRequest {
    pub collection_id: CollectionId,
    pub google_ids: Vec<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct CreateReviewRequest {
    pub rating: i32,
    pub text: String,
}

#[derive(Deserialize, Debug, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Free-text catalog query.
    #[serde(default)]
    pub q: String,
    /// Result cap, 1..=40. Defaults to 12.
    pub max: Option<u32>,
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookAdded {
    pub book_id: BookId,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct CollectionCreated {
    pub id: CollectionId,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct NameUpdated {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_book_request_accepts_id_alias() {
        let req: AddBookRequest =
            serde_json::from_str(r#"{"id":" vol1 ","title":"Dune","pageCount":412}"#).unwrap();
        assert_eq!(req.external_id(), "vol1");
        let payload = req.into_payload();
        assert_eq!(payload.external_id, "vol1");
        assert_eq!(payload.page_count, Some(412));
    }

    #[test]
    fn empty_status_means_unchanged() {
        let req: AddBookRequest = serde_json::from_str(r#"{"googleId":"g","status":""}"#).unwrap();
        assert_eq!(req.status().unwrap(), None);
        let req: AddBookRequest = serde_json::from_str(r#"{"googleId":"g","status":"done"}"#).unwrap();
        assert!(req.status().is_err());
    }

    #[test]
    fn failure_envelope_omits_data() {
        let body = serde_json::to_value(ApiResponse::failure("conflict", "nope")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"success": false, "error": "nope", "code": "conflict"})
        );
    }
}
