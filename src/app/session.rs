//! Session Guard: turns an `Authorization` header into a user id.

use crate::domain::error::{LedgerError, LedgerResult};
use crate::domain::views::UserId;
use crate::infra::tokens::TokenCodec;
use std::sync::Arc;

pub const BEARER_PREFIX: &str = "Bearer ";

#[derive(Clone)]
pub struct SessionGuard {
    tokens: Arc<dyn TokenCodec>,
}

impl SessionGuard {
    pub fn new(tokens: Arc<dyn TokenCodec>) -> Self {
        Self { tokens }
    }

    /// Accepts only `Bearer <token>` with a valid, unexpired token.
    pub fn resolve(&self, header: Option<&str>) -> LedgerResult<UserId> {
        let header = header.map(str::trim).unwrap_or_default();
        if header.is_empty() {
            return Err(LedgerError::unauthenticated("missing Authorization"));
        }
        let token = header
            .strip_prefix(BEARER_PREFIX)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| LedgerError::unauthenticated("invalid Authorization"))?;

        self.tokens
            .verify(token)
            .ok_or_else(|| LedgerError::unauthenticated("invalid token"))
    }
}
