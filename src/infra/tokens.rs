//! Session token capability.
//!
//! Tokens are `<claims>.<tag>`: base64url JSON claims followed by a keyed
//! BLAKE2b tag over the encoded claims.

use crate::domain::error::{LedgerError, LedgerResult};
use crate::domain::views::UserId;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use blake2::digest::consts::U32;
use blake2::digest::Mac;
use blake2::Blake2bMac;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::Duration;

type TokenMac = Blake2bMac<U32>;

pub trait TokenCodec: Send + Sync {
    fn issue(&self, user_id: UserId) -> LedgerResult<String>;

    /// Returns the user the token was issued to, or `None` if it is malformed,
    /// forged or expired.
    fn verify(&self, token: &str) -> Option<UserId>;
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: i64,
    iat: i64,
    exp: i64,
}

pub struct SignedTokenCodec {
    key: [u8; 32],
    ttl: Duration,
}

impl SignedTokenCodec {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut key = [0u8; 32];
        key.copy_from_slice(&Sha256::digest(secret.as_bytes()));
        Self { key, ttl }
    }

    fn mac(&self) -> LedgerResult<TokenMac> {
        TokenMac::new_from_slice(&self.key)
            .map_err(|e| LedgerError::Internal(format!("token key rejected: {}", e)))
    }

    pub fn issue_at(&self, user_id: UserId, now: i64) -> LedgerResult<String> {
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            sub: user_id.0,
            iat: now,
            exp: now.saturating_add(ttl),
        };
        let json = serde_json::to_vec(&claims)
            .map_err(|e| LedgerError::Internal(format!("token encode failed: {}", e)))?;
        let body = URL_SAFE_NO_PAD.encode(json);

        let mut mac = self.mac()?;
        mac.update(body.as_bytes());
        let tag = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(format!("{}.{}", body, tag))
    }

    pub fn verify_at(&self, token: &str, now: i64) -> Option<UserId> {
        let (body, tag) = token.split_once('.')?;
        let tag = URL_SAFE_NO_PAD.decode(tag).ok()?;

        let mut mac = self.mac().ok()?;
        mac.update(body.as_bytes());
        mac.verify_slice(&tag).ok()?;

        let json = URL_SAFE_NO_PAD.decode(body).ok()?;
        let claims: Claims = serde_json::from_slice(&json).ok()?;
        if claims.exp <= now || claims.sub <= 0 {
            return None;
        }
        Some(UserId(claims.sub))
    }
}

impl TokenCodec for SignedTokenCodec {
    fn issue(&self, user_id: UserId) -> LedgerResult<String> {
        self.issue_at(user_id, Utc::now().timestamp())
    }

    fn verify(&self, token: &str) -> Option<UserId> {
        self.verify_at(token, Utc::now().timestamp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = 24 * 60 * 60;

    fn codec() -> SignedTokenCodec {
        SignedTokenCodec::new("test-secret-0123456789", Duration::from_secs(30 * DAY as u64))
    }

    #[test]
    fn issued_token_verifies_to_same_user() {
        let codec = codec();
        let token = codec.issue(UserId(42)).unwrap();
        assert_eq!(codec.verify(&token), Some(UserId(42)));
    }

    #[test]
    fn token_expires_after_thirty_days() {
        let codec = codec();
        let token = codec.issue_at(UserId(1), 1_000).unwrap();
        assert_eq!(codec.verify_at(&token, 1_000 + 29 * DAY), Some(UserId(1)));
        assert_eq!(codec.verify_at(&token, 1_000 + 30 * DAY), None);
    }

    #[test]
    fn tampered_or_foreign_tokens_are_rejected() {
        let codec = codec();
        let token = codec.issue_at(UserId(1), 1_000).unwrap();
        let (_, tag) = token.split_once('.').unwrap();

        let forged_claims = URL_SAFE_NO_PAD.encode(br#"{"sub":2,"iat":1000,"exp":99999999999}"#);
        assert_eq!(codec.verify_at(&format!("{}.{}", forged_claims, tag), 2_000), None);

        let other = SignedTokenCodec::new("another-secret-987654", Duration::from_secs(60));
        assert_eq!(other.verify_at(&token, 1_001), None);

        assert_eq!(codec.verify_at("garbage", 1_001), None);
        assert_eq!(codec.verify_at("", 1_001), None);
    }
}
