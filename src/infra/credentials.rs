//! Password digest capability.

use crate::domain::error::{LedgerError, LedgerResult};
use async_trait::async_trait;

/// Shortest accepted password, after trimming.
pub const MIN_PASSWORD_LEN: usize = 6;

#[async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash(&self, plaintext: &str) -> LedgerResult<String>;

    async fn verify(&self, digest: &str, plaintext: &str) -> LedgerResult<bool>;
}

/// Trims a candidate password and enforces the minimum length.
pub fn validate_password(raw: &str) -> LedgerResult<&str> {
    let password = raw.trim();
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(LedgerError::validation(format!(
            "password must be at least {} chars",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(password)
}

/// bcrypt digests, computed on the blocking pool.
#[derive(Debug, Clone)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

#[async_trait]
impl CredentialHasher for BcryptHasher {
    async fn hash(&self, plaintext: &str) -> LedgerResult<String> {
        let plaintext = plaintext.to_owned();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(plaintext, cost))
            .await
            .map_err(|e| LedgerError::Internal(format!("hash task failed: {}", e)))?
            .map_err(|e| LedgerError::Internal(format!("hash error: {}", e)))
    }

    async fn verify(&self, digest: &str, plaintext: &str) -> LedgerResult<bool> {
        let plaintext = plaintext.to_owned();
        let digest = digest.to_owned();
        let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(plaintext, &digest))
            .await
            .map_err(|e| LedgerError::Internal(format!("verify task failed: {}", e)))?;
        // A digest bcrypt cannot parse simply does not match.
        Ok(outcome.unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_is_trimmed_before_length_check() {
        assert_eq!(validate_password("  secret1 ").unwrap(), "secret1");
        assert!(validate_password("  abc   ").is_err());
        assert!(validate_password("abcdef").is_ok());
    }

    #[tokio::test]
    async fn bcrypt_round_trip() {
        let hasher = BcryptHasher::new(4);
        let digest = hasher.hash("secret1").await.unwrap();
        assert!(hasher.verify(&digest, "secret1").await.unwrap());
        assert!(!hasher.verify(&digest, "secret2").await.unwrap());
        assert!(!hasher.verify("not-a-digest", "secret1").await.unwrap());
    }
}
