//! Per-book reviews. At most one review per user and book.

use crate::app::ledger::LibraryLedger;
use crate::domain::error::{LedgerError, LedgerResult};
use crate::domain::views::{BookId, ReviewId, ReviewView, UserId, REVIEW_TIME_FORMAT};
use chrono::{DateTime, Utc};
use sqlx::Row;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

pub fn validate_review(rating: i32, text: &str) -> LedgerResult<&str> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(LedgerError::validation("rating must be 1..5"));
    }
    let text = text.trim();
    if text.is_empty() {
        return Err(LedgerError::validation("text required"));
    }
    Ok(text)
}

impl LibraryLedger {
    /// Creates or replaces the caller's review of a book.
    ///
    /// The returned `created_at` is the time of this submission.
    pub async fn upsert_review(
        &self,
        user_id: UserId,
        book_id: BookId,
        rating: i32,
        text: &str,
    ) -> LedgerResult<ReviewView> {
        let text = validate_review(rating, text)?;

        let (id, created_at): (ReviewId, DateTime<Utc>) = self
            .store
            .run(async {
                let book_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
                    .bind(book_id)
                    .fetch_one(self.store.pool())
                    .await?;
                if !book_exists {
                    return Err(LedgerError::not_found("book not found"));
                }

                let row = sqlx::query(
                    "INSERT INTO reviews (user_id, book_id, rating, text)
                     VALUES ($1, $2, $3, $4)
                     ON CONFLICT (user_id, book_id) DO UPDATE SET
                       rating = EXCLUDED.rating,
                       text = EXCLUDED.text,
                       created_at = now()
                     RETURNING id, created_at",
                )
                .bind(user_id)
                .bind(book_id)
                .bind(rating)
                .bind(text)
                .fetch_one(self.store.pool())
                .await?;
                Ok((row.try_get("id")?, row.try_get("created_at")?))
            })
            .await?;

        // The review is already stored; a missing name only degrades the view.
        let user_name = match self.identity.display_name(user_id).await {
            Ok(name) => name.unwrap_or_default(),
            Err(err) => {
                tracing::warn!(user_id = %user_id, error = %err, "display name lookup failed");
                String::new()
            }
        };

        tracing::info!(user_id = %user_id, %book_id, review_id = %id, rating, "review saved");
        Ok(ReviewView {
            id,
            user_name,
            created_at: created_at.format(REVIEW_TIME_FORMAT).to_string(),
            rating,
            text: text.to_string(),
        })
    }

    /// All reviews of a book, newest first.
    pub async fn list_reviews(&self, book_id: BookId) -> LedgerResult<Vec<ReviewView>> {
        self.store
            .run(async {
                let rows = sqlx::query(
                    "SELECT r.id, r.rating, r.text, r.created_at,
                            COALESCE(NULLIF(u.name, ''), NULLIF(u.email, ''), 'User') AS user_name
                     FROM reviews r
                     JOIN users u ON u.id = r.user_id
                     WHERE r.book_id = $1
                     ORDER BY r.created_at DESC, r.id DESC",
                )
                .bind(book_id)
                .fetch_all(self.store.pool())
                .await?;

                let mut out = Vec::with_capacity(rows.len());
                for row in rows {
                    let created_at: DateTime<Utc> = row.try_get("created_at")?;
                    out.push(ReviewView {
                        id: row.try_get("id")?,
                        user_name: row.try_get("user_name")?,
                        created_at: created_at.format(REVIEW_TIME_FORMAT).to_string(),
                        rating: row.try_get("rating")?,
                        text: row.try_get("text")?,
                    });
                }
                Ok::<_, LedgerError>(out)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_must_be_in_range() {
        assert!(validate_review(0, "ok").is_err());
        assert!(validate_review(6, "ok").is_err());
        assert_eq!(validate_review(5, "  great  ").unwrap(), "great");
    }

    #[test]
    fn blank_text_is_rejected() {
        let err = validate_review(3, "   ").unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }
}
