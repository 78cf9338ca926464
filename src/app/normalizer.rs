//! Catalog Normalizer: materializes catalog records as `books` rows and
//! links their genres.

use crate::domain::catalog::{CatalogPayload, NormalizedBook};
use crate::domain::error::{LedgerError, LedgerResult};
use crate::domain::views::BookId;
use crate::storage::Store;
use sqlx::PgConnection;
use std::collections::BTreeSet;

#[derive(Clone)]
pub struct CatalogNormalizer {
    store: Store,
}

impl CatalogNormalizer {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Validates and ingests one record in its own transaction.
    pub async fn ingest(&self, payload: CatalogPayload) -> LedgerResult<BookId> {
        let book = NormalizedBook::from_payload(payload)?;
        self.store
            .run(async {
                let mut tx = self.store.begin().await?;
                let book_id = Self::ingest_in(&mut tx, &book).await?;
                tx.commit().await?;
                Ok::<_, LedgerError>(book_id)
            })
            .await
    }

    /// Upserts the book by external id and links its genres, on the caller's
    /// connection (normally inside the caller's transaction).
    pub async fn ingest_in(conn: &mut PgConnection, book: &NormalizedBook) -> LedgerResult<BookId> {
        let book_id: BookId = sqlx::query_scalar(
            "INSERT INTO books (google_id, title, author, cover_url, description, published_year, page_count, age_rating)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (google_id) DO UPDATE SET
               title = EXCLUDED.title,
               author = EXCLUDED.author,
               cover_url = EXCLUDED.cover_url,
               description = EXCLUDED.description,
               published_year = EXCLUDED.published_year,
               page_count = EXCLUDED.page_count,
               age_rating = EXCLUDED.age_rating
             RETURNING id",
        )
        .bind(&book.external_id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.cover_url)
        .bind(&book.description)
        .bind(book.published_year)
        .bind(book.page_count)
        .bind(book.age_rating.as_str())
        .fetch_one(&mut *conn)
        .await?;

        // Sorted and deduplicated so concurrent ingests lock genre rows in
        // the same order.
        let names: Vec<String> = book
            .genres
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if !names.is_empty() {
            sqlx::query(
                "INSERT INTO genres (name)
                 SELECT name FROM unnest($1::text[]) AS t(name) ORDER BY name
                 ON CONFLICT (name) DO NOTHING",
            )
            .bind(&names)
            .execute(&mut *conn)
            .await?;

            sqlx::query(
                "INSERT INTO book_genres (book_id, genre_id)
                 SELECT $1, g.id FROM genres g WHERE g.name = ANY($2) ORDER BY g.id
                 ON CONFLICT DO NOTHING",
            )
            .bind(book_id)
            .bind(&names)
            .execute(&mut *conn)
            .await?;
        }

        tracing::debug!(%book_id, external_id = %book.external_id, genres = names.len(), "book ingested");
        Ok(book_id)
    }
}
