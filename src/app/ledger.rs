//! Library Ledger: per-user library, status and collection state.
//!
//! Every multi-step operation runs in one transaction under the store
//! deadline. Membership checks happen before the first write, and the
//! composite foreign keys on `collection_books` back them up at commit time.

use crate::app::identity::IdentityStore;
use crate::app::normalizer::CatalogNormalizer;
use crate::domain::catalog::{CatalogPayload, NormalizedBook};
use crate::domain::error::{LedgerError, LedgerResult};
use crate::domain::status::ReadingStatus;
use crate::domain::views::{BookId, CollectionId, CollectionView, LibraryView, UserId};
use crate::storage::Store;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, Row};
use std::collections::BTreeSet;

const NOT_IN_LIBRARY: &str = "book not in user's library";

/// How a caller names a book: by internal id or by catalog id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookRef {
    Id(BookId),
    External(String),
}

impl BookRef {
    /// Prefers a non-zero internal id, then a non-empty external id.
    pub fn from_parts(book_id: Option<BookId>, external_id: Option<&str>) -> LedgerResult<Self> {
        if let Some(id) = book_id.filter(|id| !id.is_sentinel()) {
            return Ok(BookRef::Id(id));
        }
        match external_id.map(str::trim) {
            Some(ext) if !ext.is_empty() => Ok(BookRef::External(ext.to_string())),
            _ => Err(LedgerError::validation("googleId or bookId required")),
        }
    }
}

#[derive(sqlx::FromRow)]
struct LibraryRow {
    book_id: BookId,
    google_id: String,
    title: String,
    author: String,
    cover_url: String,
    description: String,
    published_year: Option<i32>,
    page_count: Option<i32>,
    age_rating: String,
    status: String,
    added_at: DateTime<Utc>,
    genres: Vec<String>,
    collections: Vec<String>,
}

impl TryFrom<LibraryRow> for LibraryView {
    type Error = LedgerError;

    fn try_from(row: LibraryRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<ReadingStatus>()
            .map_err(|_| LedgerError::Internal(format!("stored status '{}' is unknown", row.status)))?;
        Ok(LibraryView {
            book_id: row.book_id,
            google_id: row.google_id,
            title: row.title,
            author: row.author,
            cover_url: row.cover_url,
            description: row.description,
            published_year: row.published_year,
            page_count: row.page_count,
            age_rating: row.age_rating,
            status,
            genres: row.genres,
            collections: row.collections,
            added_at: row.added_at,
        })
    }
}

#[derive(Clone)]
pub struct LibraryLedger {
    pub(crate) store: Store,
    pub(crate) identity: IdentityStore,
}

impl LibraryLedger {
    pub fn new(store: Store, identity: IdentityStore) -> Self {
        Self { store, identity }
    }

    pub fn normalizer(&self) -> CatalogNormalizer {
        CatalogNormalizer::new(self.store.clone())
    }

    /// Ingests the book and upserts the library entry in one transaction.
    ///
    /// A new entry without a status starts as `planned`; an existing entry
    /// keeps its status unless one is supplied.
    pub async fn add_or_update_book(
        &self,
        user_id: UserId,
        payload: CatalogPayload,
        status: Option<ReadingStatus>,
    ) -> LedgerResult<BookId> {
        let book = NormalizedBook::from_payload(payload)?;
        let book_id = self
            .store
            .run(async {
                let mut tx = self.store.begin().await?;
                let book_id = CatalogNormalizer::ingest_in(&mut tx, &book).await?;
                upsert_entry(&mut tx, user_id, book_id, status).await?;
                tx.commit().await?;
                Ok::<_, LedgerError>(book_id)
            })
            .await?;

        tracing::info!(
            user_id = %user_id,
            %book_id,
            external_id = %book.external_id,
            status = status.map(|s| s.as_str()).unwrap_or("unchanged"),
            "library entry upserted"
        );
        Ok(book_id)
    }

    /// Changes the status of a book the user already owns. Never creates membership.
    pub async fn set_status(
        &self,
        user_id: UserId,
        book: BookRef,
        status: ReadingStatus,
    ) -> LedgerResult<()> {
        self.store
            .run(async {
                let mut conn = self.store.pool().acquire().await?;
                let book_id = find_book(&mut conn, &book)
                    .await?
                    .ok_or_else(|| LedgerError::not_found("book not found"))?;

                let done = sqlx::query(
                    "UPDATE user_books SET status = $3 WHERE user_id = $1 AND book_id = $2",
                )
                .bind(user_id)
                .bind(book_id)
                .bind(status.as_str())
                .execute(&mut *conn)
                .await?;

                if done.rows_affected() == 0 {
                    return Err(LedgerError::conflict(NOT_IN_LIBRARY));
                }
                Ok(())
            })
            .await
    }

    /// Creates (or reuses) the named collection and links the given books.
    ///
    /// Zero ids are skipped. If any remaining id is not in the user's library
    /// nothing is written.
    pub async fn create_collection(
        &self,
        user_id: UserId,
        name: &str,
        book_ids: &[BookId],
    ) -> LedgerResult<CollectionId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::validation("name required"));
        }
        if book_ids.is_empty() {
            return Err(LedgerError::validation("bookIds required"));
        }
        let wanted: BTreeSet<BookId> = book_ids.iter().copied().filter(|id| !id.is_sentinel()).collect();
        let wanted: Vec<BookId> = wanted.into_iter().collect();

        let collection_id = self
            .store
            .run(async {
                let mut tx = self.store.begin().await?;
                ensure_owned(&mut tx, user_id, &wanted).await?;

                let collection_id: CollectionId = sqlx::query_scalar(
                    "INSERT INTO collections (user_id, name) VALUES ($1, $2)
                     ON CONFLICT (user_id, name) DO UPDATE SET name = EXCLUDED.name
                     RETURNING id",
                )
                .bind(user_id)
                .bind(name)
                .fetch_one(&mut *tx)
                .await?;

                link_books(&mut tx, user_id, collection_id, &wanted).await?;
                tx.commit().await?;
                Ok::<_, LedgerError>(collection_id)
            })
            .await?;

        tracing::info!(user_id = %user_id, %collection_id, books = wanted.len(), "collection upserted");
        Ok(collection_id)
    }

    /// Links books, named by catalog id, into an existing collection of the user.
    pub async fn add_books_to_collection(
        &self,
        user_id: UserId,
        collection_id: CollectionId,
        external_ids: &[String],
    ) -> LedgerResult<()> {
        if collection_id.is_sentinel() || external_ids.is_empty() {
            return Err(LedgerError::validation("collectionId and googleIds required"));
        }
        let wanted: Vec<&str> = {
            let mut seen = BTreeSet::new();
            external_ids
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty() && seen.insert(*s))
                .collect()
        };

        self.store
            .run(async {
                let mut tx = self.store.begin().await?;

                let owned: bool = sqlx::query_scalar(
                    "SELECT EXISTS(SELECT 1 FROM collections WHERE id = $1 AND user_id = $2)",
                )
                .bind(collection_id)
                .bind(user_id)
                .fetch_one(&mut *tx)
                .await?;
                if !owned {
                    return Err(LedgerError::conflict("collection not found"));
                }

                let mut book_ids = Vec::with_capacity(wanted.len());
                for external_id in &wanted {
                    let book_id = find_book(&mut tx, &BookRef::External(external_id.to_string()))
                        .await?
                        .ok_or_else(|| LedgerError::not_found(format!("book not found: {}", external_id)))?;
                    book_ids.push(book_id);
                }
                ensure_owned(&mut tx, user_id, &book_ids).await?;

                link_books(&mut tx, user_id, collection_id, &book_ids).await?;
                tx.commit().await?;
                Ok(())
            })
            .await?;

        tracing::info!(user_id = %user_id, %collection_id, books = wanted.len(), "books added to collection");
        Ok(())
    }

    /// The user's library sorted by title, with genre and collection names.
    pub async fn list_library(&self, user_id: UserId) -> LedgerResult<Vec<LibraryView>> {
        let rows: Vec<LibraryRow> = self
            .store
            .run(async {
                Ok::<_, LedgerError>(sqlx::query_as(
                    "SELECT
                       b.id AS book_id,
                       b.google_id,
                       b.title,
                       b.author,
                       b.cover_url,
                       b.description,
                       b.published_year,
                       b.page_count,
                       b.age_rating,
                       ub.status,
                       ub.created_at AS added_at,
                       COALESCE((
                         SELECT array_agg(DISTINCT g.name ORDER BY g.name)
                         FROM book_genres bg
                         JOIN genres g ON g.id = bg.genre_id
                         WHERE bg.book_id = b.id
                       ), '{}'::text[]) AS genres,
                       COALESCE((
                         SELECT array_agg(DISTINCT c.name ORDER BY c.name)
                         FROM collection_books cb
                         JOIN collections c ON c.id = cb.collection_id AND c.user_id = cb.user_id
                         WHERE cb.user_id = ub.user_id AND cb.book_id = ub.book_id
                       ), '{}'::text[]) AS collections
                     FROM user_books ub
                     JOIN books b ON b.id = ub.book_id
                     WHERE ub.user_id = $1
                     ORDER BY b.title, b.id",
                )
                .bind(user_id)
                .fetch_all(self.store.pool())
                .await?)
            })
            .await?;

        rows.into_iter().map(LibraryView::try_from).collect()
    }

    /// The user's collections sorted by name, with live book counts.
    pub async fn list_collections(&self, user_id: UserId) -> LedgerResult<Vec<CollectionView>> {
        self.store
            .run(async {
                let rows = sqlx::query(
                    "SELECT c.id, c.name, COUNT(cb.book_id) AS cnt
                     FROM collections c
                     LEFT JOIN collection_books cb
                       ON cb.user_id = c.user_id AND cb.collection_id = c.id
                     WHERE c.user_id = $1
                     GROUP BY c.id, c.name
                     ORDER BY c.name",
                )
                .bind(user_id)
                .fetch_all(self.store.pool())
                .await?;

                let mut out = Vec::with_capacity(rows.len());
                for row in rows {
                    out.push(CollectionView {
                        id: row.try_get("id")?,
                        name: row.try_get("name")?,
                        count: row.try_get("cnt")?,
                    });
                }
                Ok::<_, LedgerError>(out)
            })
            .await
    }

    /// Resolves a catalog id to the local book id.
    pub async fn resolve_book(&self, external_id: &str) -> LedgerResult<BookId> {
        let external_id = external_id.trim();
        if external_id.is_empty() {
            return Err(LedgerError::validation("googleId required"));
        }
        self.store
            .run(async {
                let mut conn = self.store.pool().acquire().await?;
                find_book(&mut conn, &BookRef::External(external_id.to_string()))
                    .await?
                    .ok_or_else(|| LedgerError::not_found("book not found"))
            })
            .await
    }
}

async fn upsert_entry(
    conn: &mut PgConnection,
    user_id: UserId,
    book_id: BookId,
    status: Option<ReadingStatus>,
) -> LedgerResult<()> {
    sqlx::query(
        "INSERT INTO user_books (user_id, book_id, status)
         VALUES ($1, $2, COALESCE($3::text, $4))
         ON CONFLICT (user_id, book_id) DO UPDATE SET
           status = COALESCE($3::text, user_books.status)",
    )
    .bind(user_id)
    .bind(book_id)
    .bind(status.map(|s| s.as_str()))
    .bind(ReadingStatus::default().as_str())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn find_book(conn: &mut PgConnection, book: &BookRef) -> LedgerResult<Option<BookId>> {
    let found = match book {
        BookRef::Id(id) => {
            sqlx::query_scalar("SELECT id FROM books WHERE id = $1")
                .bind(*id)
                .fetch_optional(&mut *conn)
                .await?
        }
        BookRef::External(external_id) => {
            sqlx::query_scalar("SELECT id FROM books WHERE google_id = $1")
                .bind(external_id)
                .fetch_optional(&mut *conn)
                .await?
        }
    };
    Ok(found)
}

/// Fails with a conflict unless every book is in the user's library.
async fn ensure_owned(conn: &mut PgConnection, user_id: UserId, book_ids: &[BookId]) -> LedgerResult<()> {
    if book_ids.is_empty() {
        return Ok(());
    }
    let raw: Vec<i64> = book_ids.iter().map(|id| id.0).collect();
    let owned: Vec<BookId> = sqlx::query_scalar(
        "SELECT book_id FROM user_books WHERE user_id = $1 AND book_id = ANY($2)",
    )
    .bind(user_id)
    .bind(&raw)
    .fetch_all(&mut *conn)
    .await?;

    let owned: BTreeSet<BookId> = owned.into_iter().collect();
    if let Some(missing) = book_ids.iter().find(|id| !owned.contains(*id)) {
        tracing::debug!(user_id = %user_id, book_id = %missing, "book not owned");
        return Err(LedgerError::conflict(NOT_IN_LIBRARY));
    }
    Ok(())
}

async fn link_books(
    conn: &mut PgConnection,
    user_id: UserId,
    collection_id: CollectionId,
    book_ids: &[BookId],
) -> LedgerResult<()> {
    if book_ids.is_empty() {
        return Ok(());
    }
    let raw: Vec<i64> = book_ids.iter().map(|id| id.0).collect();
    sqlx::query(
        "INSERT INTO collection_books (user_id, collection_id, book_id)
         SELECT $1, $2, unnest($3::bigint[])
         ON CONFLICT DO NOTHING",
    )
    .bind(user_id)
    .bind(collection_id)
    .bind(&raw)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn book_ref_prefers_internal_id() {
        assert_eq!(
            BookRef::from_parts(Some(BookId(3)), Some("g1")).unwrap(),
            BookRef::Id(BookId(3))
        );
        assert_eq!(
            BookRef::from_parts(Some(BookId(0)), Some(" g1 ")).unwrap(),
            BookRef::External("g1".into())
        );
        assert!(matches!(
            BookRef::from_parts(None, Some("")),
            Err(LedgerError::Validation(_))
        ));
    }
}
