//! Table definitions, created at startup in dependency order.
//!
//! Every uniqueness rule of the library lives here as a constraint, so upserts
//! can lean on `ON CONFLICT` instead of check-then-insert.

use sqlx::PgPool;

pub const USERS: &str = "CREATE TABLE IF NOT EXISTS users (
    id BIGSERIAL PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    name TEXT NOT NULL DEFAULT '',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)";

pub const BOOKS: &str = "CREATE TABLE IF NOT EXISTS books (
    id BIGSERIAL PRIMARY KEY,
    google_id TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    author TEXT NOT NULL DEFAULT '',
    cover_url TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    published_year INTEGER,
    page_count INTEGER,
    age_rating TEXT NOT NULL DEFAULT ''
)";

pub const GENRES: &str = "CREATE TABLE IF NOT EXISTS genres (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
)";

pub const BOOK_GENRES: &str = "CREATE TABLE IF NOT EXISTS book_genres (
    book_id BIGINT NOT NULL REFERENCES books(id),
    genre_id BIGINT NOT NULL REFERENCES genres(id),
    PRIMARY KEY (book_id, genre_id)
)";

pub const USER_BOOKS: &str = "CREATE TABLE IF NOT EXISTS user_books (
    user_id BIGINT NOT NULL REFERENCES users(id),
    book_id BIGINT NOT NULL REFERENCES books(id),
    status TEXT NOT NULL CHECK (status IN ('planned', 'reading', 'finished', 'dropped')),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (user_id, book_id)
)";

pub const COLLECTIONS: &str = "CREATE TABLE IF NOT EXISTS collections (
    id BIGSERIAL PRIMARY KEY,
    user_id BIGINT NOT NULL REFERENCES users(id),
    name TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (user_id, name),
    UNIQUE (id, user_id)
)";

// A collection row can only point at a book the same user already owns.
pub const COLLECTION_BOOKS: &str = "CREATE TABLE IF NOT EXISTS collection_books (
    user_id BIGINT NOT NULL,
    collection_id BIGINT NOT NULL,
    book_id BIGINT NOT NULL,
    PRIMARY KEY (user_id, collection_id, book_id),
    FOREIGN KEY (collection_id, user_id) REFERENCES collections(id, user_id),
    FOREIGN KEY (user_id, book_id) REFERENCES user_books(user_id, book_id)
)";

pub const REVIEWS: &str = "CREATE TABLE IF NOT EXISTS reviews (
    id BIGSERIAL PRIMARY KEY,
    user_id BIGINT NOT NULL REFERENCES users(id),
    book_id BIGINT NOT NULL REFERENCES books(id),
    rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
    text TEXT NOT NULL CHECK (length(btrim(text)) > 0),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (user_id, book_id)
)";

pub const ALL_TABLES: &[&str] = &[
    USERS,
    BOOKS,
    GENRES,
    BOOK_GENRES,
    USER_BOOKS,
    COLLECTIONS,
    COLLECTION_BOOKS,
    REVIEWS,
];

/// Advisory lock key held while the DDL runs, so concurrent starters queue up.
const SCHEMA_LOCK_KEY: i64 = 0x626f_6f6b_7075_6c73;

/// Creates any missing table.
pub async fn apply(pool: &PgPool) -> anyhow::Result<()> {
    let mut tx = pool.begin().await?;
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(SCHEMA_LOCK_KEY)
        .execute(&mut *tx)
        .await?;
    for ddl in ALL_TABLES {
        sqlx::query(ddl).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    tracing::info!(tables = ALL_TABLES.len(), "schema ready");
    Ok(())
}
