//! Shared helpers for the database-backed tests.
//!
//! Database tests are `#[ignore]`d and run with `cargo test -- --ignored`
//! against the database named by `DATABASE_URL`; they fail when it is unset.
//! Every test creates its own users and catalog ids, so runs never collide
//! and nothing needs cleaning up.

#![allow(dead_code)]

use bookpulse::app::IdentityStore;
use bookpulse::domain::{CatalogPayload, UserId};
use bookpulse::storage::schema;
use bookpulse::{Store, StoreConfig};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Connects and makes sure the tables exist.
pub async fn store() -> Store {
    dotenv::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for database tests");

    let store = Store::connect(&StoreConfig {
        database_url,
        max_connections: 4,
        deadline: Duration::from_secs(10),
    })
    .await
    .expect("connect to DATABASE_URL");

    schema::apply(store.pool()).await.expect("apply schema");
    store
}

/// A string no other test run will produce.
pub fn unique(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!(
        "{}-{}-{}-{}",
        prefix,
        std::process::id(),
        nanos,
        COUNTER.fetch_add(1, Ordering::Relaxed)
    )
}

pub async fn new_user(store: &Store, name: &str) -> UserId {
    IdentityStore::new(store.clone())
        .create(&format!("{}@example.test", unique("user")), name, "not-a-real-digest")
        .await
        .expect("create user")
        .id
}

pub fn book(external_id: &str, title: &str, categories: &[&str]) -> CatalogPayload {
    CatalogPayload {
        external_id: external_id.to_string(),
        title: title.to_string(),
        author: "Frank Herbert".to_string(),
        cover_url: "http://books.example/cover.jpg".to_string(),
        description: "Desert planet.".to_string(),
        published_year: Some(1965),
        page_count: Some(412),
        maturity_tag: "NOT_MATURE".to_string(),
        category_paths: categories.iter().map(|c| c.to_string()).collect(),
    }
}
