//! Identifiers and read models returned by the library components.

use crate::domain::status::ReadingStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            Serialize, Deserialize, sqlx::Type, ToSchema,
        )]
        #[serde(transparent)]
        #[sqlx(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Zero is the "not supplied" sentinel on the wire.
            pub fn is_sentinel(&self) -> bool {
                self.0 == 0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(UserId);
id_type!(BookId);
id_type!(CollectionId);
id_type!(ReviewId);

/// Display format for review timestamps.
pub const REVIEW_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub name: String,
}

impl UserProfile {
    /// `name` if set, else `email`, else `"User"`.
    pub fn display_name(&self) -> &str {
        display_name(&self.name, &self.email)
    }
}

pub fn display_name<'a>(name: &'a str, email: &'a str) -> &'a str {
    if !name.is_empty() {
        name
    } else if !email.is_empty() {
        email
    } else {
        "User"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthSession {
    pub token: String,
    pub user: UserProfile,
}

/// One row of a user's library.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LibraryView {
    pub book_id: BookId,
    pub google_id: String,
    pub title: String,
    pub author: String,
    pub cover_url: String,
    pub description: String,
    pub published_year: Option<i32>,
    pub page_count: Option<i32>,
    pub age_rating: String,
    pub status: ReadingStatus,
    pub genres: Vec<String>,
    /// Names of the user's collections holding this book, alphabetical.
    pub collections: Vec<String>,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CollectionView {
    pub id: CollectionId,
    pub name: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    pub id: ReviewId,
    pub user_name: String,
    /// Time of the latest submission, `YYYY-MM-DD HH:MM` in UTC.
    pub created_at: String,
    pub rating: i32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GenreStat {
    pub genre: String,
    pub cnt: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MonthStat {
    pub month: String,
    pub cnt: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatsView {
    pub genres: Vec<GenreStat>,
    pub months: Vec<MonthStat>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_falls_back_to_email_then_placeholder() {
        assert_eq!(display_name("Ann", "a@x.com"), "Ann");
        assert_eq!(display_name("", "a@x.com"), "a@x.com");
        assert_eq!(display_name("", ""), "User");
    }

    #[test]
    fn ids_serialize_as_bare_numbers() {
        assert_eq!(serde_json::to_string(&BookId(7)).unwrap(), "7");
        let id: CollectionId = serde_json::from_str("12").unwrap();
        assert_eq!(id, CollectionId(12));
        assert!(BookId(0).is_sentinel());
    }
}
