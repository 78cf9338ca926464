//! Mapping from external catalog records to the internal book/genre schema.
//!
//! Everything here is pure. The storage half of ingestion lives in
//! [`crate::app::normalizer`].

use crate::domain::error::{LedgerError, LedgerResult};
use crate::domain::status::AgeRating;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Category segment that carries no taxonomic information.
const GENERIC_CATEGORY: &str = "General";

/// Only this many leading segments of a category path become genres.
const MAX_GENRE_DEPTH: usize = 2;

/// A book description as delivered by the catalog (or echoed back by a client).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogPayload {
    pub external_id: String,
    pub title: String,
    pub author: String,
    pub cover_url: String,
    pub description: String,
    pub published_year: Option<i32>,
    pub page_count: Option<i32>,
    pub maturity_tag: String,
    pub category_paths: Vec<String>,
}

/// A validated book ready to be upserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedBook {
    pub external_id: String,
    pub title: String,
    pub author: String,
    pub cover_url: String,
    pub description: String,
    pub published_year: Option<i32>,
    pub page_count: Option<i32>,
    pub age_rating: AgeRating,
    pub genres: Vec<String>,
}

impl NormalizedBook {
    pub fn from_payload(payload: CatalogPayload) -> LedgerResult<Self> {
        let external_id = payload.external_id.trim().to_string();
        let title = payload.title.trim().to_string();
        if external_id.is_empty() || title.is_empty() {
            return Err(LedgerError::validation("id and title required"));
        }

        Ok(Self {
            external_id,
            title,
            author: payload.author.trim().to_string(),
            cover_url: secure_cover_url(&payload.cover_url),
            description: payload.description,
            published_year: known_positive(payload.published_year),
            page_count: known_positive(payload.page_count),
            age_rating: AgeRating::from_maturity_tag(&payload.maturity_tag),
            genres: genre_names(&payload.category_paths),
        })
    }
}

/// Zero and negative values mean "unknown".
fn known_positive(value: Option<i32>) -> Option<i32> {
    value.filter(|v| *v > 0)
}

/// Extracts genre names from slash-delimited category paths.
///
/// Uses the first two segments of every path, skipping empty and `"General"`
/// segments. Names are deduplicated, first occurrence wins.
pub fn genre_names(category_paths: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for path in category_paths {
        for segment in path.split('/').take(MAX_GENRE_DEPTH) {
            let name = segment.trim();
            if name.is_empty() || name == GENERIC_CATEGORY {
                continue;
            }
            if !out.iter().any(|existing| existing == name) {
                out.push(name.to_string());
            }
        }
    }
    out
}

pub fn secure_cover_url(url: &str) -> String {
    url.replace("http://", "https://")
}

/// Year from a catalog `publishedDate` (`"1965"`, `"1965-08"`, `"1965-08-01"`).
pub fn parse_published_year(published_date: &str) -> Option<i32> {
    let prefix = published_date.get(..4)?;
    prefix.parse::<i32>().ok().filter(|y| *y > 0)
}

/// A catalog search/fetch result as returned to API clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookSummary {
    /// External (catalog) identifier.
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    /// `authors` joined with ", ".
    pub author: String,
    pub cover_url: String,
    pub description: String,
    pub categories: Vec<String>,
    pub published_year: Option<i32>,
    pub page_count: Option<i32>,
    pub maturity: String,
}

impl From<BookSummary> for CatalogPayload {
    fn from(summary: BookSummary) -> Self {
        let author = if summary.author.is_empty() {
            summary.authors.join(", ")
        } else {
            summary.author
        };
        CatalogPayload {
            external_id: summary.id,
            title: summary.title,
            author,
            cover_url: summary.cover_url,
            description: summary.description,
            published_year: summary.published_year,
            page_count: summary.page_count,
            maturity_tag: summary.maturity,
            category_paths: summary.categories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn genres_are_truncated_to_two_levels() {
        let genres = genre_names(&paths(&["Fiction/Science Fiction/Space Opera"]));
        assert_eq!(genres, vec!["Fiction", "Science Fiction"]);
    }

    #[test]
    fn general_alone_yields_no_genres() {
        assert!(genre_names(&paths(&["General"])).is_empty());
        assert_eq!(genre_names(&paths(&["Fiction / General"])), vec!["Fiction"]);
    }

    #[test]
    fn blank_segments_are_skipped_and_names_deduplicated() {
        let genres = genre_names(&paths(&["/History", "Fiction/ ", "Fiction/Fantasy"]));
        assert_eq!(genres, vec!["History", "Fiction", "Fantasy"]);
    }

    #[test]
    fn normalization_requires_id_and_title() {
        let missing_title = CatalogPayload {
            external_id: "g1".into(),
            title: "   ".into(),
            ..Default::default()
        };
        assert!(matches!(
            NormalizedBook::from_payload(missing_title),
            Err(LedgerError::Validation(_))
        ));

        let missing_id = CatalogPayload {
            title: "Dune".into(),
            ..Default::default()
        };
        assert!(NormalizedBook::from_payload(missing_id).is_err());
    }

    #[test]
    fn zero_year_and_page_count_become_unknown() {
        let book = NormalizedBook::from_payload(CatalogPayload {
            external_id: "g1".into(),
            title: "Dune".into(),
            published_year: Some(0),
            page_count: Some(0),
            maturity_tag: "MATURE".into(),
            cover_url: "http://books.example/cover.jpg".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(book.published_year, None);
        assert_eq!(book.page_count, None);
        assert_eq!(book.age_rating, AgeRating::Adult);
        assert_eq!(book.cover_url, "https://books.example/cover.jpg");
    }

    #[test]
    fn published_year_takes_leading_four_characters() {
        assert_eq!(parse_published_year("1965-08-01"), Some(1965));
        assert_eq!(parse_published_year("2001"), Some(2001));
        assert_eq!(parse_published_year("196"), None);
        assert_eq!(parse_published_year("circa 1900"), None);
        assert_eq!(parse_published_year(""), None);
    }

    #[test]
    fn summary_falls_back_to_joined_authors() {
        let payload: CatalogPayload = BookSummary {
            id: "g2".into(),
            title: "Good Omens".into(),
            authors: vec!["Terry Pratchett".into(), "Neil Gaiman".into()],
            ..Default::default()
        }
        .into();
        assert_eq!(payload.author, "Terry Pratchett, Neil Gaiman");
        assert_eq!(payload.external_id, "g2");
    }
}
