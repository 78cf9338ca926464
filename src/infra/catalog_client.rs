//! External book catalog (Google Books volumes API).

use crate::domain::catalog::{parse_published_year, secure_cover_url, BookSummary};
use crate::domain::error::{LedgerError, LedgerResult};
use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_MAX_RESULTS: u32 = 12;

#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn search(&self, query: &str, max_results: u32) -> LedgerResult<Vec<BookSummary>>;

    async fn fetch_by_id(&self, external_id: &str) -> LedgerResult<BookSummary>;
}

pub struct GoogleBooksClient {
    http: reqwest::Client,
    base_url: Url,
}

impl GoogleBooksClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = Url::parse(&base_url.into())?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("catalog base url '{}' cannot carry a path", base_url);
        }
        Ok(Self { http, base_url })
    }

    /// `{base}/volumes[/{id}]`, with `id` escaped as a single path segment.
    pub fn volumes_url(&self, external_id: Option<&str>) -> LedgerResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| LedgerError::Internal("catalog base url has no path".into()))?;
            segments.pop_if_empty().push("volumes");
            if let Some(id) = external_id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> LedgerResult<T> {
        let resp = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| LedgerError::Catalog(e.to_string()))?;

        let status = resp.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(LedgerError::Catalog(format!("status {}", status.as_u16())));
        }

        resp.json::<T>()
            .await
            .map_err(|e| LedgerError::Catalog(format!("bad response body: {}", e)))
    }
}

#[async_trait]
impl CatalogClient for GoogleBooksClient {
    async fn search(&self, query: &str, max_results: u32) -> LedgerResult<Vec<BookSummary>> {
        let url = self.volumes_url(None)?;
        let raw: SearchResponse = self
            .get_json(
                url,
                &[("q", query.to_string()), ("maxResults", max_results.to_string())],
            )
            .await?;
        tracing::debug!(query, hits = raw.items.len(), "catalog search");
        Ok(raw.items.into_iter().map(map_volume).collect())
    }

    async fn fetch_by_id(&self, external_id: &str) -> LedgerResult<BookSummary> {
        // Dot segments would be dropped from the path and hit the search endpoint.
        if matches!(external_id.trim(), "" | "." | "..") {
            return Err(LedgerError::validation("invalid catalog id"));
        }
        let url = self.volumes_url(Some(external_id))?;
        let item: VolumeItem = self.get_json(url, &[]).await?;
        Ok(map_volume(item))
    }
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<VolumeItem>,
}

#[derive(Debug, Default, Deserialize)]
struct VolumeItem {
    #[serde(default)]
    id: String,
    #[serde(default, rename = "volumeInfo")]
    volume_info: VolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct VolumeInfo {
    title: String,
    authors: Vec<String>,
    description: String,
    categories: Vec<String>,
    published_date: String,
    page_count: i32,
    maturity_rating: String,
    image_links: ImageLinks,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ImageLinks {
    thumbnail: String,
    small_thumbnail: String,
}

fn map_volume(item: VolumeItem) -> BookSummary {
    let info = item.volume_info;
    let cover = if info.image_links.thumbnail.is_empty() {
        info.image_links.small_thumbnail
    } else {
        info.image_links.thumbnail
    };

    BookSummary {
        id: item.id,
        title: info.title,
        author: info.authors.join(", "),
        authors: info.authors,
        cover_url: secure_cover_url(&cover),
        description: info.description,
        categories: info.categories,
        published_year: parse_published_year(&info.published_date),
        page_count: Some(info.page_count).filter(|n| *n > 0),
        maturity: info.maturity_rating,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn volume_maps_to_summary() {
        let item: VolumeItem = serde_json::from_value(json!({
            "id": "zyTCAlFPjgYC",
            "volumeInfo": {
                "title": "Dune",
                "authors": ["Frank Herbert"],
                "description": "Spice.",
                "categories": ["Fiction/Science Fiction/General"],
                "publishedDate": "1965-08-01",
                "pageCount": 412,
                "maturityRating": "NOT_MATURE",
                "imageLinks": {
                    "smallThumbnail": "http://books.google.com/small",
                    "thumbnail": "http://books.google.com/thumb"
                }
            }
        }))
        .unwrap();

        let summary = map_volume(item);
        assert_eq!(summary.id, "zyTCAlFPjgYC");
        assert_eq!(summary.author, "Frank Herbert");
        assert_eq!(summary.cover_url, "https://books.google.com/thumb");
        assert_eq!(summary.published_year, Some(1965));
        assert_eq!(summary.page_count, Some(412));
        assert_eq!(summary.maturity, "NOT_MATURE");
    }

    #[test]
    fn sparse_volume_maps_to_unknowns() {
        let item: VolumeItem = serde_json::from_value(json!({
            "id": "x1",
            "volumeInfo": {
                "title": "Untitled",
                "publishedDate": "20",
                "imageLinks": { "smallThumbnail": "http://img/small" }
            }
        }))
        .unwrap();

        let summary = map_volume(item);
        assert!(summary.authors.is_empty());
        assert_eq!(summary.author, "");
        assert_eq!(summary.cover_url, "https://img/small");
        assert_eq!(summary.published_year, None);
        assert_eq!(summary.page_count, None);
    }

    fn client(base: &str) -> GoogleBooksClient {
        GoogleBooksClient::new(base, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn volume_id_stays_inside_the_volumes_path() {
        let client = client("https://books.example/books/v1/");
        assert_eq!(
            client.volumes_url(None).unwrap().as_str(),
            "https://books.example/books/v1/volumes"
        );
        let url = client.volumes_url(Some("../../admin?x=1#f")).unwrap();
        assert_eq!(url.path(), "/books/v1/volumes/..%2F..%2Fadmin%3Fx=1%23f");
        assert_eq!(url.query(), None);
    }

    #[tokio::test]
    async fn dot_ids_are_rejected_before_any_request() {
        let client = client("https://books.example/books/v1");
        for id in ["", " ", ".", ".."] {
            let err = client.fetch_by_id(id).await.unwrap_err();
            assert!(matches!(err, LedgerError::Validation(_)), "{:?}", id);
        }
    }

    #[test]
    fn search_response_without_items_is_empty() {
        let raw: SearchResponse = serde_json::from_value(json!({ "totalItems": 0 })).unwrap();
        assert!(raw.items.is_empty());
    }
}
