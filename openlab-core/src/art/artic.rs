use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::LabError,
    http::HttpFetcher,
    model::{ArtworkRecord, SearchPage},
};

use super::{ArtProviderId, ArtworkProvider, image_url};

const FIELDS: &str = "id,title,artist_display,date_display,image_id";

/// Art Institute of Chicago search API.
#[derive(Debug, Clone)]
pub struct ArticProvider {
    fetcher: HttpFetcher,
    api_base: String,
    image_base: String,
    image_size: u32,
}

impl ArticProvider {
    pub fn new(
        fetcher: HttpFetcher,
        api_base: impl Into<String>,
        image_base: impl Into<String>,
        image_size: u32,
    ) -> Self {
        Self { fetcher, api_base: api_base.into(), image_base: image_base.into(), image_size }
    }

    fn shape(&self, parsed: ArticSearchResponse) -> SearchPage {
        let pagination = parsed.pagination.unwrap_or_default();

        let records = parsed
            .data
            .into_iter()
            .map(|art| {
                let image_url = image_url(&self.image_base, art.image_id.as_deref(), self.image_size);
                ArtworkRecord {
                    title: non_empty(art.title).unwrap_or_else(|| "Untitled".to_string()),
                    artist: non_empty(art.artist_display).unwrap_or_else(|| "Unknown".to_string()),
                    date_display: art.date_display.unwrap_or_default(),
                    image_id: art.image_id,
                    image_url,
                }
            })
            .collect();

        SearchPage {
            records,
            current_page: pagination.current_page,
            total_pages: pagination.total_pages,
            total: pagination.total,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ArticPagination {
    total: u64,
    total_pages: u32,
    current_page: u32,
}

#[derive(Debug, Deserialize)]
struct ArticArtwork {
    title: Option<String>,
    artist_display: Option<String>,
    date_display: Option<String>,
    image_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArticSearchResponse {
    pagination: Option<ArticPagination>,
    #[serde(default)]
    data: Vec<ArticArtwork>,
}

#[async_trait]
impl ArtworkProvider for ArticProvider {
    fn id(&self) -> ArtProviderId {
        ArtProviderId::Artic
    }

    async fn search(&self, keyword: &str, page: u32, limit: u32) -> Result<SearchPage, LabError> {
        let url = format!("{}/api/v1/artworks/search", self.api_base);

        let parsed: ArticSearchResponse = self
            .fetcher
            .fetch_json(
                &url,
                &[
                    ("q", keyword.to_string()),
                    ("page", page.to_string()),
                    ("limit", limit.to_string()),
                    ("fields", FIELDS.to_string()),
                ],
            )
            .await?;

        let result = self.shape(parsed);
        debug!(
            keyword,
            page,
            total_pages = result.total_pages,
            records = result.records.len(),
            "artic search"
        );
        Ok(result)
    }
}
