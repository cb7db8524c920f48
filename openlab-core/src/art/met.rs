use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    error::LabError,
    http::HttpFetcher,
    model::{ArtworkRecord, SearchPage},
};

use super::{ArtProviderId, ArtworkProvider};

/// Metropolitan Museum collection API.
///
/// The search endpoint only returns object ids, so pages are cut from the id list
/// here and each object on the page is fetched on its own.
#[derive(Debug, Clone)]
pub struct MetProvider {
    fetcher: HttpFetcher,
    api_base: String,
}

impl MetProvider {
    pub fn new(fetcher: HttpFetcher, api_base: impl Into<String>) -> Self {
        Self { fetcher, api_base: api_base.into() }
    }

    async fn search_ids(&self, keyword: &str) -> Result<Vec<u64>, LabError> {
        let url = format!("{}/search", self.api_base);
        let parsed: MetSearchResponse = self
            .fetcher
            .fetch_json(&url, &[("q", keyword.to_string()), ("hasImages", "true".to_string())])
            .await?;

        Ok(parsed.object_ids.unwrap_or_default())
    }

    async fn object(&self, id: u64) -> Result<ArtworkRecord, LabError> {
        let url = format!("{}/objects/{id}", self.api_base);
        let parsed: MetObject = self.fetcher.fetch_json(&url, &[]).await?;
        Ok(parsed.into())
    }
}

#[derive(Debug, Deserialize)]
struct MetSearchResponse {
    #[serde(rename = "objectIDs")]
    object_ids: Option<Vec<u64>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetObject {
    title: Option<String>,
    artist_display_name: Option<String>,
    object_date: Option<String>,
    primary_image_small: Option<String>,
}

impl From<MetObject> for ArtworkRecord {
    fn from(obj: MetObject) -> Self {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Self {
            title: non_empty(obj.title).unwrap_or_else(|| "Untitled".to_string()),
            artist: non_empty(obj.artist_display_name).unwrap_or_else(|| "Unknown".to_string()),
            date_display: obj.object_date.unwrap_or_default(),
            image_id: None,
            image_url: non_empty(obj.primary_image_small),
        }
    }
}

fn page_slice(ids: &[u64], page: u32, limit: u32) -> &[u64] {
    let limit = limit.max(1) as usize;
    let start = (page.max(1) as usize - 1).saturating_mul(limit);
    if start >= ids.len() {
        return &[];
    }
    let end = (start + limit).min(ids.len());
    &ids[start..end]
}

fn total_pages(count: usize, limit: u32) -> u32 {
    count.div_ceil(limit.max(1) as usize) as u32
}

#[async_trait]
impl ArtworkProvider for MetProvider {
    fn id(&self) -> ArtProviderId {
        ArtProviderId::Met
    }

    async fn search(&self, keyword: &str, page: u32, limit: u32) -> Result<SearchPage, LabError> {
        let ids = self.search_ids(keyword).await?;

        let mut records = Vec::new();
        for &id in page_slice(&ids, page, limit) {
            match self.object(id).await {
                Ok(record) => records.push(record),
                Err(e) => warn!(object_id = id, error = %e, "skipping MET object"),
            }
        }

        debug!(keyword, page, matches = ids.len(), records = records.len(), "met search");

        Ok(SearchPage {
            records,
            current_page: page,
            total_pages: total_pages(ids.len(), limit),
            total: ids.len() as u64,
        })
    }
}
