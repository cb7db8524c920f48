use serde::Deserialize;
use tracing::debug;

use crate::{
    cache::{EvictionPolicy, LeastRecentlyUsed, MemoCache, Unbounded},
    error::LabError,
    http::HttpFetcher,
    model::GeoResult,
};

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeocodingEntry>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingEntry {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
}

impl From<GeocodingEntry> for GeoResult {
    fn from(entry: GeocodingEntry) -> Self {
        Self {
            name: entry.name,
            latitude: entry.latitude,
            longitude: entry.longitude,
            country: entry.country.unwrap_or_default(),
        }
    }
}

#[derive(Debug)]
pub struct Geocoder {
    fetcher: HttpFetcher,
    base_url: String,
    cache: MemoCache<String, GeoResult>,
}

impl Geocoder {
    pub fn new(fetcher: HttpFetcher, base_url: impl Into<String>) -> Self {
        Self::with_policy(fetcher, base_url, Box::new(Unbounded))
    }

    pub fn with_policy(
        fetcher: HttpFetcher,
        base_url: impl Into<String>,
        policy: Box<dyn EvictionPolicy<String>>,
    ) -> Self {
        Self { fetcher, base_url: base_url.into(), cache: MemoCache::with_policy(policy) }
    }

    /// `None` means unbounded, `Some(n)` keeps the `n` most recently used cities.
    pub fn with_capacity(
        fetcher: HttpFetcher,
        base_url: impl Into<String>,
        capacity: Option<usize>,
    ) -> Self {
        let policy: Box<dyn EvictionPolicy<String>> = match capacity {
            Some(n) => Box::new(LeastRecentlyUsed::new(n)),
            None => Box::new(Unbounded),
        };
        Self::with_policy(fetcher, base_url, policy)
    }

    /// Resolve `name` to its single best match. Misses are not cached.
    pub async fn resolve_city(&mut self, name: &str) -> Result<GeoResult, LabError> {
        let key = name.to_string();
        if let Some(hit) = self.cache.get(&key) {
            debug!(city = %name, "geocode cache hit");
            return Ok(hit.clone());
        }

        let url = format!("{}/v1/search", self.base_url);
        let response: GeocodingResponse = self
            .fetcher
            .fetch_json(&url, &[("name", key.clone()), ("count", "1".to_string())])
            .await?;

        let entry = response
            .results
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| LabError::not_found(name))?;

        let geo = GeoResult::from(entry);
        debug!(city = %name, lat = geo.latitude, lon = geo.longitude, "geocoded");

        self.cache.insert(key, geo.clone());
        Ok(geo)
    }

    pub fn cache(&self) -> &MemoCache<String, GeoResult> {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpSettings;
    use mockito::Matcher;

    const BERLIN: &str = r#"{
        "results": [
            {"id": 2950159, "name": "Berlin", "latitude": 52.52437, "longitude": 13.41053,
             "country": "Germany", "timezone": "Europe/Berlin"}
        ],
        "generationtime_ms": 0.5
    }"#;

    fn geocoder(base: &str) -> Geocoder {
        Geocoder::new(HttpFetcher::new(&HttpSettings::default()).unwrap(), base)
    }

    #[tokio::test]
    async fn resolves_first_match_and_caches_it() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("name".into(), "Berlin".into()),
                Matcher::UrlEncoded("count".into(), "1".into()),
            ]))
            .with_status(200)
            .with_body(BERLIN)
            .expect(1)
            .create_async()
            .await;

        let mut geocoder = geocoder(&server.url());

        let first = geocoder.resolve_city("Berlin").await.unwrap();
        assert_eq!(first.name, "Berlin");
        assert_eq!(first.country, "Germany");
        assert!((first.latitude - 52.52437).abs() < 1e-9);

        let second = geocoder.resolve_city("Berlin").await.unwrap();
        assert_eq!(first, second);

        mock.assert_async().await;
        assert_eq!(geocoder.cache().stats().hits, 1);
    }

    #[tokio::test]
    async fn empty_results_are_not_found_and_not_cached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"generationtime_ms": 0.2}"#)
            .expect(2)
            .create_async()
            .await;

        let mut geocoder = geocoder(&server.url());

        for _ in 0..2 {
            let err = geocoder.resolve_city("Atlantis").await.unwrap_err();
            assert!(matches!(err, LabError::NotFound { .. }));
        }

        mock.assert_async().await;
        assert!(geocoder.cache().is_empty());
    }

    #[tokio::test]
    async fn missing_country_defaults_to_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"results": [{"name": "Point Nemo", "latitude": -48.9, "longitude": -123.4}]}"#)
            .create_async()
            .await;

        let geo = geocoder(&server.url()).resolve_city("Point Nemo").await.unwrap();
        assert_eq!(geo.country, "");
    }

    #[tokio::test]
    async fn server_error_propagates_as_remote() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/v1/search").match_query(Matcher::Any).with_status(500).create_async().await;

        let err = geocoder(&server.url()).resolve_city("Paris").await.unwrap_err();
        assert!(matches!(err, LabError::Remote { .. }));
    }
}
