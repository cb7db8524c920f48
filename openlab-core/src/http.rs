use reqwest::{Client, header};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::{config::HttpSettings, error::LabError};

/// Query parameters as sent on the wire.
pub type Query<'a> = [(&'a str, String)];

/// Shared GET wrapper: identifying header, timeout, status check.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(settings: &HttpSettings) -> Result<Self, LabError> {
        let mut headers = header::HeaderMap::new();
        let agent = header::HeaderValue::from_str(&settings.user_agent)
            .map_err(|e| LabError::invalid_input(format!("Invalid user agent: {e}")))?;
        headers.insert(header::USER_AGENT, agent);

        let http = Client::builder().default_headers(headers).build()?;

        Ok(Self { http, timeout: settings.timeout() })
    }

    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &Query<'_>,
    ) -> Result<T, LabError> {
        self.fetch_json_with_timeout(url, query, self.timeout).await
    }

    pub async fn fetch_json_with_timeout<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &Query<'_>,
        timeout: Duration,
    ) -> Result<T, LabError> {
        let body = self.fetch_text_with_timeout(url, query, timeout).await?;

        serde_json::from_str(&body).map_err(|e| {
            LabError::parse(format!("invalid JSON from {url}: {e} (body: {})", truncate_body(&body)))
        })
    }

    pub async fn fetch_text(&self, url: &str, query: &Query<'_>) -> Result<String, LabError> {
        self.fetch_text_with_timeout(url, query, self.timeout).await
    }

    /// The timeout covers the whole exchange, body included.
    pub async fn fetch_text_with_timeout(
        &self,
        url: &str,
        query: &Query<'_>,
        timeout: Duration,
    ) -> Result<String, LabError> {
        let exchange = async {
            let res = self
                .http
                .get(url)
                .query(query)
                .send()
                .await
                .map_err(|e| transport_error(url, "request", e))?;

            let status = res.status();
            debug!(%url, %status, "remote response");

            let body = res.text().await.map_err(|e| transport_error(url, "body read", e))?;
            Ok::<_, LabError>((status, body))
        };

        let (status, body) = tokio::time::timeout(timeout, exchange).await.map_err(|_| {
            LabError::remote(format!("GET {url} timed out after {} ms", timeout.as_millis()))
        })??;

        if !status.is_success() {
            return Err(LabError::remote(format!(
                "GET {url} returned status {status}: {}",
                truncate_body(&body),
            )));
        }

        Ok(body)
    }
}

fn transport_error(url: &str, stage: &str, err: reqwest::Error) -> LabError {
    if err.is_timeout() {
        LabError::remote(format!("GET {url} timed out during {stage}: {err}"))
    } else {
        LabError::remote(format!("GET {url} failed during {stage}: {err}"))
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
