use crate::{
    Config, SearchPage,
    art::{artic::ArticProvider, met::MetProvider},
    error::LabError,
    http::HttpFetcher,
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug};

pub mod artic;
pub mod met;

pub const DEFAULT_IMAGE_SIZE: u32 = 400;

/// Page sizes offered by the dashboard. Providers themselves accept any limit.
pub const PAGE_SIZES: [u32; 3] = [6, 12, 24];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtProviderId {
    Artic,
    Met,
}

impl ArtProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtProviderId::Artic => "artic",
            ArtProviderId::Met => "met",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ArtProviderId::Artic => "Art Institute of Chicago",
            ArtProviderId::Met => "The Metropolitan Museum of Art",
        }
    }

    pub const fn all() -> &'static [ArtProviderId] {
        &[ArtProviderId::Artic, ArtProviderId::Met]
    }
}

impl std::fmt::Display for ArtProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ArtProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "artic" => Ok(ArtProviderId::Artic),
            "met" => Ok(ArtProviderId::Met),
            _ => Err(anyhow::anyhow!(
                "Unknown art provider '{value}'. Supported providers: artic, met."
            )),
        }
    }
}

/// Stateless artwork search. `page` is 1-based and `limit` is forwarded as given.
#[async_trait]
pub trait ArtworkProvider: Send + Sync + Debug {
    fn id(&self) -> ArtProviderId;

    async fn search(&self, keyword: &str, page: u32, limit: u32) -> Result<SearchPage, LabError>;
}

/// Display-resolution IIIF image URL, or `None` without an image id.
pub fn image_url(base: &str, image_id: Option<&str>, size: u32) -> Option<String> {
    let id = image_id.filter(|id| !id.is_empty())?;
    Some(format!("{}/iiif/2/{id}/full/{size},/0/default.jpg", base.trim_end_matches('/')))
}

/// Construct a provider from config and explicit id.
pub fn provider_from_config(
    id: ArtProviderId,
    config: &Config,
) -> anyhow::Result<Box<dyn ArtworkProvider>> {
    let fetcher = HttpFetcher::new(&config.http)?;

    let boxed: Box<dyn ArtworkProvider> = match id {
        ArtProviderId::Artic => Box::new(ArticProvider::new(
            fetcher,
            config.endpoints.artic_api.clone(),
            config.endpoints.artic_images.clone(),
            config.art.image_size,
        )),
        ArtProviderId::Met => Box::new(MetProvider::new(fetcher, config.endpoints.met_api.clone())),
    };

    Ok(boxed)
}

/// Construct the default provider from config, using the `default_art_provider` field.
pub fn default_provider_from_config(config: &Config) -> anyhow::Result<Box<dyn ArtworkProvider>> {
    let id = config.default_art_provider_id()?;
    provider_from_config(id, config)
}
