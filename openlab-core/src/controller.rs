use tracing::info;

use crate::{Config, error::LabError, http::HttpFetcher};

pub mod art;
pub mod market;
pub mod weather;

pub use art::{ArtController, PageCursor, fetch_page};
pub use market::{MarketChart, MarketController};
pub use weather::{Forecast, WeatherController};

/// Errors never escape a controller action; they become `Failed` with a display message.
#[derive(Debug, Clone, PartialEq)]
pub enum PageState<T> {
    /// No query issued yet.
    Idle,
    Loaded(T),
    /// Inline error message; the session keeps running.
    Failed(String),
}

impl<T> PageState<T> {
    pub fn from_result(page: &str, result: Result<T, LabError>) -> Self {
        match result {
            Ok(value) => {
                info!(page, "loaded");
                PageState::Loaded(value)
            }
            Err(e) => {
                info!(page, error = %e, "failed");
                PageState::Failed(e.user_message())
            }
        }
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            PageState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            PageState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, PageState::Idle)
    }
}

/// The three tabs, wired from one config.
#[derive(Debug)]
pub struct Dashboard {
    pub art: ArtController,
    pub weather: WeatherController,
    pub market: MarketController,
}

impl Dashboard {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let fetcher = HttpFetcher::new(&config.http)?;
        let provider = crate::art::default_provider_from_config(config)?;

        Ok(Self {
            art: ArtController::new(provider),
            weather: WeatherController::from_config(fetcher.clone(), config),
            market: MarketController::from_config(fetcher, config),
        })
    }
}
