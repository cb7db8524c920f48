//! Core library for the `openlab` dashboard.
//!
//! This crate defines:
//! - Configuration handling
//! - A shared HTTP fetch helper and the API clients built on it
//!   (artwork search, geocoding, weather, market CSV)
//! - Data shaping into display-ready models
//! - Page controllers that sequence the clients and hold pagination state
//!
//! It is used by `openlab-cli`, but has no terminal dependencies of its own.

pub mod art;
pub mod cache;
pub mod config;
pub mod controller;
pub mod error;
pub mod geocode;
pub mod http;
pub mod market;
pub mod model;
pub mod weather;

pub use art::{ArtProviderId, ArtworkProvider};
pub use config::Config;
pub use controller::{Dashboard, PageState};
pub use error::LabError;
pub use market::MarketSource;
pub use model::{ArtworkRecord, GeoResult, MarketRow, MarketSeries, SearchPage, WeatherSeries};
