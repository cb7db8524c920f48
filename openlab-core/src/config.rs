use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

use crate::art::ArtProviderId;

/// Settings shared by every outgoing request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self { timeout_secs: 15, user_agent: "OpenAPI-Lab/1.0".to_string() }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Base URLs of the remote services. Request paths are appended by each client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub artic_api: String,
    pub artic_images: String,
    pub met_api: String,
    pub geocoding: String,
    pub forecast: String,
    pub stooq: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            artic_api: "https://api.artic.edu".to_string(),
            artic_images: "https://www.artic.edu".to_string(),
            met_api: "https://collectionapi.metmuseum.org/public/collection/v1".to_string(),
            geocoding: "https://geocoding-api.open-meteo.com".to_string(),
            forecast: "https://api.open-meteo.com".to_string(),
            stooq: "https://stooq.com".to_string(),
        }
    }
}

impl Endpoints {
    /// Point every service at one base URL. Used against local mock servers.
    pub fn all_at(base: &str) -> Self {
        let base = base.trim_end_matches('/').to_string();
        Self {
            artic_api: base.clone(),
            artic_images: base.clone(),
            met_api: base.clone(),
            geocoding: base.clone(),
            forecast: base.clone(),
            stooq: base,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtSettings {
    pub page_size: u32,
    pub image_size: u32,
}

impl Default for ArtSettings {
    fn default() -> Self {
        Self { page_size: 12, image_size: crate::art::DEFAULT_IMAGE_SIZE }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketSettings {
    pub default_symbol: String,
}

impl Default for MarketSettings {
    fn default() -> Self {
        Self { default_symbol: crate::market::DEFAULT_SYMBOL.to_string() }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// default_art_provider = "met"
/// geocode_cache_capacity = 128
///
/// [http]
/// timeout_secs = 10
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Optional default art provider id, "artic" or "met".
    pub default_art_provider: Option<String>,

    /// `None` keeps every resolved city for the whole session.
    pub geocode_cache_capacity: Option<usize>,

    pub http: HttpSettings,
    pub endpoints: Endpoints,
    pub art: ArtSettings,
    pub market: MarketSettings,
}

impl Config {
    /// Default art provider as a strongly-typed id. Falls back to artic when unset.
    pub fn default_art_provider_id(&self) -> Result<ArtProviderId> {
        match self.default_art_provider.as_deref() {
            Some(s) => ArtProviderId::try_from(s),
            None => Ok(ArtProviderId::Artic),
        }
    }

    pub fn set_default_art_provider(&mut self, id: ArtProviderId) {
        self.default_art_provider = Some(id.as_str().to_string());
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "openapi-lab", "openlab")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
