use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use openlab_core::{
    ArtProviderId, Config, MarketSource, PageState,
    art::{PAGE_SIZES, provider_from_config},
    controller::{MarketController, PageCursor, WeatherController, fetch_page},
    http::HttpFetcher,
};

use crate::{configure, dashboard, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "openlab", version, about = "Art, weather and market dashboard")]
pub struct Cli {
    /// Log at debug level. `RUST_LOG` takes precedence when set.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Print the shaped data as JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Without a subcommand the interactive dashboard starts.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search artworks by keyword.
    Art {
        keyword: String,

        /// 1-based page number.
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Results per page: 6, 12 or 24. Defaults to the configured size.
        #[arg(long, value_parser = parse_page_size)]
        limit: Option<u32>,

        /// "artic" or "met". Defaults to the configured provider.
        #[arg(long)]
        provider: Option<String>,
    },

    /// Show the 3-day hourly forecast for a city.
    Weather { city: String },

    /// Chart a daily quote history, online or from a CSV file.
    Market {
        /// Ticker symbol, e.g. "^ks200" or "aapl.us".
        #[arg(long, conflicts_with = "file")]
        symbol: Option<String>,

        /// CSV file used instead of the online fetch.
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Interactive dashboard with Art, Weather and Market tabs.
    Dashboard,

    /// Edit the configuration file interactively.
    Configure,
}

fn parse_page_size(raw: &str) -> Result<u32, String> {
    let size: u32 = raw.parse().map_err(|_| format!("'{raw}' is not a number"))?;
    if PAGE_SIZES.contains(&size) {
        Ok(size)
    } else {
        Err(format!("page size must be one of {PAGE_SIZES:?}"))
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load().context("Failed to load configuration")?;

        match self.command.unwrap_or(Command::Dashboard) {
            Command::Art { keyword, page, limit, provider } => {
                let id = match provider {
                    Some(p) => ArtProviderId::try_from(p.as_str())?,
                    None => config.default_art_provider_id()?,
                };
                let provider = provider_from_config(id, &config)?;
                let limit = limit.unwrap_or(config.art.page_size);

                if keyword.trim().is_empty() {
                    bail!("Please enter a keyword.");
                }
                let cursor = PageCursor { page: page.max(1), ..PageCursor::new(keyword.trim(), limit) };

                let (result, cursor) = fetch_page(&*provider, cursor)
                    .await
                    .map_err(|e| anyhow::anyhow!(e.user_message()))?;

                if self.json {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                } else {
                    println!("{}: {}\n", id.display_name(), cursor.query);
                    print!("{}", render::search_page(&result, Some(&cursor)));
                }
            }
            Command::Weather { city } => {
                let fetcher = HttpFetcher::new(&config.http)?;
                let mut controller = WeatherController::from_config(fetcher, &config);

                match controller.load(&city).await {
                    PageState::Loaded(forecast) if self.json => {
                        let value = serde_json::json!({
                            "place": forecast.place,
                            "series": forecast.series,
                        });
                        println!("{}", serde_json::to_string_pretty(&value)?);
                    }
                    PageState::Loaded(forecast) => print!("{}", render::forecast(forecast)),
                    PageState::Failed(message) => bail!("{message}"),
                    PageState::Idle => {}
                }
            }
            Command::Market { symbol, file } => {
                let fetcher = HttpFetcher::new(&config.http)?;
                let mut controller = MarketController::from_config(fetcher, &config);

                let source = match (file, symbol) {
                    (Some(path), _) => MarketSource::File(path),
                    (None, Some(symbol)) => MarketSource::Online(symbol),
                    (None, None) => MarketSource::Online(controller.default_symbol().to_string()),
                };

                match controller.load(source).await {
                    PageState::Loaded(chart) if self.json => {
                        println!("{}", serde_json::to_string_pretty(&chart.series)?);
                    }
                    PageState::Loaded(chart) => print!("{}", render::market(chart)),
                    PageState::Failed(message) => bail!("{message}"),
                    PageState::Idle => {}
                }
            }
            Command::Dashboard => dashboard::run(&config).await?,
            Command::Configure => configure::run(config)?,
        }

        Ok(())
    }
}
