use std::{fmt, path::PathBuf};

use inquire::{InquireError, Select, Text};
use openlab_core::{
    ArtProviderId, Config, Dashboard, MarketSource, PageState,
    art::{PAGE_SIZES, provider_from_config},
    controller::{ArtController, MarketController, WeatherController},
};

use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Art,
    Weather,
    Market,
    Quit,
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tab::Art => "Art search",
            Tab::Weather => "Weather forecast",
            Tab::Market => "Market chart",
            Tab::Quit => "Quit",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArtAction {
    Next,
    Prev,
    NewSearch,
    SwitchProvider,
    Back,
}

impl fmt::Display for ArtAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArtAction::Next => "Next page",
            ArtAction::Prev => "Previous page",
            ArtAction::NewSearch => "New search",
            ArtAction::SwitchProvider => "Switch collection",
            ArtAction::Back => "Back",
        })
    }
}

/// Prev/Next only show up when they would move the cursor.
fn art_actions(controller: &ArtController) -> Vec<ArtAction> {
    let mut actions = Vec::new();
    if controller.can_next() {
        actions.push(ArtAction::Next);
    }
    if controller.can_prev() {
        actions.push(ArtAction::Prev);
    }
    actions.extend([ArtAction::NewSearch, ArtAction::SwitchProvider, ArtAction::Back]);
    actions
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarketInput {
    Online,
    Upload,
    Back,
}

impl fmt::Display for MarketInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MarketInput::Online => "Fetch online",
            MarketInput::Upload => "Load CSV file",
            MarketInput::Back => "Back",
        })
    }
}

/// Esc and Ctrl-C step back instead of aborting the session.
fn answered<T>(result: Result<T, InquireError>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn show_failure(message: &str) {
    println!("\n⚠ {message}\n");
}

pub async fn run(config: &Config) -> anyhow::Result<()> {
    let mut dashboard = Dashboard::from_config(config)?;

    println!("OpenAPI Lab: art, weather and markets from public APIs\n");

    loop {
        let tabs = vec![Tab::Art, Tab::Weather, Tab::Market, Tab::Quit];
        let Some(tab) = answered(Select::new("Choose a tab:", tabs).prompt())? else {
            break;
        };

        match tab {
            Tab::Art => art_tab(&mut dashboard.art, config).await?,
            Tab::Weather => weather_tab(&mut dashboard.weather).await?,
            Tab::Market => market_tab(&mut dashboard.market).await?,
            Tab::Quit => break,
        }
    }

    Ok(())
}

async fn art_tab(controller: &mut ArtController, config: &Config) -> anyhow::Result<()> {
    if !new_art_search(controller, config).await? {
        return Ok(());
    }

    loop {
        match controller.state() {
            PageState::Loaded(page) => print!("\n{}\n", render::search_page(page, controller.cursor())),
            PageState::Failed(message) => show_failure(message),
            PageState::Idle => {}
        }

        let actions = art_actions(controller);
        let Some(action) = answered(Select::new("Action:", actions).prompt())? else {
            return Ok(());
        };

        match action {
            ArtAction::Next => {
                controller.next().await;
            }
            ArtAction::Prev => {
                controller.prev().await;
            }
            ArtAction::NewSearch => {
                if !new_art_search(controller, config).await? {
                    return Ok(());
                }
            }
            ArtAction::SwitchProvider => {
                let current = controller.provider_id();
                let ids = ArtProviderId::all().to_vec();
                let start = ids.iter().position(|id| *id == current).unwrap_or(0);
                let labels: Vec<&str> = ids.iter().map(|id| id.display_name()).collect();

                if let Some(label) =
                    answered(Select::new("Collection:", labels).with_starting_cursor(start).prompt())?
                {
                    let id = ids
                        .into_iter()
                        .find(|id| id.display_name() == label)
                        .unwrap_or(current);
                    controller.set_provider(provider_from_config(id, config)?);
                    if !new_art_search(controller, config).await? {
                        return Ok(());
                    }
                }
            }
            ArtAction::Back => return Ok(()),
        }
    }
}

/// Prompt for keyword and page size, then search. `false` when the user backed out.
async fn new_art_search(controller: &mut ArtController, config: &Config) -> anyhow::Result<bool> {
    let default_keyword =
        controller.cursor().map_or_else(|| "flower".to_string(), |c| c.query.clone());
    let Some(keyword) = answered(
        Text::new(&format!("Search {}:", controller.provider_id().display_name()))
            .with_default(&default_keyword)
            .prompt(),
    )?
    else {
        return Ok(false);
    };

    let start = PAGE_SIZES.iter().position(|s| *s == config.art.page_size).unwrap_or(1);
    let Some(limit) = answered(
        Select::new("Results per page:", PAGE_SIZES.to_vec()).with_starting_cursor(start).prompt(),
    )?
    else {
        return Ok(false);
    };

    controller.search(&keyword, limit).await;
    Ok(true)
}

async fn weather_tab(controller: &mut WeatherController) -> anyhow::Result<()> {
    let Some(city) = answered(Text::new("City name:").with_default("Seoul").prompt())? else {
        return Ok(());
    };

    match controller.load(&city).await {
        PageState::Loaded(forecast) => print!("\n{}\n", render::forecast(forecast)),
        PageState::Failed(message) => show_failure(message),
        PageState::Idle => {}
    }

    Ok(())
}

async fn market_tab(controller: &mut MarketController) -> anyhow::Result<()> {
    let inputs = vec![MarketInput::Online, MarketInput::Upload, MarketInput::Back];
    let Some(input) = answered(Select::new("Data source:", inputs).prompt())? else {
        return Ok(());
    };

    let source = match input {
        MarketInput::Online => {
            let default_symbol = controller.default_symbol().to_string();
            match answered(Text::new("Ticker symbol:").with_default(&default_symbol).prompt())? {
                Some(symbol) => MarketSource::Online(symbol),
                None => return Ok(()),
            }
        }
        MarketInput::Upload => match answered(Text::new("Path to CSV file:").prompt())? {
            Some(path) => MarketSource::File(PathBuf::from(path.trim())),
            None => return Ok(()),
        },
        MarketInput::Back => return Ok(()),
    };

    match controller.load(source).await {
        PageState::Loaded(chart) => print!("\n{}\n", render::market(chart)),
        PageState::Failed(message) => show_failure(message),
        PageState::Idle => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_art_tab_offers_no_paging() {
        let config = Config::default();
        let dashboard = Dashboard::from_config(&config).unwrap();

        assert_eq!(
            art_actions(&dashboard.art),
            vec![ArtAction::NewSearch, ArtAction::SwitchProvider, ArtAction::Back]
        );
    }

    #[test]
    fn cancelled_prompt_is_not_an_error() {
        let res: Result<u8, InquireError> = Err(InquireError::OperationCanceled);
        assert!(answered(res).unwrap().is_none());
    }
}
