use anyhow::Context;
use inquire::{CustomType, Select, Text};
use openlab_core::{ArtProviderId, Config, art::PAGE_SIZES};

/// Walk through the editable settings and save them.
pub fn run(mut config: Config) -> anyhow::Result<()> {
    let ids = ArtProviderId::all().to_vec();
    let current = config.default_art_provider_id().unwrap_or(ArtProviderId::Artic);
    let start = ids.iter().position(|id| *id == current).unwrap_or(0);
    let provider = Select::new("Default art collection:", ids).with_starting_cursor(start).prompt()?;
    config.set_default_art_provider(provider);

    let start = PAGE_SIZES.iter().position(|s| *s == config.art.page_size).unwrap_or(1);
    config.art.page_size =
        Select::new("Results per page:", PAGE_SIZES.to_vec()).with_starting_cursor(start).prompt()?;

    config.market.default_symbol = Text::new("Default ticker symbol:")
        .with_default(&config.market.default_symbol)
        .prompt()?;

    config.http.timeout_secs = CustomType::<u64>::new("Request timeout (seconds):")
        .with_default(config.http.timeout_secs)
        .with_error_message("Please type a whole number of seconds")
        .prompt()?;

    config.save().context("Failed to save configuration")?;

    let path = Config::config_file_path()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}
