use crate::{
    Config,
    error::LabError,
    http::HttpFetcher,
    market::{MarketClient, MarketSource, parse_series, parse_series_file},
    model::MarketSeries,
};

use super::PageState;

#[derive(Debug, Clone, PartialEq)]
pub struct MarketChart {
    pub source: MarketSource,
    pub series: MarketSeries,
}

#[derive(Debug)]
pub struct MarketController {
    client: MarketClient,
    default_symbol: String,
    state: PageState<MarketChart>,
}

impl MarketController {
    pub fn new(client: MarketClient, default_symbol: impl Into<String>) -> Self {
        Self { client, default_symbol: default_symbol.into(), state: PageState::Idle }
    }

    pub fn from_config(fetcher: HttpFetcher, config: &Config) -> Self {
        let client = MarketClient::new(fetcher, config.endpoints.stooq.clone());
        Self::new(client, config.market.default_symbol.clone())
    }

    pub fn default_symbol(&self) -> &str {
        &self.default_symbol
    }

    pub fn state(&self) -> &PageState<MarketChart> {
        &self.state
    }

    pub async fn load(&mut self, source: MarketSource) -> &PageState<MarketChart> {
        let result = self.chart_for(source).await;
        self.state = PageState::from_result("market", result);
        &self.state
    }

    async fn chart_for(&self, source: MarketSource) -> Result<MarketChart, LabError> {
        let series = match &source {
            MarketSource::Online(symbol) => {
                let symbol = symbol.trim();
                if symbol.is_empty() {
                    return Err(LabError::invalid_input("Please enter a ticker symbol."));
                }
                let text = self.client.fetch_daily_csv(symbol).await?;
                parse_series(&text)?
            }
            MarketSource::File(path) => parse_series_file(path)?,
        };

        Ok(MarketChart { source, series })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Endpoints;
    use mockito::Matcher;

    fn controller(base: &str) -> MarketController {
        let config = Config { endpoints: Endpoints::all_at(base), ..Config::default() };
        let fetcher = HttpFetcher::new(&config.http).unwrap();
        MarketController::from_config(fetcher, &config)
    }

    #[tokio::test]
    async fn online_symbol_is_fetched_and_shaped() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/q/d/l/")
            .match_query(Matcher::UrlEncoded("s".into(), "aapl.us".into()))
            .with_status(200)
            .with_body("Date,Open,High,Low,Close,Volume\n2024-01-02,1,2,0.5,1.5,100\n")
            .create_async()
            .await;

        let mut ctl = controller(&server.url());
        let chart = ctl.load(MarketSource::Online("aapl.us".into())).await.loaded().cloned().unwrap();

        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.series.rows[0].close, 1.5);
        assert_eq!(ctl.default_symbol(), "^ks200");
    }

    #[tokio::test]
    async fn no_data_symbol_fails_inline() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/q/d/l/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("No data")
            .create_async()
            .await;

        let mut ctl = controller(&server.url());
        let state = ctl.load(MarketSource::Online("zzzz".into())).await;
        assert!(state.failure().unwrap().starts_with("Could not read the response"));
    }

    #[tokio::test]
    async fn uploaded_file_without_close_plots_last_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        std::fs::write(&path, "Date,Price,Last\n2024-01-03,5,6\n2024-01-02,3,4\n").unwrap();

        let mut ctl = controller("http://127.0.0.1:9");
        let chart = ctl.load(MarketSource::File(path.clone())).await.loaded().cloned().unwrap();

        assert_eq!(chart.source, MarketSource::File(path));
        assert_eq!(chart.series.value_column, "Last");
        assert_eq!(chart.series.rows.iter().map(|r| r.close).collect::<Vec<_>>(), vec![4.0, 6.0]);
    }

    #[tokio::test]
    async fn blank_symbol_fails_without_request() {
        let mut ctl = controller("http://127.0.0.1:9");
        let state = ctl.load(MarketSource::Online(" ".into())).await;
        assert_eq!(state.failure(), Some("Please enter a ticker symbol."));
    }
}
