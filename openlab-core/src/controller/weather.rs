use crate::{
    Config,
    error::LabError,
    geocode::Geocoder,
    http::HttpFetcher,
    model::{GeoResult, WeatherSeries},
    weather::WeatherClient,
};

use super::PageState;

#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub place: GeoResult,
    pub series: WeatherSeries,
}

#[derive(Debug)]
pub struct WeatherController {
    geocoder: Geocoder,
    client: WeatherClient,
    state: PageState<Forecast>,
}

impl WeatherController {
    pub fn new(geocoder: Geocoder, client: WeatherClient) -> Self {
        Self { geocoder, client, state: PageState::Idle }
    }

    pub fn from_config(fetcher: HttpFetcher, config: &Config) -> Self {
        let geocoder = Geocoder::with_capacity(
            fetcher.clone(),
            config.endpoints.geocoding.clone(),
            config.geocode_cache_capacity,
        );
        let client = WeatherClient::new(fetcher, config.endpoints.forecast.clone());
        Self::new(geocoder, client)
    }

    pub fn state(&self) -> &PageState<Forecast> {
        &self.state
    }

    pub fn geocoder(&self) -> &Geocoder {
        &self.geocoder
    }

    /// Geocode `city`, then fetch its forecast. An unknown city renders "City not found.".
    pub async fn load(&mut self, city: &str) -> &PageState<Forecast> {
        let result = self.forecast_for(city.trim()).await;
        self.state = PageState::from_result("weather", result);
        &self.state
    }

    async fn forecast_for(&mut self, city: &str) -> Result<Forecast, LabError> {
        if city.is_empty() {
            return Err(LabError::invalid_input("Please enter a city name."));
        }

        let place = self.geocoder.resolve_city(city).await?;
        let series = self.client.fetch_forecast(place.latitude, place.longitude).await?;
        Ok(Forecast { place, series })
    }
}
