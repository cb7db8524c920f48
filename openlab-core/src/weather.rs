use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::debug;

use crate::{error::LabError, http::HttpFetcher, model::WeatherSeries};

pub const FORECAST_DAYS: u32 = 3;
const HOURLY_FIELDS: &str = "temperature_2m,relative_humidity_2m";

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    timezone: Option<String>,
    hourly: Option<HourlyData>,
}

#[derive(Debug, Default, Deserialize)]
struct HourlyData {
    #[serde(default)]
    time: Vec<String>,
    #[serde(rename = "temperature_2m", default)]
    temperature: Vec<Option<f64>>,
    #[serde(rename = "relative_humidity_2m", default)]
    humidity: Vec<Option<f64>>,
}

/// Fixed 3-day hourly forecast. Never cached.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    fetcher: HttpFetcher,
    base_url: String,
}

impl WeatherClient {
    pub fn new(fetcher: HttpFetcher, base_url: impl Into<String>) -> Self {
        Self { fetcher, base_url: base_url.into() }
    }

    pub async fn fetch_forecast(&self, lat: f64, lon: f64) -> Result<WeatherSeries, LabError> {
        let url = format!("{}/v1/forecast", self.base_url);
        let response: ForecastResponse = self
            .fetcher
            .fetch_json(
                &url,
                &[
                    ("latitude", lat.to_string()),
                    ("longitude", lon.to_string()),
                    ("hourly", HOURLY_FIELDS.to_string()),
                    ("forecast_days", FORECAST_DAYS.to_string()),
                    ("timezone", "auto".to_string()),
                ],
            )
            .await?;

        let series = shape_forecast(response)?;
        debug!(lat, lon, hours = series.len(), "forecast fetched");
        Ok(series)
    }
}

fn shape_forecast(response: ForecastResponse) -> Result<WeatherSeries, LabError> {
    let hourly = response.hourly.unwrap_or_default();

    if hourly.temperature.len() != hourly.time.len() || hourly.humidity.len() != hourly.time.len()
    {
        return Err(LabError::parse(format!(
            "hourly arrays differ in length (time {}, temperature {}, humidity {})",
            hourly.time.len(),
            hourly.temperature.len(),
            hourly.humidity.len(),
        )));
    }

    let mut series = WeatherSeries { timezone: response.timezone, ..WeatherSeries::default() };

    for ((time, temp), hum) in hourly.time.iter().zip(hourly.temperature).zip(hourly.humidity) {
        let (Some(temp), Some(hum)) = (temp, hum) else {
            continue;
        };
        series.timestamps.push(parse_hour(time)?);
        series.temperature.push(temp);
        series.humidity.push(hum);
    }

    Ok(series)
}

// Open-Meteo sends local times without seconds, e.g. "2024-05-01T13:00".
fn parse_hour(raw: &str) -> Result<NaiveDateTime, LabError> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| LabError::parse(format!("invalid forecast timestamp '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpSettings;
    use mockito::Matcher;

    fn client(base: &str) -> WeatherClient {
        WeatherClient::new(HttpFetcher::new(&HttpSettings::default()).unwrap(), base)
    }

    #[tokio::test]
    async fn fetches_co_indexed_series_with_fixed_params() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/forecast")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("latitude".into(), "52.52".into()),
                Matcher::UrlEncoded("longitude".into(), "13.41".into()),
                Matcher::UrlEncoded("hourly".into(), HOURLY_FIELDS.into()),
                Matcher::UrlEncoded("forecast_days".into(), "3".into()),
                Matcher::UrlEncoded("timezone".into(), "auto".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{
                    "timezone": "Europe/Berlin",
                    "hourly": {
                        "time": ["2024-05-01T00:00", "2024-05-01T01:00"],
                        "temperature_2m": [11.2, 10.8],
                        "relative_humidity_2m": [80, 83]
                    }
                }"#,
            )
            .create_async()
            .await;

        let series = client(&server.url()).fetch_forecast(52.52, 13.41).await.unwrap();

        mock.assert_async().await;
        assert_eq!(series.len(), 2);
        assert_eq!(series.timezone.as_deref(), Some("Europe/Berlin"));
        assert_eq!(series.temperature, vec![11.2, 10.8]);
        assert_eq!(series.humidity, vec![80.0, 83.0]);
        assert_eq!(series.timestamps[1].to_string(), "2024-05-01 01:00:00");
    }

    #[tokio::test]
    async fn empty_hourly_arrays_are_a_valid_empty_series() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/forecast")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"hourly": {"time": [], "temperature_2m": [], "relative_humidity_2m": []}}"#)
            .create_async()
            .await;

        let series = client(&server.url()).fetch_forecast(0.0, 0.0).await.unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn missing_hourly_block_is_empty() {
        let response: ForecastResponse = serde_json::from_str(r#"{"timezone": "GMT"}"#).unwrap();
        assert!(shape_forecast(response).unwrap().is_empty());
    }

    #[test]
    fn null_hours_are_dropped_from_every_series() {
        let response: ForecastResponse = serde_json::from_str(
            r#"{"hourly": {
                "time": ["2024-05-01T00:00", "2024-05-01T01:00", "2024-05-01T02:00"],
                "temperature_2m": [1.0, null, 3.0],
                "relative_humidity_2m": [50, 60, null]
            }}"#,
        )
        .unwrap();

        let series = shape_forecast(response).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.temperature, vec![1.0]);
        assert_eq!(series.humidity, vec![50.0]);
    }

    #[test]
    fn mismatched_lengths_are_parse_errors() {
        let response: ForecastResponse = serde_json::from_str(
            r#"{"hourly": {"time": ["2024-05-01T00:00"], "temperature_2m": [], "relative_humidity_2m": [1]}}"#,
        )
        .unwrap();

        assert!(matches!(shape_forecast(response), Err(LabError::Parse { .. })));
    }
}
