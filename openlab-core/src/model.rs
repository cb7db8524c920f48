use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Best geocoding match for a place name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoResult {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: String,
}

impl GeoResult {
    pub fn label(&self) -> String {
        if self.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }
}

/// Hourly forecast. The three series are co-indexed and always the same length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherSeries {
    pub timezone: Option<String>,
    pub timestamps: Vec<NaiveDateTime>,
    pub temperature: Vec<f64>,
    pub humidity: Vec<f64>,
}

impl WeatherSeries {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// `(time, temperature °C, relative humidity %)` per hour.
    pub fn points(&self) -> impl Iterator<Item = (NaiveDateTime, f64, f64)> + '_ {
        self.timestamps
            .iter()
            .zip(&self.temperature)
            .zip(&self.humidity)
            .map(|((t, temp), hum)| (*t, *temp, *hum))
    }

    pub fn temperature_range(&self) -> Option<(f64, f64)> {
        min_max(&self.temperature)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtworkRecord {
    pub title: String,
    pub artist: String,
    pub date_display: String,
    pub image_id: Option<String>,
    pub image_url: Option<String>,
}

/// One page of artwork results plus pagination metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub records: Vec<ArtworkRecord>,
    pub current_page: u32,
    pub total_pages: u32,
    /// Total matches across all pages, as reported by the provider.
    pub total: u64,
}

impl SearchPage {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// One trading day. `close` is the plotted value, which falls back to the last CSV
/// column when the file has no "Close" column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRow {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: Option<u64>,
}

/// Daily rows sorted ascending by date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSeries {
    /// Header of the column the `close` values were read from.
    pub value_column: String,
    pub rows: Vec<MarketRow>,
}

impl MarketSeries {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn latest(&self) -> Option<&MarketRow> {
        self.rows.last()
    }

    /// Last close minus first close.
    pub fn change(&self) -> Option<f64> {
        let first = self.rows.first()?;
        let last = self.rows.last()?;
        Some(last.close - first.close)
    }

    pub fn min_max(&self) -> Option<(f64, f64)> {
        let closes: Vec<f64> = self.rows.iter().map(|r| r.close).collect();
        min_max(&closes)
    }
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    values.iter().copied().filter(|v| v.is_finite()).fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: &str, close: f64) -> MarketRow {
        MarketRow {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            open: None,
            high: None,
            low: None,
            close,
            volume: None,
        }
    }

    #[test]
    fn market_summary_helpers() {
        let series = MarketSeries {
            value_column: "Close".into(),
            rows: vec![row("2024-01-02", 10.0), row("2024-01-03", 7.5), row("2024-01-04", 12.0)],
        };

        assert_eq!(series.change(), Some(2.0));
        assert_eq!(series.min_max(), Some((7.5, 12.0)));
        assert_eq!(series.latest().map(|r| r.close), Some(12.0));
    }

    #[test]
    fn empty_series_has_no_summary() {
        let series = MarketSeries::default();
        assert!(series.change().is_none());
        assert!(series.min_max().is_none());
        assert!(WeatherSeries::default().temperature_range().is_none());
    }

    #[test]
    fn geo_label_omits_empty_country() {
        let geo = GeoResult { name: "Null Island".into(), latitude: 0.0, longitude: 0.0, country: "".into() };
        assert_eq!(geo.label(), "Null Island");
    }
}
