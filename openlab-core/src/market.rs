use chrono::NaiveDate;
use csv::StringRecord;
use std::{fs, path::Path, path::PathBuf};
use tracing::debug;

use crate::{
    error::LabError,
    http::HttpFetcher,
    model::{MarketRow, MarketSeries},
};

pub const DEFAULT_SYMBOL: &str = "^ks200";

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d", "%d.%m.%Y", "%m/%d/%Y"];

/// Where the CSV comes from. Both paths go through `parse_series`.
#[derive(Debug, Clone, PartialEq)]
pub enum MarketSource {
    Online(String),
    File(PathBuf),
}

impl std::fmt::Display for MarketSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarketSource::Online(symbol) => write!(f, "{symbol}"),
            MarketSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MarketClient {
    fetcher: HttpFetcher,
    base_url: String,
}

impl MarketClient {
    pub fn new(fetcher: HttpFetcher, base_url: impl Into<String>) -> Self {
        Self { fetcher, base_url: base_url.into() }
    }

    /// Raw CSV for `symbol`. Parsing is left to the caller.
    pub async fn fetch_daily_csv(&self, symbol: &str) -> Result<String, LabError> {
        let url = format!("{}/q/d/l/", self.base_url);
        let text = self
            .fetcher
            .fetch_text(&url, &[("s", symbol.to_string()), ("i", "d".to_string())])
            .await?;

        debug!(symbol, bytes = text.len(), "market csv fetched");
        Ok(text)
    }
}

pub fn parse_series_file(path: &Path) -> Result<MarketSeries, LabError> {
    let text = fs::read_to_string(path)?;
    parse_series(&text)
}

#[derive(Debug)]
struct Columns {
    date: usize,
    value: usize,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    volume: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self, LabError> {
        if headers.is_empty() {
            return Err(LabError::parse("CSV has no header row"));
        }

        let find = |name: &str| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name));

        let date = find("date").unwrap_or(0);
        let value = find("close").unwrap_or(headers.len() - 1);

        if value == date {
            return Err(LabError::parse("CSV has no value column besides the date"));
        }

        Ok(Self {
            date,
            value,
            open: find("open"),
            high: find("high"),
            low: find("low"),
            volume: find("volume"),
        })
    }
}

/// Shape CSV text into rows sorted by date.
///
/// Rows whose date or value does not parse are skipped. Zero usable rows is an error.
pub fn parse_series(text: &str) -> Result<MarketSeries, LabError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| LabError::parse(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let columns = Columns::resolve(&headers)?;
    let value_column = headers.get(columns.value).unwrap_or_default().to_string();

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1
        let line = idx + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                debug!(line, error = %e, "skipping unreadable CSV row");
                continue;
            }
        };

        let Some(date) = record.get(columns.date).and_then(parse_date) else {
            debug!(line, "skipping row without a valid date");
            continue;
        };
        let Some(close) = record.get(columns.value).and_then(parse_number) else {
            debug!(line, "skipping row without a valid value");
            continue;
        };

        let field = |col: Option<usize>| col.and_then(|c| record.get(c)).and_then(parse_number);

        rows.push(MarketRow {
            date,
            open: field(columns.open),
            high: field(columns.high),
            low: field(columns.low),
            close,
            volume: field(columns.volume).filter(|v| *v >= 0.0).map(|v| v.round() as u64),
        });
    }

    if rows.is_empty() {
        return Err(LabError::parse(format!(
            "no usable rows (header: {})",
            headers.iter().collect::<Vec<_>>().join(",")
        )));
    }

    rows.sort_by_key(|r| r.date);

    Ok(MarketSeries { value_column, rows })
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS.iter().find_map(|fmt| NaiveDate::parse_from_str(raw.trim(), fmt).ok())
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().replace(',', "").parse::<f64>().ok().filter(|v| v.is_finite())
}
