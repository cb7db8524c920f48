use std::fmt::Write;

use openlab_core::{
    SearchPage,
    controller::{Forecast, MarketChart, PageCursor},
};

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const CHART_WIDTH: usize = 60;
// Every third hour keeps a 3-day table readable.
const HOURLY_STEP: usize = 3;
const MARKET_TABLE_ROWS: usize = 10;

/// Unicode line chart, bucket-averaged down to at most `width` cells.
pub fn sparkline(values: &[f64], width: usize) -> String {
    if values.is_empty() || width == 0 {
        return String::new();
    }

    let buckets: Vec<f64> = if values.len() <= width {
        values.to_vec()
    } else {
        (0..width)
            .map(|i| {
                let start = i * values.len() / width;
                let end = ((i + 1) * values.len() / width).max(start + 1);
                let slice = &values[start..end];
                slice.iter().sum::<f64>() / slice.len() as f64
            })
            .collect()
    };

    let lo = buckets.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = buckets.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = hi - lo;

    buckets
        .iter()
        .map(|v| {
            if span <= f64::EPSILON {
                BARS[BARS.len() / 2]
            } else {
                let idx = ((v - lo) / span * (BARS.len() - 1) as f64).round() as usize;
                BARS[idx.min(BARS.len() - 1)]
            }
        })
        .collect()
}

pub fn search_page(page: &SearchPage, cursor: Option<&PageCursor>) -> String {
    let mut out = String::new();

    if page.is_empty() {
        if page.total == 0 {
            out.push_str("No results.\n");
            return out;
        }
        // Matches exist but none of this page's records could be loaded.
        out.push_str("Could not load any artworks on this page.\n");
    }

    for (i, art) in page.records.iter().enumerate() {
        let _ = writeln!(out, "{:>3}. {}", i + 1, art.title);
        // Artic packs nationality and dates onto extra lines.
        let artist = art.artist.lines().next().unwrap_or_default();
        if art.date_display.is_empty() {
            let _ = writeln!(out, "     {artist}");
        } else {
            let _ = writeln!(out, "     {artist} · {}", art.date_display);
        }
        if let Some(url) = &art.image_url {
            let _ = writeln!(out, "     {url}");
        }
    }

    match cursor {
        Some(c) => {
            let _ = writeln!(
                out,
                "\nPage {} of {} ({} matches for \"{}\")",
                c.page,
                c.total_pages.max(1),
                page.total,
                c.query
            );
        }
        None => {
            let _ = writeln!(out, "\nPage {} of {}", page.current_page, page.total_pages.max(1));
        }
    }

    out
}

pub fn forecast(forecast: &Forecast) -> String {
    let mut out = String::new();
    let place = &forecast.place;
    let series = &forecast.series;

    let _ = writeln!(
        out,
        "{} ({:.4}, {:.4})",
        place.label(),
        place.latitude,
        place.longitude
    );

    if series.is_empty() {
        out.push_str("No data.\n");
        return out;
    }

    if let Some(tz) = &series.timezone {
        let _ = writeln!(out, "Timezone: {tz}");
    }
    if let Some((lo, hi)) = series.temperature_range() {
        let _ = writeln!(out, "Temperature {lo:.1} .. {hi:.1} °C over {} hours", series.len());
    }

    let _ = writeln!(out, "\nTemperature °C {}", sparkline(&series.temperature, CHART_WIDTH));
    let _ = writeln!(out, "Humidity %     {}\n", sparkline(&series.humidity, CHART_WIDTH));

    let _ = writeln!(out, "{:<17} {:>8} {:>9}", "Time", "Temp °C", "Humid %");
    for (time, temp, hum) in series.points().step_by(HOURLY_STEP) {
        let _ = writeln!(out, "{:<17} {temp:>8.1} {hum:>9.0}", time.format("%Y-%m-%d %H:%M"));
    }

    out
}

pub fn market(chart: &MarketChart) -> String {
    let mut out = String::new();
    let series = &chart.series;

    let _ = writeln!(out, "{} ({}, {} days)", chart.source, series.value_column, series.len());

    if let (Some(last), Some(change)) = (series.latest(), series.change()) {
        let first = series.rows.first().map_or(last.close, |r| r.close);
        let pct = if first.abs() > f64::EPSILON { change / first * 100.0 } else { 0.0 };
        let _ = writeln!(out, "Latest {:.2} on {} ({change:+.2}, {pct:+.2}%)", last.close, last.date);
    }
    if let Some((lo, hi)) = series.min_max() {
        let _ = writeln!(out, "Range {lo:.2} .. {hi:.2}");
    }

    let closes: Vec<f64> = series.rows.iter().map(|r| r.close).collect();
    let _ = writeln!(out, "\n{}\n", sparkline(&closes, CHART_WIDTH));

    let _ = writeln!(
        out,
        "{:<10} {:>10} {:>10} {:>10} {:>10} {:>12}",
        "Date", "Open", "High", "Low", &series.value_column, "Volume"
    );
    let skip = series.len().saturating_sub(MARKET_TABLE_ROWS);
    for row in series.rows.iter().skip(skip) {
        let _ = writeln!(
            out,
            "{:<10} {:>10} {:>10} {:>10} {:>10.2} {:>12}",
            row.date,
            opt(row.open),
            opt(row.high),
            opt(row.low),
            row.close,
            row.volume.map_or_else(|| "-".to_string(), |v| v.to_string()),
        );
    }

    out
}

fn opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}
