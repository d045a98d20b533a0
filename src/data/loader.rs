//! CSV loading for price tables, sentiment series and news headlines.

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::{PriceTable, SentimentSeries};
use crate::error::{Error, Result};
use crate::sentiment::{Headline, ScoredHeadline};

/// Parse a date cell: RFC 3339, `YYYY-MM-DD HH:MM:SS` or plain `YYYY-MM-DD` (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| Error::Parse(format!("unrecognised timestamp {:?}", raw)))
}

fn parse_price_cell(raw: &str) -> Result<Option<f64>> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|e| Error::Parse(format!("price {:?}: {}", raw, e)))
}

/// Load a wide price table: first column is the date, one column per ticker.
///
/// Rows are sorted by date. Header-artifact rows (no parseable date and no
/// prices) are skipped; a repeated date is an error.
pub fn load_price_table<P: AsRef<Path>>(path: P) -> Result<PriceTable> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    if headers.len() < 2 {
        return Err(Error::Parse(format!(
            "{}: expected a date column and at least one ticker column",
            path.display()
        )));
    }
    let tickers: Vec<String> = headers.iter().skip(1).map(|h| h.trim().to_string()).collect();

    let mut records: Vec<(DateTime<Utc>, Vec<Option<f64>>)> = Vec::new();
    for result in reader.records() {
        let record = result?;
        let cells = record
            .iter()
            .skip(1)
            .map(parse_price_cell)
            .collect::<Result<Vec<_>>>()?;

        let timestamp = match parse_timestamp(&record[0]) {
            Ok(ts) => ts,
            Err(_) if cells.iter().all(Option::is_none) => continue,
            Err(e) => return Err(e),
        };
        records.push((timestamp, cells));
    }

    records.sort_by_key(|(ts, _)| *ts);
    if let Some(pair) = records.windows(2).find(|w| w[0].0 == w[1].0) {
        return Err(Error::DataAlignment(format!(
            "{}: duplicate price date {}",
            path.display(),
            pair[0].0
        )));
    }

    debug!(
        path = %path.display(),
        rows = records.len(),
        assets = tickers.len(),
        "loaded price table"
    );

    let (timestamps, rows) = records.into_iter().unzip();
    PriceTable::new(tickers, timestamps, rows)
}

#[derive(Debug, Deserialize)]
struct SentimentRow {
    date: String,
    sentiment: Option<f64>,
}

/// Load a scored-news file with `date` and `sentiment` columns; other columns are ignored.
pub fn load_sentiment_series<P: AsRef<Path>>(path: P) -> Result<SentimentSeries> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)?;
    let mut points = Vec::new();

    for result in reader.deserialize() {
        let row: SentimentRow = result?;
        if let Some(score) = row.sentiment {
            points.push((parse_timestamp(&row.date)?, score));
        }
    }

    debug!(path = %path.display(), points = points.len(), "loaded sentiment series");
    Ok(SentimentSeries::from_points(points))
}

#[derive(Debug, Serialize, Deserialize)]
struct HeadlineRow {
    date: String,
    headline: String,
}

#[derive(Debug, Serialize)]
struct ScoredRow<'a> {
    date: String,
    headline: &'a str,
    sentiment: f64,
}

/// Load `date,headline` rows.
pub fn load_headlines<P: AsRef<Path>>(path: P) -> Result<Vec<Headline>> {
    let mut reader = csv::Reader::from_path(path)?;
    reader
        .deserialize()
        .map(|result| {
            let row: HeadlineRow = result?;
            Ok(Headline {
                timestamp: parse_timestamp(&row.date)?,
                text: row.headline,
            })
        })
        .collect()
}

/// Write `date,headline,sentiment` rows, the format [`load_sentiment_series`] reads.
pub fn write_scored_news<P: AsRef<Path>>(path: P, scored: &[ScoredHeadline]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for item in scored {
        writer.serialize(ScoredRow {
            date: item.timestamp.format("%Y-%m-%d").to_string(),
            headline: &item.text,
            sentiment: item.sentiment,
        })?;
    }
    writer.flush()?;
    Ok(())
}
