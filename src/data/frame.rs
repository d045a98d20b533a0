//! Price tables, sentiment series and the aligned frame the environment runs on.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2, ArrayView1};
use tracing::debug;

use crate::error::{Error, Result};

/// Per-asset price table as loaded from disk, before alignment.
///
/// A missing cell is `None`; alignment forward-fills it.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    tickers: Vec<String>,
    timestamps: Vec<DateTime<Utc>>,
    rows: Vec<Vec<Option<f64>>>,
}

impl PriceTable {
    /// Create a price table.
    ///
    /// Timestamps must be strictly increasing and every row must hold one cell per ticker.
    pub fn new(
        tickers: Vec<String>,
        timestamps: Vec<DateTime<Utc>>,
        rows: Vec<Vec<Option<f64>>>,
    ) -> Result<Self> {
        if tickers.is_empty() {
            return Err(Error::DataAlignment(
                "price table has no asset columns".to_string(),
            ));
        }
        if timestamps.len() != rows.len() {
            return Err(Error::DataAlignment(format!(
                "price table has {} timestamps but {} rows",
                timestamps.len(),
                rows.len()
            )));
        }
        if let Some(i) = rows.iter().position(|row| row.len() != tickers.len()) {
            return Err(Error::DataAlignment(format!(
                "price row {} has {} cells, expected {}",
                i,
                rows[i].len(),
                tickers.len()
            )));
        }
        check_increasing(&timestamps)?;

        Ok(Self {
            tickers,
            timestamps,
            rows,
        })
    }

    /// Create a table with no missing cells.
    pub fn from_prices(
        tickers: Vec<String>,
        timestamps: Vec<DateTime<Utc>>,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(Some).collect())
            .collect();
        Self::new(tickers, timestamps, rows)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.rows
    }

    /// Split chronologically: the first `floor(len * fraction)` rows go left.
    pub fn split_at_fraction(&self, fraction: f64) -> (PriceTable, PriceTable) {
        let cut = ((self.len() as f64 * fraction.clamp(0.0, 1.0)).floor() as usize).min(self.len());
        let head = PriceTable {
            tickers: self.tickers.clone(),
            timestamps: self.timestamps[..cut].to_vec(),
            rows: self.rows[..cut].to_vec(),
        };
        let tail = PriceTable {
            tickers: self.tickers.clone(),
            timestamps: self.timestamps[cut..].to_vec(),
            rows: self.rows[cut..].to_vec(),
        };
        (head, tail)
    }
}

/// Sentiment scores keyed by timestamp.
///
/// Several scores on the same timestamp are averaged; non-finite scores are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SentimentSeries {
    points: BTreeMap<DateTime<Utc>, f64>,
}

impl SentimentSeries {
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = (DateTime<Utc>, f64)>,
    {
        let mut acc: BTreeMap<DateTime<Utc>, (f64, usize)> = BTreeMap::new();
        for (ts, score) in points.into_iter().filter(|(_, s)| s.is_finite()) {
            let entry = acc.entry(ts).or_insert((0.0, 0));
            entry.0 += score;
            entry.1 += 1;
        }

        Self {
            points: acc
                .into_iter()
                .map(|(ts, (sum, count))| (ts, sum / count as f64))
                .collect(),
        }
    }

    pub fn get(&self, timestamp: &DateTime<Utc>) -> Option<f64> {
        self.points.get(timestamp).copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DateTime<Utc>, &f64)> {
        self.points.iter()
    }
}

/// Immutable, time-indexed table of per-asset prices plus one sentiment scalar per row.
///
/// Invariants: strictly increasing timestamps, at least one asset, every price
/// finite and positive, every sentiment value finite.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedFrame {
    tickers: Vec<String>,
    timestamps: Vec<DateTime<Utc>>,
    prices: Array2<f64>,
    sentiment: Array1<f64>,
}

impl AlignedFrame {
    /// Build a frame from already-aligned columns.
    pub fn new(
        tickers: Vec<String>,
        timestamps: Vec<DateTime<Utc>>,
        prices: Array2<f64>,
        sentiment: Array1<f64>,
    ) -> Result<Self> {
        if tickers.is_empty() {
            return Err(Error::DataAlignment("frame has no assets".to_string()));
        }
        if prices.ncols() != tickers.len() {
            return Err(Error::DataAlignment(format!(
                "price matrix has {} columns for {} tickers",
                prices.ncols(),
                tickers.len()
            )));
        }
        if prices.nrows() != timestamps.len() || sentiment.len() != timestamps.len() {
            return Err(Error::DataAlignment(format!(
                "row count mismatch: {} timestamps, {} price rows, {} sentiment values",
                timestamps.len(),
                prices.nrows(),
                sentiment.len()
            )));
        }
        check_increasing(&timestamps)?;
        if let Some(((row, col), price)) = prices
            .indexed_iter()
            .find(|(_, p)| !(p.is_finite() && **p > 0.0))
        {
            return Err(Error::DataAlignment(format!(
                "price for {} at row {} is {}, expected a finite positive value",
                tickers[col], row, price
            )));
        }
        if let Some(row) = sentiment.iter().position(|s| !s.is_finite()) {
            return Err(Error::DataAlignment(format!(
                "sentiment at row {} is not finite",
                row
            )));
        }

        Ok(Self {
            tickers,
            timestamps,
            prices,
            sentiment,
        })
    }

    /// Join sentiment onto the price timestamps, forward-fill every column and
    /// drop the rows that still have a gap.
    ///
    /// The join is an exact timestamp match; sentiment stamped on a timestamp
    /// with no price row is not carried.
    pub fn align(prices: &PriceTable, sentiment: &SentimentSeries) -> Result<Self> {
        let n_assets = prices.tickers().len();
        let mut last: Vec<Option<f64>> = vec![None; n_assets + 1];
        let mut timestamps = Vec::with_capacity(prices.len());
        let mut flat = Vec::with_capacity(prices.len() * n_assets);
        let mut scores = Vec::with_capacity(prices.len());

        for (ts, row) in prices.timestamps().iter().zip(prices.rows()) {
            let cells = row.iter().copied().chain(std::iter::once(sentiment.get(ts)));
            for (slot, cell) in last.iter_mut().zip(cells) {
                if let Some(value) = cell.filter(|v| v.is_finite()) {
                    *slot = Some(value);
                }
            }

            if let Some(values) = last.iter().copied().collect::<Option<Vec<f64>>>() {
                timestamps.push(*ts);
                flat.extend_from_slice(&values[..n_assets]);
                scores.push(values[n_assets]);
            }
        }

        debug!(
            price_rows = prices.len(),
            aligned_rows = timestamps.len(),
            sentiment_points = sentiment.len(),
            "aligned price table with sentiment"
        );

        let matrix = Array2::from_shape_vec((timestamps.len(), n_assets), flat)
            .map_err(|e| Error::DataAlignment(e.to_string()))?;
        Self::new(
            prices.tickers().to_vec(),
            timestamps,
            matrix,
            Array1::from(scores),
        )
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn asset_count(&self) -> usize {
        self.tickers.len()
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Timestamp of a tick. Panics if out of range.
    pub fn timestamp(&self, tick: usize) -> DateTime<Utc> {
        self.timestamps[tick]
    }

    /// Price matrix, rows = ticks, columns = assets.
    pub fn prices(&self) -> &Array2<f64> {
        &self.prices
    }

    pub fn price_row(&self, tick: usize) -> ArrayView1<'_, f64> {
        self.prices.row(tick)
    }

    pub fn sentiment(&self) -> &Array1<f64> {
        &self.sentiment
    }

    pub fn sentiment_at(&self, tick: usize) -> f64 {
        self.sentiment[tick]
    }

    /// Index of the last tick, or `None` for an empty frame.
    pub fn last_tick(&self) -> Option<usize> {
        self.len().checked_sub(1)
    }

    /// Column index of a ticker.
    pub fn asset_index(&self, ticker: &str) -> Option<usize> {
        self.tickers.iter().position(|t| t == ticker)
    }
}

fn check_increasing(timestamps: &[DateTime<Utc>]) -> Result<()> {
    match timestamps.windows(2).position(|w| w[0] >= w[1]) {
        Some(i) => Err(Error::DataAlignment(format!(
            "timestamps are not strictly increasing at row {} ({} >= {})",
            i + 1,
            timestamps[i],
            timestamps[i + 1]
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use ndarray::array;

    fn day(i: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap() + Duration::days(i)
    }

    fn tickers() -> Vec<String> {
        vec!["SPY".to_string(), "GLD".to_string()]
    }

    #[test]
    fn test_align_forward_fills_and_drops_leading_rows() {
        let table = PriceTable::new(
            tickers(),
            (0..5).map(day).collect(),
            vec![
                vec![Some(100.0), Some(50.0)],
                vec![Some(101.0), None],
                vec![Some(102.0), Some(51.0)],
                vec![None, Some(52.0)],
                vec![Some(104.0), Some(53.0)],
            ],
        )
        .unwrap();
        let sentiment = SentimentSeries::from_points(vec![(day(1), 0.5), (day(3), -0.25)]);

        let frame = AlignedFrame::align(&table, &sentiment).unwrap();

        // Row 0 has no sentiment yet and is dropped.
        assert_eq!(frame.len(), 4);
        assert_eq!(frame.timestamp(0), day(1));
        assert_eq!(frame.prices()[[0, 1]], 50.0);
        assert_eq!(frame.prices()[[2, 0]], 102.0);
        assert_eq!(frame.sentiment().to_vec(), vec![0.5, 0.5, -0.25, -0.25]);
    }

    #[test]
    fn test_align_ignores_sentiment_off_the_price_calendar() {
        let table =
            PriceTable::from_prices(tickers(), vec![day(0), day(2)], vec![vec![1.0, 2.0]; 2])
                .unwrap();
        let sentiment = SentimentSeries::from_points(vec![(day(1), 0.9)]);

        let frame = AlignedFrame::align(&table, &sentiment).unwrap();
        assert!(frame.is_empty());
        assert_eq!(frame.last_tick(), None);
    }

    #[test]
    fn test_duplicate_sentiment_is_averaged() {
        let series =
            SentimentSeries::from_points(vec![(day(0), 0.2), (day(0), 0.6), (day(1), f64::NAN)]);
        assert_eq!(series.len(), 1);
        assert!((series.get(&day(0)).unwrap() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_frame_rejects_bad_prices() {
        let result = AlignedFrame::new(
            tickers(),
            vec![day(0), day(1)],
            array![[1.0, 2.0], [0.0, 2.0]],
            array![0.0, 0.0],
        );
        assert!(matches!(result, Err(Error::DataAlignment(_))));
    }

    #[test]
    fn test_frame_rejects_unordered_timestamps() {
        let result = AlignedFrame::new(
            tickers(),
            vec![day(1), day(1)],
            array![[1.0, 2.0], [1.0, 2.0]],
            array![0.0, 0.0],
        );
        assert!(matches!(result, Err(Error::DataAlignment(_))));
    }

    #[test]
    fn test_split_at_fraction() {
        let table =
            PriceTable::from_prices(tickers(), (0..10).map(day).collect(), vec![vec![1.0, 1.0]; 10])
                .unwrap();
        let (train, test) = table.split_at_fraction(0.8);
        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 2);
        assert_eq!(test.timestamps()[0], day(8));
    }
}
