//! Price data input port.

use chrono::NaiveDate;

use crate::domain::error::{AnalyticsError, Result};
use crate::domain::ohlcv::PricePoint;
use crate::domain::time_series::{normalize, RawSeries, TimeSeries};

/// Anything that can supply raw daily prices for a ticker.
///
/// Implementations return points within `[start, end]` inclusive, in any
/// order. Validation happens in [`normalize`] on ingestion.
pub trait PriceSource {
    fn fetch_series(&self, ticker: &str, start: NaiveDate, end: NaiveDate)
        -> Result<Vec<PricePoint>>;

    /// Tickers this source can serve, sorted.
    fn list_tickers(&self) -> Result<Vec<String>>;

    /// Fetch, order by date and validate. An empty range is
    /// [`AnalyticsError::NoData`].
    fn load_series(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<TimeSeries> {
        let mut points = self.fetch_series(ticker, start, end)?;
        if points.is_empty() {
            return Err(AnalyticsError::NoData {
                ticker: ticker.to_string(),
            });
        }
        points.sort_by_key(|p| p.date);
        normalize(RawSeries::new(ticker, points))
    }
}
