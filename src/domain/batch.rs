//! Multi-ticker indicator batches.
//!
//! Each ticker and each indicator is computed independently; a failure is
//! recorded against that one indicator and never aborts the rest of the batch. With the `parallel` feature
//! tickers are spread over the rayon pool, and results always come back in
//! the caller's order.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::domain::error::{AnalyticsError, Result};
use crate::domain::indicator::{compute, IndicatorResult, IndicatorType};
use crate::domain::time_series::TimeSeries;

/// Outcome of one ticker in a batch.
#[derive(Debug)]
pub struct TickerIndicators {
    pub ticker: String,
    /// One entry per requested indicator, in request order.
    pub outcomes: Vec<Result<IndicatorResult>>,
}

impl TickerIndicators {
    /// Every requested indicator succeeded.
    pub fn is_ok(&self) -> bool {
        self.outcomes.iter().all(|o| o.is_ok())
    }

    pub fn successes(&self) -> impl Iterator<Item = &IndicatorResult> {
        self.outcomes.iter().filter_map(|o| o.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &AnalyticsError> {
        self.outcomes.iter().filter_map(|o| o.as_ref().err())
    }
}

/// Compute every indicator for every series.
///
/// `force_sequential` disables the rayon pool even when the `parallel`
/// feature is compiled in.
pub fn compute_batch(
    series: &[TimeSeries],
    indicators: &[IndicatorType],
    force_sequential: bool,
) -> Vec<TickerIndicators> {
    let results = map_slice(
        series,
        |s| TickerIndicators {
            ticker: s.ticker().to_string(),
            outcomes: indicators.iter().map(|ind| compute(s, ind)).collect(),
        },
        force_sequential,
    );

    for entry in &results {
        for e in entry.failures() {
            log::warn!("indicator batch: {}: {}", entry.ticker, e);
        }
    }
    log::debug!(
        "indicator batch: {}/{} tickers succeeded",
        results.iter().filter(|r| r.is_ok()).count(),
        results.len()
    );
    results
}

fn map_slice<T, F, R>(slice: &[T], f: F, force_sequential: bool) -> Vec<R>
where
    T: Sync,
    F: Fn(&T) -> R + Sync + Send,
    R: Send,
{
    #[cfg(feature = "parallel")]
    {
        if force_sequential {
            slice.iter().map(f).collect()
        } else {
            slice.par_iter().map(f).collect()
        }
    }

    #[cfg(not(feature = "parallel"))]
    {
        let _ = force_sequential;
        slice.iter().map(f).collect()
    }
}
