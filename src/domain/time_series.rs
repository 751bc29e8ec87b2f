//! Validated per-ticker price series.
//!
//! `normalize` is the ingestion boundary: everything downstream may assume a
//! non-empty series with strictly increasing dates and positive prices.

use chrono::{Datelike, NaiveDate};

use crate::domain::error::{AnalyticsError, Result};
use crate::domain::ohlcv::PricePoint;

/// Unvalidated series as delivered by a price source.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawSeries {
    pub ticker: String,
    pub points: Vec<PricePoint>,
}

impl RawSeries {
    pub fn new(ticker: impl Into<String>, points: Vec<PricePoint>) -> Self {
        RawSeries {
            ticker: ticker.into(),
            points,
        }
    }
}

/// Weekdays missing between two consecutive points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gap {
    pub after: NaiveDate,
    pub before: NaiveDate,
    pub missing_weekdays: u32,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TimeSeries {
    ticker: String,
    points: Vec<PricePoint>,
    gaps: Vec<Gap>,
}

impl TimeSeries {
    /// Caller guarantees the points already satisfy the series invariants.
    pub(crate) fn from_validated(ticker: String, points: Vec<PricePoint>) -> Self {
        let gaps = find_gaps(&points);
        TimeSeries {
            ticker,
            points,
            gaps,
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn gaps(&self) -> &[Gap] {
        &self.gaps
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    pub fn into_points(self) -> Vec<PricePoint> {
        self.points
    }
}

/// Validate a raw series and annotate its gaps.
///
/// Fails with [`AnalyticsError::InvalidSeries`] on an empty series, a
/// non-increasing or duplicated date, or a malformed price.
pub fn normalize(raw: RawSeries) -> Result<TimeSeries> {
    let RawSeries { ticker, points } = raw;

    if ticker.trim().is_empty() {
        return Err(AnalyticsError::InvalidSeries {
            ticker,
            date: None,
            reason: "empty ticker symbol".to_string(),
        });
    }
    if points.is_empty() {
        return Err(AnalyticsError::InvalidSeries {
            ticker,
            date: None,
            reason: "series has no points".to_string(),
        });
    }

    for (i, point) in points.iter().enumerate() {
        if let Some(reason) = point.defect() {
            return Err(AnalyticsError::InvalidSeries {
                ticker,
                date: Some(point.date),
                reason,
            });
        }
        if i > 0 && point.date <= points[i - 1].date {
            let reason = if point.date == points[i - 1].date {
                format!("duplicate date {}", point.date)
            } else {
                format!("date {} follows {}", point.date, points[i - 1].date)
            };
            return Err(AnalyticsError::InvalidSeries {
                ticker,
                date: Some(point.date),
                reason,
            });
        }
    }

    let series = TimeSeries::from_validated(ticker, points);
    if !series.gaps.is_empty() {
        log::debug!(
            "{}: {} points, {} gap(s)",
            series.ticker,
            series.len(),
            series.gaps.len()
        );
    }
    Ok(series)
}

fn find_gaps(points: &[PricePoint]) -> Vec<Gap> {
    points
        .windows(2)
        .filter_map(|w| {
            let missing = weekdays_between(w[0].date, w[1].date);
            (missing > 0).then_some(Gap {
                after: w[0].date,
                before: w[1].date,
                missing_weekdays: missing,
            })
        })
        .collect()
}

/// Weekdays strictly between `from` and `to`.
fn weekdays_between(from: NaiveDate, to: NaiveDate) -> u32 {
    from.iter_days()
        .skip(1)
        .take_while(|d| *d < to)
        .filter(|d| d.weekday().number_from_monday() <= 5)
        .count() as u32
}
