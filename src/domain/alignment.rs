//! Multi-ticker alignment onto a common date axis.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::domain::error::{AnalyticsError, Result};
use crate::domain::ohlcv::PricePoint;
use crate::domain::time_series::TimeSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AlignPolicy {
    /// Keep only dates present in every series.
    #[default]
    Intersection,
    /// Keep every date from the latest series start onward, carrying the
    /// previous close forward where a series has no point.
    UnionForwardFill,
}

impl std::str::FromStr for AlignPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "intersection" => Ok(AlignPolicy::Intersection),
            "union" | "union_ffill" | "union_forward_fill" => Ok(AlignPolicy::UnionForwardFill),
            other => Err(format!("unknown alignment policy '{other}'")),
        }
    }
}

/// Series sharing one date axis, keyed by ticker in lexicographic order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AlignedSeriesSet {
    dates: Vec<NaiveDate>,
    series: BTreeMap<String, TimeSeries>,
    filled: BTreeMap<String, Vec<NaiveDate>>,
}

impl AlignedSeriesSet {
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn ticker_count(&self) -> usize {
        self.series.len()
    }

    pub fn tickers(&self) -> Vec<&str> {
        self.series.keys().map(String::as_str).collect()
    }

    pub fn get(&self, ticker: &str) -> Option<&TimeSeries> {
        self.series.get(ticker)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TimeSeries)> {
        self.series.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Dates at which `ticker` carries a forward-filled point.
    pub fn filled_dates(&self, ticker: &str) -> &[NaiveDate] {
        self.filled.get(ticker).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Align the given series under `policy`.
///
/// Fails with [`AnalyticsError::EmptyIntersection`] when no series are given or
/// the series share no date, and with [`AnalyticsError::InvalidSeries`] when a
/// ticker appears twice.
pub fn align<I>(series: I, policy: AlignPolicy) -> Result<AlignedSeriesSet>
where
    I: IntoIterator<Item = TimeSeries>,
{
    let mut by_ticker: BTreeMap<String, TimeSeries> = BTreeMap::new();
    for s in series {
        let ticker = s.ticker().to_string();
        if by_ticker.contains_key(&ticker) {
            return Err(AnalyticsError::InvalidSeries {
                ticker,
                date: None,
                reason: "ticker supplied more than once".to_string(),
            });
        }
        by_ticker.insert(ticker, s);
    }

    if by_ticker.is_empty() {
        return Err(AnalyticsError::EmptyIntersection { tickers: vec![] });
    }

    match policy {
        AlignPolicy::Intersection => align_intersection(by_ticker),
        AlignPolicy::UnionForwardFill => align_union(by_ticker),
    }
}

fn align_intersection(by_ticker: BTreeMap<String, TimeSeries>) -> Result<AlignedSeriesSet> {
    let mut common: Option<BTreeSet<NaiveDate>> = None;
    for s in by_ticker.values() {
        let dates: BTreeSet<NaiveDate> = s.points().iter().map(|p| p.date).collect();
        common = Some(match common {
            None => dates,
            Some(acc) => acc.intersection(&dates).copied().collect(),
        });
    }
    let common = common.unwrap_or_default();

    if common.is_empty() {
        return Err(AnalyticsError::EmptyIntersection {
            tickers: by_ticker.into_keys().collect(),
        });
    }

    let mut series = BTreeMap::new();
    let mut filled = BTreeMap::new();
    for (ticker, s) in by_ticker {
        let before = s.len();
        let points: Vec<PricePoint> = s
            .into_points()
            .into_iter()
            .filter(|p| common.contains(&p.date))
            .collect();
        if points.len() < before {
            log::debug!(
                "{}: dropped {} date(s) outside the intersection",
                ticker,
                before - points.len()
            );
        }
        filled.insert(ticker.clone(), Vec::new());
        series.insert(ticker.clone(), TimeSeries::from_validated(ticker, points));
    }

    Ok(AlignedSeriesSet {
        dates: common.into_iter().collect(),
        series,
        filled,
    })
}

fn align_union(by_ticker: BTreeMap<String, TimeSeries>) -> Result<AlignedSeriesSet> {
    // No value can be carried into dates before a series starts.
    let start = by_ticker
        .values()
        .filter_map(TimeSeries::first_date)
        .max()
        .ok_or_else(|| AnalyticsError::EmptyIntersection {
            tickers: by_ticker.keys().cloned().collect(),
        })?;

    let timeline: Vec<NaiveDate> = by_ticker
        .values()
        .flat_map(|s| s.points().iter().map(|p| p.date))
        .filter(|d| *d >= start)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut series = BTreeMap::new();
    let mut filled = BTreeMap::new();
    for (ticker, s) in by_ticker {
        let index: HashMap<NaiveDate, usize> = s
            .points()
            .iter()
            .enumerate()
            .map(|(i, p)| (p.date, i))
            .collect();
        let source = s.points();

        let mut points = Vec::with_capacity(timeline.len());
        let mut fills = Vec::new();
        let mut last_close = source
            .iter()
            .take_while(|p| p.date <= start)
            .last()
            .map(|p| p.close);

        for &date in &timeline {
            match index.get(&date) {
                Some(&i) => {
                    points.push(source[i]);
                    last_close = Some(source[i].close);
                }
                None => {
                    let close = last_close.ok_or_else(|| AnalyticsError::InvalidSeries {
                        ticker: ticker.clone(),
                        date: Some(date),
                        reason: "no prior value to carry forward".to_string(),
                    })?;
                    points.push(PricePoint::flat(date, close, 0));
                    fills.push(date);
                }
            }
        }

        if !fills.is_empty() {
            log::debug!("{}: forward-filled {} date(s)", ticker, fills.len());
        }
        filled.insert(ticker.clone(), fills);
        series.insert(ticker.clone(), TimeSeries::from_validated(ticker, points));
    }

    Ok(AlignedSeriesSet {
        dates: timeline,
        series,
        filled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::time_series::{normalize, RawSeries};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn series(ticker: &str, days: &[u32]) -> TimeSeries {
        let points = days
            .iter()
            .map(|&d| PricePoint::flat(day(d), 100.0 + d as f64, 1000))
            .collect();
        normalize(RawSeries::new(ticker, points)).unwrap()
    }

    #[test]
    fn intersection_keeps_common_dates() {
        let a = series("A", &[1, 2, 3, 4, 5]);
        let b = series("B", &[3, 4, 5, 6, 7]);
        let set = align([a, b], AlignPolicy::Intersection).unwrap();

        assert_eq!(set.dates(), &[day(3), day(4), day(5)]);
        assert_eq!(set.len(), 3);
        for (_, s) in set.iter() {
            assert_eq!(s.dates(), vec![day(3), day(4), day(5)]);
        }
    }

    #[test]
    fn intersection_without_overlap_fails() {
        let a = series("A", &[1, 2]);
        let b = series("B", &[3, 4]);
        let err = align([a, b], AlignPolicy::Intersection).unwrap_err();
        match err {
            AnalyticsError::EmptyIntersection { tickers } => {
                assert_eq!(tickers, vec!["A".to_string(), "B".to_string()]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn no_series_is_empty_intersection() {
        let err = align(Vec::<TimeSeries>::new(), AlignPolicy::Intersection).unwrap_err();
        assert!(matches!(err, AnalyticsError::EmptyIntersection { .. }));
    }

    #[test]
    fn duplicate_ticker_rejected() {
        let err = align(
            [series("A", &[1, 2]), series("A", &[1, 2])],
            AlignPolicy::Intersection,
        )
        .unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidSeries { .. }));
    }

    #[test]
    fn tickers_are_sorted() {
        let set = align(
            [series("MSFT", &[1, 2]), series("AAPL", &[1, 2])],
            AlignPolicy::Intersection,
        )
        .unwrap();
        assert_eq!(set.tickers(), vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn union_forward_fills_missing_dates() {
        let a = series("A", &[1, 2, 3, 4, 5]);
        let b = series("B", &[1, 3, 5]);
        let set = align([a, b], AlignPolicy::UnionForwardFill).unwrap();

        assert_eq!(set.len(), 5);
        let b = set.get("B").unwrap();
        assert_eq!(b.len(), 5);
        assert_eq!(b.points()[1].close, 101.0);
        assert_eq!(b.points()[1].volume, 0);
        assert_eq!(b.points()[3].close, 103.0);
        assert_eq!(set.filled_dates("B"), &[day(2), day(4)]);
        assert!(set.filled_dates("A").is_empty());
    }

    #[test]
    fn union_starts_at_latest_first_date() {
        let a = series("A", &[1, 2, 3, 4, 5]);
        let b = series("B", &[3, 4, 5, 6, 7]);
        let set = align([a, b], AlignPolicy::UnionForwardFill).unwrap();

        assert_eq!(set.dates().first(), Some(&day(3)));
        assert_eq!(set.dates().last(), Some(&day(7)));
        assert_eq!(set.filled_dates("A"), &[day(6), day(7)]);
        assert_eq!(set.get("A").unwrap().points()[4].close, 105.0);
    }

    #[test]
    fn policy_parses_from_config_text() {
        assert_eq!(
            "intersection".parse::<AlignPolicy>(),
            Ok(AlignPolicy::Intersection)
        );
        assert_eq!(
            "Union".parse::<AlignPolicy>(),
            Ok(AlignPolicy::UnionForwardFill)
        );
        assert!("outer".parse::<AlignPolicy>().is_err());
    }
}
