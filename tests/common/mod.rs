#![allow(dead_code)]

use chrono::NaiveDate;
use quantkit::domain::error::{AnalyticsError, Result};
pub use quantkit::domain::ohlcv::PricePoint;
use quantkit::domain::time_series::{normalize, RawSeries, TimeSeries};
use quantkit::ports::price_source::PriceSource;
use std::collections::HashMap;

pub struct MockPriceSource {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
}

impl MockPriceSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_points(mut self, ticker: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(ticker.to_string(), points);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl PriceSource for MockPriceSource {
    fn fetch_series(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<PricePoint>> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(AnalyticsError::Io(std::io::Error::other(reason.clone())));
        }
        Ok(self
            .data
            .get(ticker)
            .map(|points| {
                points
                    .iter()
                    .filter(|p| p.date >= start && p.date <= end)
                    .copied()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_tickers(&self) -> Result<Vec<String>> {
        let mut tickers: Vec<String> = self.data.keys().cloned().collect();
        tickers.sort();
        Ok(tickers)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_point(date: &str, close: f64) -> PricePoint {
    PricePoint {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: close - 0.5,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1000,
    }
}

/// Consecutive calendar days with a linear close path.
pub fn generate_points(start_date: &str, count: usize, start_price: f64) -> Vec<PricePoint> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    (0..count)
        .map(|i| {
            let close = start_price + i as f64;
            PricePoint {
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1000 + i as u64 * 10,
            }
        })
        .collect()
}

/// Oscillating closes around a drift; `phase` decorrelates tickers.
pub fn generate_wave(start_date: &str, count: usize, base: f64, drift: f64, phase: f64) -> Vec<PricePoint> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    (0..count)
        .map(|i| {
            let t = i as f64;
            let close = base * (1.0 + drift * t) + 3.0 * (t * 0.4 + phase).sin();
            PricePoint {
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close + 1.5,
                low: close - 1.5,
                close,
                volume: 5000 + (i as u64 % 7) * 100,
            }
        })
        .collect()
}

pub fn make_series(ticker: &str, points: Vec<PricePoint>) -> TimeSeries {
    normalize(RawSeries::new(ticker, points)).unwrap()
}

pub fn series_from_closes(ticker: &str, start_date: &str, closes: &[f64]) -> TimeSeries {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    let points = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| PricePoint::flat(start + chrono::Duration::days(i as i64), c, 1000))
        .collect();
    make_series(ticker, points)
}
