//! CSV file price source.
//!
//! One file per ticker, `<base>/<TICKER>.csv`, with a header row
//! `date,open,high,low,close,volume` and ISO dates.

use crate::domain::error::{AnalyticsError, Result};
use crate::domain::ohlcv::PricePoint;
use crate::ports::price_source::PriceSource;
use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::str::FromStr;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub(crate) fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }
}

fn field<T: FromStr>(record: &csv::StringRecord, index: usize, name: &str, ticker: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    let raw = record.get(index).ok_or_else(|| AnalyticsError::InvalidSeries {
        ticker: ticker.to_string(),
        date: None,
        reason: format!("missing {} column", name),
    })?;
    raw.trim().parse().map_err(|e: T::Err| AnalyticsError::InvalidSeries {
        ticker: ticker.to_string(),
        date: None,
        reason: format!("invalid {} value '{}': {}", name, raw, e),
    })
}

impl PriceSource for CsvAdapter {
    fn fetch_series(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<PricePoint>> {
        let path = self.csv_path(ticker);
        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => AnalyticsError::NoData {
                ticker: ticker.to_string(),
            },
            _ => AnalyticsError::Io(e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut points = Vec::new();

        for result in rdr.records() {
            let record = result?;
            let date: NaiveDate = field(&record, 0, "date", ticker)?;
            if date < start || date > end {
                continue;
            }
            points.push(PricePoint {
                date,
                open: field(&record, 1, "open", ticker)?,
                high: field(&record, 2, "high", ticker)?,
                low: field(&record, 3, "low", ticker)?,
                close: field(&record, 4, "close", ticker)?,
                volume: field(&record, 5, "volume", ticker)?,
            });
        }

        points.sort_by_key(|p| p.date);
        log::debug!("{}: read {} rows from {}", ticker, points.len(), path.display());
        Ok(points)
    }

    fn list_tickers(&self) -> Result<Vec<String>> {
        let mut tickers = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let name = entry?.file_name();
            let name = name.to_string_lossy();
            if let Some(ticker) = name.strip_suffix(".csv") {
                tickers.push(ticker.to_string());
            }
        }
        tickers.sort();
        Ok(tickers)
    }
}
