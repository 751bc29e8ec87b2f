//! Period returns and price rebasing.

use crate::domain::error::{AnalyticsError, Result};
use crate::domain::time_series::TimeSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReturnKind {
    /// `p[t] / p[t-1] - 1`
    #[default]
    Simple,
    /// `ln(p[t] / p[t-1])`
    Log,
}

impl std::str::FromStr for ReturnKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simple" | "pct" => Ok(ReturnKind::Simple),
            "log" => Ok(ReturnKind::Log),
            other => Err(format!("unknown return kind '{other}'")),
        }
    }
}

/// Returns on close, one per consecutive pair of points.
pub fn compute_returns(series: &TimeSeries, kind: ReturnKind) -> Result<Vec<f64>> {
    if series.len() < 2 {
        return Err(AnalyticsError::insufficient(
            format!("returns on {}", series.ticker()),
            2,
            series.len(),
        ));
    }
    Ok(returns_from_values(&series.closes(), kind))
}

pub(crate) fn returns_from_values(values: &[f64], kind: ReturnKind) -> Vec<f64> {
    values
        .windows(2)
        .map(|w| match kind {
            ReturnKind::Simple => w[1] / w[0] - 1.0,
            ReturnKind::Log => (w[1] / w[0]).ln(),
        })
        .collect()
}

/// Closes rebased so the first value is 1.0.
pub fn normalize_prices(series: &TimeSeries) -> Vec<f64> {
    let closes = series.closes();
    match closes.first().copied() {
        Some(base) => closes.iter().map(|c| c / base).collect(),
        None => Vec::new(),
    }
}

/// Growth from first to last close, `last / first - 1`.
pub fn cumulative_return(series: &TimeSeries) -> Result<f64> {
    match (series.points().first(), series.points().last()) {
        (Some(first), Some(last)) => Ok(last.close / first.close - 1.0),
        _ => Err(AnalyticsError::insufficient(
            format!("cumulative return on {}", series.ticker()),
            1,
            0,
        )),
    }
}

/// Compound a sequence of simple returns into a value path starting at 1.0.
pub fn equity_curve(returns: &[f64]) -> Vec<f64> {
    let mut value = 1.0;
    std::iter::once(value)
        .chain(returns.iter().map(|r| {
            value *= 1.0 + r;
            value
        }))
        .collect()
}
