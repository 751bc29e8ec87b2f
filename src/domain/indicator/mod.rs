//! Technical indicators.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: a single dated indicator value
//! - `IndicatorValue`: enum for the different indicator output shapes
//! - `IndicatorType`: indicator identity + parameters (usable as a HashMap key)
//! - `IndicatorResult`: the points an indicator produced for one series
//!
//! Every indicator is a pure function of a [`TimeSeries`] and its parameters.
//! Warm-up points are omitted rather than zero-filled, and a series shorter
//! than the indicator's minimum length is rejected with
//! [`AnalyticsError::InsufficientData`].

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod obv;
pub mod rolling;
pub mod rsi;
pub mod sma;
pub mod stochastic;
pub mod vpt;

use chrono::NaiveDate;
use std::fmt;

use crate::domain::error::{AnalyticsError, Result};
use crate::domain::time_series::TimeSeries;

pub use bollinger::calculate_bollinger;
pub use ema::calculate_ema;
pub use macd::calculate_macd;
pub use obv::calculate_obv;
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use stochastic::calculate_stochastic;
pub use vpt::calculate_vpt;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: IndicatorValue,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IndicatorValue {
    Simple(f64),
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
    },
    Stochastic {
        k: f64,
        d: f64,
    },
    Bollinger {
        upper: f64,
        middle: f64,
        lower: f64,
    },
}

impl IndicatorValue {
    /// Named columns for tabular export.
    pub fn columns(&self) -> Vec<(&'static str, f64)> {
        match *self {
            IndicatorValue::Simple(v) => vec![("value", v)],
            IndicatorValue::Macd {
                line,
                signal,
                histogram,
            } => vec![("macd", line), ("signal", signal), ("histogram", histogram)],
            IndicatorValue::Stochastic { k, d } => vec![("k", k), ("d", d)],
            IndicatorValue::Bollinger {
                upper,
                middle,
                lower,
            } => vec![("upper", upper), ("middle", middle), ("lower", lower)],
        }
    }

    pub fn as_simple(&self) -> Option<f64> {
        match *self {
            IndicatorValue::Simple(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Obv,
    Vpt,
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Stochastic {
        k_period: usize,
        d_period: usize,
    },
    Bollinger {
        period: usize,
        num_std_x100: u32,
    },
}

impl IndicatorType {
    /// Shortest series that yields at least one output point.
    pub fn min_length(&self) -> usize {
        match *self {
            IndicatorType::Sma(period) | IndicatorType::Ema(period) => period,
            IndicatorType::Rsi(period) => period.saturating_add(1),
            IndicatorType::Obv | IndicatorType::Vpt => 1,
            IndicatorType::Macd { slow, signal, .. } => slow.saturating_add(signal),
            IndicatorType::Stochastic { k_period, d_period } => {
                k_period.saturating_add(d_period).saturating_sub(1)
            }
            IndicatorType::Bollinger { period, .. } => period,
        }
    }

    /// Reject zero windows and inconsistent parameter combinations.
    pub fn validate(&self) -> Result<()> {
        match *self {
            IndicatorType::Sma(period) | IndicatorType::Ema(period) | IndicatorType::Rsi(period) => {
                require_window("period", period)
            }
            IndicatorType::Obv | IndicatorType::Vpt => Ok(()),
            IndicatorType::Macd { fast, slow, signal } => {
                require_window("fast", fast)?;
                require_window("slow", slow)?;
                require_window("signal", signal)?;
                if fast >= slow {
                    return Err(AnalyticsError::invalid_parameter(
                        "fast",
                        format!("fast period {fast} must be shorter than slow period {slow}"),
                    ));
                }
                Ok(())
            }
            IndicatorType::Stochastic { k_period, d_period } => {
                require_window("k_period", k_period)?;
                require_window("d_period", d_period)
            }
            IndicatorType::Bollinger { period, .. } => {
                if period < 2 {
                    return Err(AnalyticsError::invalid_parameter(
                        "period",
                        "Bollinger period must be at least 2",
                    ));
                }
                Ok(())
            }
        }
    }
}

fn require_window(name: &str, window: usize) -> Result<()> {
    if window == 0 {
        return Err(AnalyticsError::invalid_parameter(name, "window must be positive"));
    }
    Ok(())
}

/// Validate parameters and length before an indicator runs.
pub(crate) fn check_input(series: &TimeSeries, indicator: &IndicatorType) -> Result<()> {
    indicator.validate()?;
    let required = indicator.min_length();
    if series.len() < required {
        return Err(AnalyticsError::insufficient(
            format!("{} on {}", indicator, series.ticker()),
            required,
            series.len(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndicatorResult {
    pub indicator: IndicatorType,
    pub points: Vec<IndicatorPoint>,
}

impl IndicatorResult {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    /// Values of a single-line indicator; empty for multi-line indicators.
    pub fn simple_values(&self) -> Vec<f64> {
        self.points
            .iter()
            .filter_map(|p| p.value.as_simple())
            .collect()
    }

    /// Long-format rows: `(date, column, value)`.
    pub fn to_rows(&self) -> Vec<(NaiveDate, &'static str, f64)> {
        self.points
            .iter()
            .flat_map(|p| {
                p.value
                    .columns()
                    .into_iter()
                    .map(move |(column, value)| (p.date, column, value))
            })
            .collect()
    }
}

/// Compute any indicator in the closed set.
pub fn compute(series: &TimeSeries, indicator: &IndicatorType) -> Result<IndicatorResult> {
    match *indicator {
        IndicatorType::Sma(period) => calculate_sma(series, period),
        IndicatorType::Ema(period) => calculate_ema(series, period),
        IndicatorType::Rsi(period) => calculate_rsi(series, period),
        IndicatorType::Obv => calculate_obv(series),
        IndicatorType::Vpt => calculate_vpt(series),
        IndicatorType::Macd { fast, slow, signal } => calculate_macd(series, fast, slow, signal),
        IndicatorType::Stochastic { k_period, d_period } => {
            calculate_stochastic(series, k_period, d_period)
        }
        IndicatorType::Bollinger {
            period,
            num_std_x100,
        } => calculate_bollinger(series, period, num_std_x100 as f64 / 100.0),
    }
}

/// Pair each value with the date of the input point it ends on.
pub(crate) fn dated_points<I>(series: &TimeSeries, offset: usize, values: I) -> Vec<IndicatorPoint>
where
    I: IntoIterator<Item = IndicatorValue>,
{
    series.points()[offset..]
        .iter()
        .zip(values)
        .map(|(p, value)| IndicatorPoint {
            date: p.date,
            value,
        })
        .collect()
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Obv => write!(f, "OBV"),
            IndicatorType::Vpt => write!(f, "VPT"),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Stochastic { k_period, d_period } => {
                write!(f, "STOCHASTIC({},{})", k_period, d_period)
            }
            IndicatorType::Bollinger {
                period,
                num_std_x100,
            } => {
                let mult = *num_std_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
        }
    }
}
