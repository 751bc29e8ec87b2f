//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! First output at index slow - 1 + signal - 1. A series shorter than
//! slow + signal is rejected outright.

use crate::domain::error::Result;
use crate::domain::indicator::ema::ema_values;
use crate::domain::indicator::{
    check_input, dated_points, IndicatorResult, IndicatorType, IndicatorValue,
};
use crate::domain::time_series::TimeSeries;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn calculate_macd(
    series: &TimeSeries,
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Result<IndicatorResult> {
    let indicator = IndicatorType::Macd {
        fast,
        slow,
        signal: signal_period,
    };
    check_input(series, &indicator)?;

    let closes = series.closes();
    let ema_fast = ema_values(&closes, fast);
    let ema_slow = ema_values(&closes, slow);

    // ema_fast[0] sits at index fast-1, ema_slow[0] at slow-1.
    let lag = slow - fast;
    let macd_line: Vec<f64> = ema_slow
        .iter()
        .enumerate()
        .map(|(i, slow_value)| ema_fast[i + lag] - slow_value)
        .collect();

    let signal_line = ema_values(&macd_line, signal_period);
    let values = macd_line[signal_period - 1..]
        .iter()
        .zip(&signal_line)
        .map(|(&line, &signal)| IndicatorValue::Macd {
            line,
            signal,
            histogram: line - signal,
        });

    Ok(IndicatorResult {
        points: dated_points(series, slow - 1 + signal_period - 1, values),
        indicator,
    })
}

pub fn calculate_macd_default(series: &TimeSeries) -> Result<IndicatorResult> {
    calculate_macd(series, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}
