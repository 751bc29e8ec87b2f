//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i]). First output at index n-1.

use crate::domain::error::Result;
use crate::domain::indicator::rolling::rolling_mean;
use crate::domain::indicator::{
    check_input, dated_points, IndicatorResult, IndicatorType, IndicatorValue,
};
use crate::domain::time_series::TimeSeries;

pub const DEFAULT_PERIOD: usize = 20;

pub fn calculate_sma(series: &TimeSeries, period: usize) -> Result<IndicatorResult> {
    let indicator = IndicatorType::Sma(period);
    check_input(series, &indicator)?;

    let values = rolling_mean(&series.closes(), period);
    Ok(IndicatorResult {
        points: dated_points(series, period - 1, values.into_iter().map(IndicatorValue::Simple)),
        indicator,
    })
}
