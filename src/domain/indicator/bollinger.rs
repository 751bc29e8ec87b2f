//! Bollinger Bands.
//!
//! middle = SMA(n), upper/lower = middle ± m * STDDEV(n), where STDDEV is the
//! sample standard deviation of the window. First output at index n-1.

use crate::domain::error::{AnalyticsError, Result};
use crate::domain::indicator::rolling::{rolling_mean, rolling_std};
use crate::domain::indicator::{
    check_input, dated_points, IndicatorResult, IndicatorType, IndicatorValue,
};
use crate::domain::time_series::TimeSeries;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_NUM_STD: f64 = 2.0;
/// Widest band accepted; the width is stored in hundredths.
pub const MAX_NUM_STD: f64 = 100.0;

pub fn calculate_bollinger(
    series: &TimeSeries,
    period: usize,
    num_std: f64,
) -> Result<IndicatorResult> {
    if !num_std.is_finite() || !(0.0..=MAX_NUM_STD).contains(&num_std) {
        return Err(AnalyticsError::invalid_parameter(
            "num_std",
            format!("band width must be in [0, {MAX_NUM_STD}], got {num_std}"),
        ));
    }
    let indicator = IndicatorType::Bollinger {
        period,
        num_std_x100: (num_std * 100.0).round() as u32,
    };
    check_input(series, &indicator)?;

    let closes = series.closes();
    let middle = rolling_mean(&closes, period);
    let spread = rolling_std(&closes, period);
    let values = middle
        .into_iter()
        .zip(spread)
        .map(|(middle, sd)| IndicatorValue::Bollinger {
            upper: middle + num_std * sd,
            middle,
            lower: middle - num_std * sd,
        });

    Ok(IndicatorResult {
        points: dated_points(series, period - 1, values),
        indicator,
    })
}
