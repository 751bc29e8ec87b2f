//! Stochastic Oscillator.
//!
//! %K = 100 * (C - LL(k)) / (HH(k) - LL(k)), or 50 when HH(k) == LL(k)
//! %D = SMA(%K, d)
//!
//! Points are emitted once both lines exist, from index k - 1 + d - 1.

use crate::domain::error::Result;
use crate::domain::indicator::rolling::{rolling_max, rolling_mean, rolling_min};
use crate::domain::indicator::{
    check_input, dated_points, IndicatorResult, IndicatorType, IndicatorValue,
};
use crate::domain::time_series::TimeSeries;

pub const DEFAULT_K_PERIOD: usize = 14;
pub const DEFAULT_D_PERIOD: usize = 3;

const FLAT_RANGE_K: f64 = 50.0;

pub fn calculate_stochastic(
    series: &TimeSeries,
    k_period: usize,
    d_period: usize,
) -> Result<IndicatorResult> {
    let indicator = IndicatorType::Stochastic { k_period, d_period };
    check_input(series, &indicator)?;

    let points = series.points();
    let highs: Vec<f64> = points.iter().map(|p| p.high).collect();
    let lows: Vec<f64> = points.iter().map(|p| p.low).collect();

    let highest = rolling_max(&highs, k_period);
    let lowest = rolling_min(&lows, k_period);

    let k_line: Vec<f64> = points[k_period - 1..]
        .iter()
        .zip(highest.iter().zip(&lowest))
        .map(|(p, (&hh, &ll))| {
            if hh == ll {
                FLAT_RANGE_K
            } else {
                100.0 * (p.close - ll) / (hh - ll)
            }
        })
        .collect();

    let d_line = rolling_mean(&k_line, d_period);
    let values = k_line[d_period - 1..]
        .iter()
        .zip(&d_line)
        .map(|(&k, &d)| IndicatorValue::Stochastic { k, d });

    Ok(IndicatorResult {
        points: dated_points(series, k_period - 1 + d_period - 1, values),
        indicator,
    })
}
