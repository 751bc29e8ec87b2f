//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seed with first SMA, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! First output at index n-1.

use crate::domain::error::Result;
use crate::domain::indicator::{
    check_input, dated_points, IndicatorResult, IndicatorType, IndicatorValue,
};
use crate::domain::time_series::TimeSeries;

pub const DEFAULT_PERIOD: usize = 20;

pub fn calculate_ema(series: &TimeSeries, period: usize) -> Result<IndicatorResult> {
    let indicator = IndicatorType::Ema(period);
    check_input(series, &indicator)?;

    let values = ema_values(&series.closes(), period);
    Ok(IndicatorResult {
        points: dated_points(series, period - 1, values.into_iter().map(IndicatorValue::Simple)),
        indicator,
    })
}

/// SMA-seeded EMA of `values`; the first entry corresponds to index `period - 1`.
pub(crate) fn ema_values(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = values[..period].iter().sum::<f64>() / period as f64;
    let mut out = Vec::with_capacity(values.len() - period + 1);
    out.push(ema);
    for &value in &values[period..] {
        ema = value * k + ema * (1.0 - k);
        out.push(ema);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::AnalyticsError;
    use crate::domain::indicator::test_support::make_series;
    use approx::assert_relative_eq;

    #[test]
    fn ema_warmup_points_absent() {
        let series = make_series(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let result = calculate_ema(&series, 3).unwrap();

        assert_eq!(result.len(), 3);
        assert_eq!(result.first_date(), Some(series.points()[2].date));
    }

    #[test]
    fn ema_period_1_tracks_close() {
        let series = make_series(&[10.0, 20.0, 30.0]);
        let result = calculate_ema(&series, 1).unwrap();
        assert_eq!(result.simple_values(), vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn ema_seed_is_sma() {
        let series = make_series(&[10.0, 20.0, 30.0]);
        let result = calculate_ema(&series, 3).unwrap();
        assert_relative_eq!(result.simple_values()[0], 20.0);
    }

    #[test]
    fn ema_recursive_calculation() {
        let series = make_series(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let values = calculate_ema(&series, 3).unwrap().simple_values();

        let k = 2.0 / 4.0;
        let sma = 20.0;
        let ema_3 = 40.0 * k + sma * (1.0 - k);
        let ema_4 = 50.0 * k + ema_3 * (1.0 - k);

        assert_relative_eq!(values[0], sma);
        assert_relative_eq!(values[1], ema_3);
        assert_relative_eq!(values[2], ema_4);
    }

    #[test]
    fn ema_equal_prices() {
        let series = make_series(&[100.0; 8]);
        for v in calculate_ema(&series, 3).unwrap().simple_values() {
            assert_relative_eq!(v, 100.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn ema_too_short() {
        let series = make_series(&[10.0, 20.0]);
        let err = calculate_ema(&series, 5).unwrap_err();
        assert!(matches!(err, AnalyticsError::InsufficientData { required: 5, .. }));
    }

    #[test]
    fn ema_values_on_short_slice_is_empty() {
        assert!(ema_values(&[1.0, 2.0], 3).is_empty());
    }
}
