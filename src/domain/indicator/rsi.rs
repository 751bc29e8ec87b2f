//! RSI (Relative Strength Index) indicator.
//!
//! Uses Wilder's smoothing for average gain/loss calculation:
//! - First average: simple mean of gains/losses over the first n changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss)), clamped to [0, 100].
//! If avg_loss == 0: RSI = 100
//!
//! First output at index n (n price changes are needed for the first average).

use crate::domain::error::Result;
use crate::domain::indicator::{
    check_input, dated_points, IndicatorResult, IndicatorType, IndicatorValue,
};
use crate::domain::time_series::TimeSeries;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_rsi(series: &TimeSeries, period: usize) -> Result<IndicatorResult> {
    let indicator = IndicatorType::Rsi(period);
    check_input(series, &indicator)?;

    let closes = series.closes();
    let (gains, losses): (Vec<f64>, Vec<f64>) = closes
        .windows(2)
        .map(|w| {
            let change = w[1] - w[0];
            (change.max(0.0), (-change).max(0.0))
        })
        .unzip();

    let n = period as f64;
    let mut avg_gain = gains[..period].iter().sum::<f64>() / n;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / n;

    let mut values = Vec::with_capacity(gains.len() - period + 1);
    values.push(rsi_from_averages(avg_gain, avg_loss));
    for i in period..gains.len() {
        avg_gain = (avg_gain * (n - 1.0) + gains[i]) / n;
        avg_loss = (avg_loss * (n - 1.0) + losses[i]) / n;
        values.push(rsi_from_averages(avg_gain, avg_loss));
    }

    Ok(IndicatorResult {
        points: dated_points(series, period, values.into_iter().map(IndicatorValue::Simple)),
        indicator,
    })
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::AnalyticsError;
    use crate::domain::indicator::test_support::make_series;
    use approx::assert_relative_eq;

    #[test]
    fn rsi_single_point_is_insufficient() {
        let series = make_series(&[100.0]);
        let err = calculate_rsi(&series, 14).unwrap_err();
        assert!(matches!(
            err,
            AnalyticsError::InsufficientData {
                required: 15,
                available: 1,
                ..
            }
        ));
    }

    #[test]
    fn rsi_warmup_period() {
        let closes: Vec<f64> = (1..=15).map(|i| 100.0 + (i as f64 % 5.0) * 2.0).collect();
        let series = make_series(&closes);
        let result = calculate_rsi(&series, 14).unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result.first_date(), Some(series.points()[14].date));
    }

    #[test]
    fn rsi_all_gains_no_losses() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        let result = calculate_rsi(&make_series(&closes), 14).unwrap();
        assert_relative_eq!(result.simple_values()[0], 100.0);
    }

    #[test]
    fn rsi_all_losses_no_gains() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        let result = calculate_rsi(&make_series(&closes), 14).unwrap();
        assert_relative_eq!(result.simple_values()[0], 0.0);
    }

    #[test]
    fn rsi_flat_prices_is_100() {
        let result = calculate_rsi(&make_series(&[50.0; 6]), 3).unwrap();
        for v in result.simple_values() {
            assert_relative_eq!(v, 100.0);
        }
    }

    #[test]
    fn rsi_in_range() {
        let closes: Vec<f64> = (1..=40)
            .map(|i| 100.0 + (i as f64 % 7.0 - 3.0) * 2.0)
            .collect();
        let result = calculate_rsi(&make_series(&closes), 14).unwrap();

        assert_eq!(result.len(), 40 - 14);
        for rsi in result.simple_values() {
            assert!((0.0..=100.0).contains(&rsi), "RSI {} out of range", rsi);
        }
    }

    #[test]
    fn rsi_wilder_smoothing() {
        // changes: +2, -1, +3, -2
        let series = make_series(&[10.0, 12.0, 11.0, 14.0, 12.0]);
        let values = calculate_rsi(&series, 3).unwrap().simple_values();

        let g0 = 5.0 / 3.0;
        let l0 = 1.0 / 3.0;
        assert_relative_eq!(values[0], 100.0 - 100.0 / (1.0 + g0 / l0), epsilon = 1e-12);

        let g1 = (g0 * 2.0 + 0.0) / 3.0;
        let l1 = (l0 * 2.0 + 2.0) / 3.0;
        assert_relative_eq!(values[1], 100.0 - 100.0 / (1.0 + g1 / l1), epsilon = 1e-12);
    }

    #[test]
    fn rsi_known_calculation() {
        let closes = [
            44.0, 44.25, 44.50, 43.75, 44.50, 44.25, 44.75, 45.25, 45.50, 45.25, 45.50, 46.0,
            46.25, 46.0, 46.50,
        ];
        let rsi = calculate_rsi(&make_series(&closes), 14).unwrap().simple_values()[0];
        assert!(rsi > 50.0 && rsi < 100.0, "RSI should be in bullish territory");
    }
}
