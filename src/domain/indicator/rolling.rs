//! Trailing-window statistics over plain value slices.
//!
//! Each function returns one value per full window, i.e. `values.len() - window + 1`
//! entries, the first of which ends at index `window - 1`. An empty vector is
//! returned when the slice is shorter than the window.

use crate::domain::error::{AnalyticsError, Result};

pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 {
        return Vec::new();
    }
    values
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .collect()
}

/// Sample (n - 1) standard deviation per window.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    if window < 2 {
        return Vec::new();
    }
    values.windows(window).map(sample_std).collect()
}

pub fn rolling_max(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 {
        return Vec::new();
    }
    values
        .windows(window)
        .map(|w| w.iter().copied().fold(f64::NEG_INFINITY, f64::max))
        .collect()
}

pub fn rolling_min(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 {
        return Vec::new();
    }
    values
        .windows(window)
        .map(|w| w.iter().copied().fold(f64::INFINITY, f64::min))
        .collect()
}

pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation; callers guarantee at least two values.
pub fn sample_std(values: &[f64]) -> f64 {
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollingMetric {
    Mean,
    Std,
}

impl std::str::FromStr for RollingMetric {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mean" => Ok(RollingMetric::Mean),
            "std" => Ok(RollingMetric::Std),
            other => Err(format!("unsupported rolling metric '{other}'")),
        }
    }
}

/// Rolling mean or standard deviation of an arbitrary series (prices or
/// returns), failing rather than returning an empty result.
pub fn rolling_metric(values: &[f64], metric: RollingMetric, window: usize) -> Result<Vec<f64>> {
    let minimum_window = match metric {
        RollingMetric::Mean => 1,
        RollingMetric::Std => 2,
    };
    if window < minimum_window {
        return Err(AnalyticsError::invalid_parameter(
            "window",
            format!("window must be at least {minimum_window}"),
        ));
    }
    if values.len() < window {
        return Err(AnalyticsError::insufficient(
            format!("rolling {metric:?}({window})"),
            window,
            values.len(),
        ));
    }
    Ok(match metric {
        RollingMetric::Mean => rolling_mean(values, window),
        RollingMetric::Std => rolling_std(values, window),
    })
}
