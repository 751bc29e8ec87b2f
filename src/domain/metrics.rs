//! Tail-risk and risk-adjusted performance statistics over a return series.

use crate::domain::error::{AnalyticsError, Result};
use crate::domain::indicator::rolling::{mean, sample_std};
use crate::domain::returns::equity_curve;
use crate::domain::risk::RiskConfig;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Deviations below this are rounding noise, not dispersion.
const MIN_DISPERSION: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metrics {
    pub mean_return: f64,
    pub volatility: f64,
    pub value_at_risk: f64,
    pub conditional_value_at_risk: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
}

impl Metrics {
    /// Summarize periodic simple returns. Drawdown is measured on the
    /// compounded value path of the returns.
    pub fn compute(returns: &[f64], config: &RiskConfig) -> Result<Self> {
        require_returns("performance metrics", returns, 2)?;
        let factor = config.annualization_factor;

        Ok(Metrics {
            mean_return: mean(returns) * factor,
            volatility: sample_std(returns) * factor.sqrt(),
            value_at_risk: value_at_risk(returns, config.var_confidence)?,
            conditional_value_at_risk: conditional_value_at_risk(returns, config.var_confidence)?,
            max_drawdown: max_drawdown(&equity_curve(returns))?,
            sharpe_ratio: sharpe_ratio(returns, config.risk_free_rate, factor)?,
            sortino_ratio: sortino_ratio(returns, config.risk_free_rate, factor)?,
        })
    }
}

/// Historical VaR: the `(1 - confidence)` percentile of returns, linearly
/// interpolated between order statistics. Reported as a return (usually
/// negative), not a loss magnitude.
pub fn value_at_risk(returns: &[f64], confidence: f64) -> Result<f64> {
    check_confidence(confidence)?;
    require_returns("value at risk", returns, 1)?;

    let mut sorted = returns.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (1.0 - confidence) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    Ok(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Expected shortfall: mean of the returns at or below VaR.
pub fn conditional_value_at_risk(returns: &[f64], confidence: f64) -> Result<f64> {
    let var = value_at_risk(returns, confidence)?;
    let tail: Vec<f64> = returns.iter().copied().filter(|&r| r <= var).collect();
    // The minimum return is always <= an interpolated VaR.
    if tail.is_empty() {
        return Ok(var);
    }
    Ok(mean(&tail))
}

/// Largest peak-to-trough decline of a value series as a negative fraction
/// (`-0.25` is a 25% drawdown). Zero for a series that never falls.
pub fn max_drawdown(values: &[f64]) -> Result<f64> {
    let Some(&first) = values.first() else {
        return Err(AnalyticsError::insufficient("max drawdown", 1, 0));
    };

    let mut peak = first;
    let mut max_dd = 0.0_f64;
    for &value in values {
        if value > peak {
            peak = value;
        } else if peak > 0.0 {
            max_dd = max_dd.min(value / peak - 1.0);
        }
    }
    Ok(max_dd)
}

/// Annualized Sharpe ratio of periodic returns against an annual risk-free
/// rate. Zero when returns have no dispersion.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64, annualization_factor: f64) -> Result<f64> {
    require_returns("sharpe ratio", returns, 2)?;
    let excess = mean(returns) - risk_free_rate / annualization_factor;
    let stddev = sample_std(returns);

    if stddev > MIN_DISPERSION {
        Ok(excess / stddev * annualization_factor.sqrt())
    } else {
        Ok(0.0)
    }
}

/// Annualized Sortino ratio. Downside deviation uses only periods below the
/// periodic risk-free rate, averaged over all periods.
pub fn sortino_ratio(returns: &[f64], risk_free_rate: f64, annualization_factor: f64) -> Result<f64> {
    require_returns("sortino ratio", returns, 2)?;
    let periodic_rf = risk_free_rate / annualization_factor;
    let excess = mean(returns) - periodic_rf;

    let downside_sq: f64 = returns
        .iter()
        .filter(|&&r| r < periodic_rf)
        .map(|&r| (r - periodic_rf).powi(2))
        .sum();
    let downside_stddev = (downside_sq / returns.len() as f64).sqrt();

    if downside_stddev > MIN_DISPERSION {
        Ok(excess / downside_stddev * annualization_factor.sqrt())
    } else {
        Ok(0.0)
    }
}

fn require_returns(context: &str, returns: &[f64], required: usize) -> Result<()> {
    if returns.len() < required {
        return Err(AnalyticsError::insufficient(context, required, returns.len()));
    }
    Ok(())
}

fn check_confidence(confidence: f64) -> Result<()> {
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(AnalyticsError::invalid_parameter(
            "confidence",
            format!("confidence must be in (0, 1), got {confidence}"),
        ));
    }
    Ok(())
}
