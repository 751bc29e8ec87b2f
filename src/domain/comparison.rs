//! Side-by-side performance of weighted portfolios and benchmarks over an
//! aligned price set.

use chrono::NaiveDate;

use crate::domain::alignment::AlignedSeriesSet;
use crate::domain::error::{AnalyticsError, Result};
use crate::domain::metrics::Metrics;
use crate::domain::portfolio::Portfolio;
use crate::domain::returns::{compute_returns, equity_curve, ReturnKind};
use crate::domain::risk::{compute_volatility, RiskConfig};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortfolioSummary {
    pub name: String,
    /// Compounded return over the whole window.
    pub cumulative_return: f64,
    pub metrics: Metrics,
}

/// Summarize a series of periodic simple returns under `name`.
pub fn summarize(name: impl Into<String>, returns: &[f64], config: &RiskConfig) -> Result<PortfolioSummary> {
    let metrics = Metrics::compute(returns, config)?;
    let cumulative_return = equity_curve(returns).last().copied().unwrap_or(1.0) - 1.0;
    Ok(PortfolioSummary {
        name: name.into(),
        cumulative_return,
        metrics,
    })
}

/// One summary per named portfolio, in input order.
pub fn compare_portfolios<S: AsRef<str>>(
    set: &AlignedSeriesSet,
    portfolios: &[(S, Portfolio)],
    config: &RiskConfig,
) -> Result<Vec<PortfolioSummary>> {
    portfolios
        .iter()
        .map(|(name, portfolio)| {
            let returns = portfolio.returns(set, ReturnKind::Simple)?;
            summarize(name.as_ref(), &returns, config)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BenchmarkComparison {
    pub dates: Vec<NaiveDate>,
    /// Growth of one unit invested on the first date; same length as `dates`.
    pub portfolio_curve: Vec<f64>,
    pub benchmark_curve: Vec<f64>,
    pub portfolio: PortfolioSummary,
    pub benchmark: PortfolioSummary,
    /// Portfolio cumulative return minus the benchmark's.
    pub excess_return: f64,
    /// Annualized standard deviation of the per-period return difference.
    pub tracking_error: f64,
}

/// Compare a portfolio against one ticker of the same aligned set.
pub fn compare_with_benchmark(
    set: &AlignedSeriesSet,
    portfolio: &Portfolio,
    benchmark_ticker: &str,
    config: &RiskConfig,
) -> Result<BenchmarkComparison> {
    let benchmark_series = set.get(benchmark_ticker).ok_or_else(|| {
        AnalyticsError::invalid_parameter(
            "benchmark",
            format!("{benchmark_ticker} is not in the aligned set"),
        )
    })?;

    let portfolio_returns = portfolio.returns(set, ReturnKind::Simple)?;
    let benchmark_returns = compute_returns(benchmark_series, ReturnKind::Simple)?;

    let portfolio_summary = summarize("portfolio", &portfolio_returns, config)?;
    let benchmark_summary = summarize(benchmark_ticker, &benchmark_returns, config)?;

    let active: Vec<f64> = portfolio_returns
        .iter()
        .zip(&benchmark_returns)
        .map(|(p, b)| p - b)
        .collect();
    let tracking_error = compute_volatility(&active, config.annualization_factor)?;

    log::debug!(
        "benchmark {}: excess {:.4}, tracking error {:.4}",
        benchmark_ticker,
        portfolio_summary.cumulative_return - benchmark_summary.cumulative_return,
        tracking_error
    );

    Ok(BenchmarkComparison {
        dates: set.dates().to_vec(),
        portfolio_curve: equity_curve(&portfolio_returns),
        benchmark_curve: equity_curve(&benchmark_returns),
        excess_return: portfolio_summary.cumulative_return - benchmark_summary.cumulative_return,
        portfolio: portfolio_summary,
        benchmark: benchmark_summary,
        tracking_error,
    })
}
