//! Cross-series risk statistics over an aligned set.
//!
//! Expected returns and volatilities are annualized with a configurable
//! factor (252 trading days by default). The covariance matrix is never
//! stored; it is rebuilt from volatilities and correlations on demand.

use crate::domain::alignment::AlignedSeriesSet;
use crate::domain::error::{AnalyticsError, Result};
use crate::domain::indicator::rolling::{mean, sample_std};
use crate::domain::metrics::TRADING_DAYS_PER_YEAR;
use crate::domain::returns::{compute_returns, ReturnKind};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RiskConfig {
    pub annualization_factor: f64,
    pub return_kind: ReturnKind,
    /// Annual rate.
    pub risk_free_rate: f64,
    pub var_confidence: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            annualization_factor: TRADING_DAYS_PER_YEAR,
            return_kind: ReturnKind::Simple,
            risk_free_rate: 0.02,
            var_confidence: 0.95,
        }
    }
}

/// Sample standard deviation of periodic returns scaled by `sqrt(factor)`.
pub fn compute_volatility(returns: &[f64], annualization_factor: f64) -> Result<f64> {
    if !(annualization_factor.is_finite() && annualization_factor > 0.0) {
        return Err(AnalyticsError::invalid_parameter(
            "annualization_factor",
            format!("must be positive, got {annualization_factor}"),
        ));
    }
    if returns.len() < 2 {
        return Err(AnalyticsError::insufficient("volatility", 2, returns.len()));
    }
    Ok(sample_std(returns) * annualization_factor.sqrt())
}

/// Symmetric Pearson correlation matrix with unit diagonal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CorrelationMatrix {
    tickers: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    /// Row-major values in ticker order.
    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        Some(self.values[i][j])
    }

    pub fn index_of(&self, ticker: &str) -> Option<usize> {
        self.tickers.iter().position(|t| t == ticker)
    }

    /// Every `(row, column, correlation)` cell, row-major.
    pub fn triples(&self) -> Vec<(&str, &str, f64)> {
        self.tickers
            .iter()
            .enumerate()
            .flat_map(|(i, a)| {
                self.tickers
                    .iter()
                    .enumerate()
                    .map(move |(j, b)| (a.as_str(), b.as_str(), self.values[i][j]))
            })
            .collect()
    }

    fn from_returns(tickers: Vec<String>, returns: &[Vec<f64>]) -> Self {
        let n = tickers.len();
        let mut values = vec![vec![0.0; n]; n];
        for i in 0..n {
            values[i][i] = 1.0;
            for j in (i + 1)..n {
                let rho = pearson(&returns[i], &returns[j]);
                values[i][j] = rho;
                values[j][i] = rho;
            }
        }
        Self { tickers, values }
    }
}

/// Pearson correlation; zero when either side has no variance.
fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let mx = mean(x);
    let my = mean(y);
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mx;
        let dy = b - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    let denom = (sxx * syy).sqrt();
    if denom <= f64::EPSILON * f64::EPSILON {
        return 0.0;
    }
    (sxy / denom).clamp(-1.0, 1.0)
}

fn aligned_returns(set: &AlignedSeriesSet, kind: ReturnKind) -> Result<(Vec<String>, Vec<Vec<f64>>)> {
    let observations = set.len().saturating_sub(1);
    if observations < 2 {
        return Err(AnalyticsError::insufficient(
            "correlation matrix (return observations)",
            2,
            observations,
        ));
    }
    let mut tickers = Vec::with_capacity(set.ticker_count());
    let mut returns = Vec::with_capacity(set.ticker_count());
    for (ticker, series) in set.iter() {
        tickers.push(ticker.to_string());
        returns.push(compute_returns(series, kind)?);
    }
    Ok((tickers, returns))
}

/// Pairwise correlation of the members' return series, tickers in
/// lexicographic order.
pub fn compute_correlation_matrix(
    set: &AlignedSeriesSet,
    kind: ReturnKind,
) -> Result<CorrelationMatrix> {
    let (tickers, returns) = aligned_returns(set, kind)?;
    Ok(CorrelationMatrix::from_returns(tickers, &returns))
}

/// Per-ticker annualized statistics plus the correlation matrix, all indexed
/// by the same lexicographic ticker order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RiskMetrics {
    pub expected_returns: Vec<f64>,
    pub volatilities: Vec<f64>,
    pub correlation: CorrelationMatrix,
}

impl RiskMetrics {
    pub fn compute(set: &AlignedSeriesSet, config: &RiskConfig) -> Result<Self> {
        let (tickers, returns) = aligned_returns(set, config.return_kind)?;
        let factor = config.annualization_factor;

        let expected_returns = returns.iter().map(|r| mean(r) * factor).collect();
        let volatilities = returns
            .iter()
            .map(|r| compute_volatility(r, factor))
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "risk metrics: {} tickers over {} return observations",
            tickers.len(),
            set.len() - 1
        );

        Ok(Self {
            expected_returns,
            volatilities,
            correlation: CorrelationMatrix::from_returns(tickers, &returns),
        })
    }

    /// Build from precomputed statistics. Entries are reordered so tickers are
    /// lexicographic; the correlation matrix must be square, symmetric, with
    /// unit diagonal and entries in [-1, 1].
    pub fn from_parts(
        tickers: Vec<String>,
        expected_returns: Vec<f64>,
        volatilities: Vec<f64>,
        correlation: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let n = tickers.len();
        if expected_returns.len() != n
            || volatilities.len() != n
            || correlation.len() != n
            || correlation.iter().any(|row| row.len() != n)
        {
            return Err(AnalyticsError::invalid_parameter(
                "risk metrics",
                format!("expected {n} entries per ticker"),
            ));
        }
        for i in 0..n {
            if volatilities[i] < 0.0 || !volatilities[i].is_finite() {
                return Err(AnalyticsError::invalid_parameter(
                    "volatilities",
                    format!("{} has volatility {}", tickers[i], volatilities[i]),
                ));
            }
            if (correlation[i][i] - 1.0).abs() > 1e-9 {
                return Err(AnalyticsError::invalid_parameter(
                    "correlation",
                    "diagonal must be 1",
                ));
            }
            for j in 0..n {
                let rho = correlation[i][j];
                if !(-1.0..=1.0).contains(&rho) || (rho - correlation[j][i]).abs() > 1e-9 {
                    return Err(AnalyticsError::invalid_parameter(
                        "correlation",
                        format!("entry ({i}, {j}) is not a symmetric value in [-1, 1]"),
                    ));
                }
            }
        }

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| tickers[a].cmp(&tickers[b]));
        if order.windows(2).any(|w| tickers[w[0]] == tickers[w[1]]) {
            return Err(AnalyticsError::invalid_parameter("tickers", "duplicate ticker"));
        }

        Ok(Self {
            expected_returns: order.iter().map(|&i| expected_returns[i]).collect(),
            volatilities: order.iter().map(|&i| volatilities[i]).collect(),
            correlation: CorrelationMatrix {
                tickers: order.iter().map(|&i| tickers[i].clone()).collect(),
                values: order
                    .iter()
                    .map(|&i| order.iter().map(|&j| correlation[i][j]).collect())
                    .collect(),
            },
        })
    }

    pub fn tickers(&self) -> &[String] {
        self.correlation.tickers()
    }

    pub fn expected_return(&self, ticker: &str) -> Option<f64> {
        self.correlation
            .index_of(ticker)
            .map(|i| self.expected_returns[i])
    }

    pub fn volatility(&self, ticker: &str) -> Option<f64> {
        self.correlation.index_of(ticker).map(|i| self.volatilities[i])
    }

    /// Σ[i][j] = ρ[i][j] · σ[i] · σ[j]
    pub fn covariance(&self) -> Vec<Vec<f64>> {
        let rho = self.correlation.values();
        let sigma = &self.volatilities;
        (0..sigma.len())
            .map(|i| {
                (0..sigma.len())
                    .map(|j| rho[i][j] * sigma[i] * sigma[j])
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::alignment::{align, AlignPolicy};
    use crate::domain::ohlcv::PricePoint;
    use crate::domain::time_series::{normalize, RawSeries, TimeSeries};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn series(ticker: &str, closes: &[f64]) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PricePoint::flat(start + chrono::Duration::days(i as i64), c, 100))
            .collect();
        normalize(RawSeries::new(ticker, points)).unwrap()
    }

    fn set(members: Vec<TimeSeries>) -> AlignedSeriesSet {
        align(members, AlignPolicy::Intersection).unwrap()
    }

    #[test]
    fn volatility_of_known_returns() {
        let vol = compute_volatility(&[0.01, 0.03], 252.0).unwrap();
        assert_relative_eq!(vol, 0.0002_f64.sqrt() * 252.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn volatility_needs_two_returns() {
        let err = compute_volatility(&[0.01], 252.0).unwrap_err();
        assert!(matches!(err, AnalyticsError::InsufficientData { .. }));
    }

    #[test]
    fn perfectly_correlated_and_anticorrelated() {
        let s = set(vec![
            series("A", &[100.0, 110.0, 99.0, 120.0]),
            series("B", &[50.0, 55.0, 49.5, 60.0]),
            series("C", &[100.0, 90.0, 99.0, 80.0]),
        ]);
        let corr = compute_correlation_matrix(&s, ReturnKind::Log).unwrap();

        assert_relative_eq!(corr.get("A", "B").unwrap(), 1.0, epsilon = 1e-9);
        assert!(corr.get("A", "C").unwrap() < -0.9);
        assert_eq!(corr.get("C", "C"), Some(1.0));
    }

    #[test]
    fn correlation_is_symmetric_with_unit_diagonal() {
        let s = set(vec![
            series("X", &[10.0, 11.0, 10.5, 12.0, 11.0]),
            series("Y", &[20.0, 19.0, 21.0, 22.0, 20.5]),
        ]);
        let corr = compute_correlation_matrix(&s, ReturnKind::Simple).unwrap();
        let v = corr.values();
        assert_eq!(v[0][0], 1.0);
        assert_eq!(v[1][1], 1.0);
        assert_eq!(v[0][1], v[1][0]);
    }

    #[test]
    fn constant_series_has_zero_correlation() {
        let s = set(vec![
            series("FLAT", &[10.0, 10.0, 10.0, 10.0]),
            series("MOVE", &[10.0, 11.0, 10.0, 12.0]),
        ]);
        let corr = compute_correlation_matrix(&s, ReturnKind::Simple).unwrap();
        assert_eq!(corr.get("FLAT", "MOVE"), Some(0.0));
        assert_eq!(corr.get("FLAT", "FLAT"), Some(1.0));
    }

    #[test]
    fn correlation_needs_two_return_observations() {
        let s = set(vec![series("A", &[1.0, 2.0]), series("B", &[3.0, 4.0])]);
        let err = compute_correlation_matrix(&s, ReturnKind::Simple).unwrap_err();
        assert!(matches!(
            err,
            AnalyticsError::InsufficientData {
                required: 2,
                available: 1,
                ..
            }
        ));
    }

    #[test]
    fn triples_cover_every_cell() {
        let s = set(vec![
            series("B", &[1.0, 2.0, 1.5]),
            series("A", &[1.0, 1.1, 1.2]),
        ]);
        let corr = compute_correlation_matrix(&s, ReturnKind::Simple).unwrap();
        let triples = corr.triples();
        assert_eq!(triples.len(), 4);
        assert_eq!((triples[0].0, triples[0].1, triples[0].2), ("A", "A", 1.0));
        assert_eq!((triples[1].0, triples[1].1), ("A", "B"));
    }

    #[test]
    fn risk_metrics_annualize_mean_and_volatility() {
        let s = set(vec![series("A", &[100.0, 101.0, 103.02])]);
        let config = RiskConfig::default();
        let metrics = RiskMetrics::compute(&s, &config).unwrap();

        assert_relative_eq!(metrics.expected_return("A").unwrap(), 0.015 * 252.0, epsilon = 1e-9);
        assert_relative_eq!(
            metrics.volatility("A").unwrap(),
            compute_volatility(&[0.01, 0.02], 252.0).unwrap(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn covariance_from_correlation_and_volatility() {
        let metrics = RiskMetrics::from_parts(
            vec!["A".into(), "B".into()],
            vec![0.1, 0.2],
            vec![0.2, 0.3],
            vec![vec![1.0, 0.5], vec![0.5, 1.0]],
        )
        .unwrap();
        let cov = metrics.covariance();
        assert_relative_eq!(cov[0][0], 0.04, epsilon = 1e-12);
        assert_relative_eq!(cov[0][1], 0.03, epsilon = 1e-12);
        assert_relative_eq!(cov[1][0], cov[0][1]);
        assert_relative_eq!(cov[1][1], 0.09, epsilon = 1e-12);
    }

    #[test]
    fn from_parts_sorts_tickers() {
        let metrics = RiskMetrics::from_parts(
            vec!["ZED".into(), "ABC".into()],
            vec![0.3, 0.1],
            vec![0.4, 0.2],
            vec![vec![1.0, -0.2], vec![-0.2, 1.0]],
        )
        .unwrap();
        assert_eq!(metrics.tickers(), &["ABC".to_string(), "ZED".to_string()]);
        assert_eq!(metrics.expected_returns, vec![0.1, 0.3]);
        assert_eq!(metrics.volatility("ZED"), Some(0.4));
    }

    #[test]
    fn from_parts_rejects_asymmetric_correlation() {
        let err = RiskMetrics::from_parts(
            vec!["A".into(), "B".into()],
            vec![0.1, 0.1],
            vec![0.1, 0.1],
            vec![vec![1.0, 0.5], vec![0.4, 1.0]],
        )
        .unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidParameter { .. }));
    }
}
