//! Portfolio weights and their expected risk/return.

use std::collections::BTreeMap;

use crate::domain::alignment::AlignedSeriesSet;
use crate::domain::error::{AnalyticsError, Result};
use crate::domain::returns::{compute_returns, ReturnKind};
use crate::domain::risk::RiskMetrics;

/// Allowed deviation of the weight sum from 1.0.
pub const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Ticker → weight, iterated in lexicographic ticker order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Portfolio {
    weights: BTreeMap<String, f64>,
}

impl Portfolio {
    /// Validate and build a portfolio. Weights must be finite, sum to 1.0, and
    /// be non-negative unless `allow_short` is set.
    pub fn new<I, S>(weights: I, allow_short: bool) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut map = BTreeMap::new();
        for (ticker, weight) in weights {
            let ticker = ticker.into();
            if !weight.is_finite() {
                return Err(AnalyticsError::invalid_parameter(
                    "weights",
                    format!("{ticker} has non-finite weight"),
                ));
            }
            if !allow_short && weight < 0.0 {
                return Err(AnalyticsError::invalid_parameter(
                    "weights",
                    format!("{ticker} has negative weight {weight} and shorting is disabled"),
                ));
            }
            if map.insert(ticker.clone(), weight).is_some() {
                return Err(AnalyticsError::invalid_parameter(
                    "weights",
                    format!("duplicate ticker {ticker}"),
                ));
            }
        }
        if map.is_empty() {
            return Err(AnalyticsError::invalid_parameter("weights", "portfolio is empty"));
        }

        let total: f64 = map.values().sum();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(AnalyticsError::invalid_parameter(
                "weights",
                format!("weights sum to {total}, expected 1"),
            ));
        }
        Ok(Self { weights: map })
    }

    pub fn weight(&self, ticker: &str) -> Option<f64> {
        self.weights.get(ticker).copied()
    }

    pub fn weights(&self) -> &BTreeMap<String, f64> {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(t, &w)| (t.as_str(), w))
    }

    /// Weights laid out in the metrics' ticker order; tickers the portfolio
    /// does not hold get zero. Fails if the portfolio holds a ticker the
    /// metrics do not cover.
    pub fn weight_vector(&self, metrics: &RiskMetrics) -> Result<Vec<f64>> {
        if let Some(missing) = self
            .weights
            .keys()
            .find(|t| metrics.expected_return(t).is_none())
        {
            return Err(AnalyticsError::invalid_parameter(
                "weights",
                format!("no risk statistics for {missing}"),
            ));
        }
        Ok(metrics
            .tickers()
            .iter()
            .map(|t| self.weight(t).unwrap_or(0.0))
            .collect())
    }

    /// wᵀμ with μ the annualized expected returns.
    pub fn expected_return(&self, metrics: &RiskMetrics) -> Result<f64> {
        let w = self.weight_vector(metrics)?;
        Ok(w.iter().zip(&metrics.expected_returns).map(|(w, r)| w * r).sum())
    }

    /// √(wᵀΣw) with Σ the annualized covariance.
    pub fn volatility(&self, metrics: &RiskMetrics) -> Result<f64> {
        let w = self.weight_vector(metrics)?;
        Ok(quadratic_form(&metrics.covariance(), &w).max(0.0).sqrt())
    }

    /// Period returns of the portfolio over the set's dates, rebalanced to
    /// these weights every period. Holdings are combined as simple returns;
    /// `ReturnKind::Log` converts the combined value afterwards.
    pub fn returns(&self, set: &AlignedSeriesSet, kind: ReturnKind) -> Result<Vec<f64>> {
        let mut combined = vec![0.0; set.len().saturating_sub(1)];
        for (ticker, weight) in self.iter() {
            let series = set.get(ticker).ok_or_else(|| {
                AnalyticsError::invalid_parameter(
                    "weights",
                    format!("{ticker} is not in the aligned set"),
                )
            })?;
            let returns = compute_returns(series, ReturnKind::Simple)?;
            for (acc, r) in combined.iter_mut().zip(&returns) {
                *acc += weight * r;
            }
        }
        if kind == ReturnKind::Log {
            combined.iter_mut().for_each(|r| *r = r.ln_1p());
        }
        Ok(combined)
    }
}

pub(crate) fn quadratic_form(matrix: &[Vec<f64>], w: &[f64]) -> f64 {
    matrix
        .iter()
        .zip(w)
        .map(|(row, wi)| wi * row.iter().zip(w).map(|(m, wj)| m * wj).sum::<f64>())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn metrics() -> RiskMetrics {
        RiskMetrics::from_parts(
            vec!["A".into(), "B".into()],
            vec![0.10, 0.20],
            vec![0.20, 0.30],
            vec![vec![1.0, 0.5], vec![0.5, 1.0]],
        )
        .unwrap()
    }

    #[test]
    fn portfolio_valid_weights() {
        let p = Portfolio::new([("A", 0.4), ("B", 0.6)], false).unwrap();
        assert_eq!(p.len(), 2);
        assert_eq!(p.weight("B"), Some(0.6));
        assert_eq!(p.weight("C"), None);
    }

    #[test]
    fn portfolio_rejects_bad_sum() {
        let err = Portfolio::new([("A", 0.4), ("B", 0.5)], false).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidParameter { .. }));
    }

    #[test]
    fn portfolio_rejects_negative_unless_short() {
        assert!(Portfolio::new([("A", 1.5), ("B", -0.5)], false).is_err());
        assert!(Portfolio::new([("A", 1.5), ("B", -0.5)], true).is_ok());
    }

    #[test]
    fn portfolio_rejects_empty_and_duplicates() {
        assert!(Portfolio::new(Vec::<(String, f64)>::new(), false).is_err());
        assert!(Portfolio::new([("A", 0.5), ("A", 0.5)], false).is_err());
    }

    #[test]
    fn portfolio_iterates_sorted() {
        let p = Portfolio::new([("ZZ", 0.5), ("AA", 0.5)], false).unwrap();
        let tickers: Vec<_> = p.iter().map(|(t, _)| t).collect();
        assert_eq!(tickers, vec!["AA", "ZZ"]);
    }

    #[test]
    fn expected_return_is_weighted_mean() {
        let p = Portfolio::new([("A", 0.5), ("B", 0.5)], false).unwrap();
        assert_relative_eq!(p.expected_return(&metrics()).unwrap(), 0.15, epsilon = 1e-12);
    }

    #[test]
    fn volatility_uses_covariance() {
        let p = Portfolio::new([("A", 0.5), ("B", 0.5)], false).unwrap();
        // 0.25 * (0.04 + 0.09 + 2 * 0.03)
        let expected = (0.25_f64 * 0.19).sqrt();
        assert_relative_eq!(p.volatility(&metrics()).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn single_holding_has_asset_volatility() {
        let p = Portfolio::new([("B", 1.0)], false).unwrap();
        assert_relative_eq!(p.volatility(&metrics()).unwrap(), 0.30, epsilon = 1e-12);
    }

    fn aligned(closes: &[(&str, &[f64])]) -> AlignedSeriesSet {
        use crate::domain::alignment::{align, AlignPolicy};
        use crate::domain::ohlcv::PricePoint;
        use crate::domain::time_series::{normalize, RawSeries};
        use chrono::NaiveDate;

        let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let series = closes.iter().map(|(ticker, values)| {
            let points = values
                .iter()
                .enumerate()
                .map(|(i, &c)| PricePoint::flat(start + chrono::Duration::days(i as i64), c, 10))
                .collect();
            normalize(RawSeries::new(*ticker, points)).unwrap()
        });
        align(series, AlignPolicy::Intersection).unwrap()
    }

    #[test]
    fn returns_are_weighted_per_period() {
        let set = aligned(&[("A", &[100.0, 110.0, 99.0]), ("B", &[50.0, 50.0, 55.0])]);
        let p = Portfolio::new([("A", 0.25), ("B", 0.75)], false).unwrap();
        let r = p.returns(&set, ReturnKind::Simple).unwrap();
        assert_eq!(r.len(), 2);
        assert_relative_eq!(r[0], 0.25 * 0.10, epsilon = 1e-12);
        assert_relative_eq!(r[1], 0.25 * -0.10 + 0.75 * 0.10, epsilon = 1e-12);
    }

    #[test]
    fn log_returns_convert_the_combined_return() {
        let set = aligned(&[("A", &[100.0, 110.0]), ("B", &[50.0, 40.0])]);
        let p = Portfolio::new([("A", 0.5), ("B", 0.5)], false).unwrap();
        let r = p.returns(&set, ReturnKind::Log).unwrap();
        assert_relative_eq!(r[0], (1.0_f64 + 0.5 * 0.10 - 0.5 * 0.20).ln(), epsilon = 1e-12);
    }

    #[test]
    fn returns_ignore_unheld_members_and_reject_missing_holdings() {
        let set = aligned(&[("A", &[10.0, 11.0]), ("B", &[10.0, 20.0])]);
        let only_a = Portfolio::new([("A", 1.0)], false).unwrap();
        assert_relative_eq!(only_a.returns(&set, ReturnKind::Simple).unwrap()[0], 0.1, epsilon = 1e-12);

        let missing = Portfolio::new([("A", 0.5), ("C", 0.5)], false).unwrap();
        let err = missing.returns(&set, ReturnKind::Simple).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidParameter { .. }));
    }

    #[test]
    fn unknown_ticker_is_rejected() {
        let p = Portfolio::new([("Q", 1.0)], false).unwrap();
        assert!(p.expected_return(&metrics()).is_err());
    }
}
