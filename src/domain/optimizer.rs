//! Portfolio weight optimization over [`RiskMetrics`].
//!
//! Long-only problems are solved by projected gradient methods on the
//! probability simplex; the short-enabled variants use closed forms through a
//! Cholesky solve. All solvers walk tickers in lexicographic order so results
//! are deterministic.

use crate::domain::error::{AnalyticsError, Result};
use crate::domain::linalg::{add_ridge, cholesky, cholesky_solve, mat_vec, spectral_bound};
use crate::domain::portfolio::{quadratic_form, Portfolio};
use crate::domain::risk::RiskMetrics;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptimizerConfig {
    pub allow_short: bool,
    pub max_iterations: usize,
    /// Convergence threshold on the largest per-weight change.
    pub tolerance: f64,
    /// Diagonal slack, relative to the largest variance, granted when
    /// checking that the covariance matrix is positive semi-definite.
    pub psd_tolerance: f64,
    /// Annual rate used by [`maximum_sharpe`].
    pub risk_free_rate: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            allow_short: false,
            max_iterations: 10_000,
            tolerance: 1e-12,
            psd_tolerance: 1e-10,
            risk_free_rate: 0.02,
        }
    }
}

/// 1/n in every ticker.
pub fn equal_weight<S: AsRef<str>>(tickers: &[S]) -> Result<Portfolio> {
    if tickers.is_empty() {
        return Err(AnalyticsError::optimization("no tickers supplied"));
    }
    let w = 1.0 / tickers.len() as f64;
    Portfolio::new(tickers.iter().map(|t| (t.as_ref(), w)), false)
}

/// Minimize wᵀΣw subject to Σw = 1 (and w ≥ 0 unless shorting is allowed).
///
/// Among long-only solutions with equal variance, weight is shifted to the
/// lexicographically smallest of any interchangeable tickers.
pub fn minimum_variance(metrics: &RiskMetrics, config: &OptimizerConfig) -> Result<Portfolio> {
    let cov = checked_covariance(metrics, config)?;
    let n = cov.len();

    let weights = if config.allow_short {
        let ones = vec![1.0; n];
        normalized(solve_covariance(&cov, &ones)?, "minimum variance")?
    } else {
        let step = step_size(&cov);
        let mut w = vec![1.0 / n as f64; n];
        let mut iterations = 0;
        let mut converged = step.is_none();

        if let Some(step) = step {
            while iterations < config.max_iterations {
                iterations += 1;
                let grad = mat_vec(&cov, &w);
                let candidate: Vec<f64> = w
                    .iter()
                    .zip(&grad)
                    .map(|(wi, gi)| wi - step * 2.0 * gi)
                    .collect();
                let next = project_simplex(&candidate);
                let change = max_change(&w, &next);
                w = next;
                if change < config.tolerance {
                    converged = true;
                    break;
                }
            }
        }
        report("minimum variance", converged, iterations);

        prefer_smaller_ticker(&cov, &mut w, tie_tolerance(&cov, config));
        w
    };

    build(metrics, weights, config.allow_short)
}

/// Maximize (wᵀμ − r_f) / √(wᵀΣw).
///
/// Fails when no ticker has an expected return above the risk-free rate, or
/// when the best portfolio has no variance.
pub fn maximum_sharpe(metrics: &RiskMetrics, config: &OptimizerConfig) -> Result<Portfolio> {
    let cov = checked_covariance(metrics, config)?;
    let excess: Vec<f64> = metrics
        .expected_returns
        .iter()
        .map(|r| r - config.risk_free_rate)
        .collect();

    if excess.iter().all(|&e| e <= 0.0) {
        return Err(AnalyticsError::optimization(
            "no ticker has expected return above the risk-free rate",
        ));
    }

    let weights = if config.allow_short {
        let raw = solve_covariance(&cov, &excess)?;
        if raw.iter().sum::<f64>() <= 0.0 {
            return Err(AnalyticsError::optimization(
                "tangency portfolio has non-positive net exposure",
            ));
        }
        normalized(raw, "maximum sharpe")?
    } else {
        sharpe_ascent(&cov, &excess, config)?
    };

    build(metrics, weights, config.allow_short)
}

fn sharpe_ascent(cov: &[Vec<f64>], excess: &[f64], config: &OptimizerConfig) -> Result<Vec<f64>> {
    let n = cov.len();
    let sharpe = |w: &[f64]| -> Option<f64> {
        let var = quadratic_form(cov, w);
        (var > 0.0).then(|| dot(w, excess) / var.sqrt())
    };

    // Start from the best single ticker, which lies inside the region of
    // positive excess return.
    let mut w = vec![0.0; n];
    let best = (0..n)
        .filter(|&i| excess[i] > 0.0)
        .max_by(|&a, &b| {
            let sa = excess[a] / cov[a][a].sqrt();
            let sb = excess[b] / cov[b][b].sqrt();
            sa.total_cmp(&sb).then(b.cmp(&a))
        })
        .ok_or_else(|| AnalyticsError::optimization("no ticker has positive excess return"))?;
    w[best] = 1.0;

    let mut current = sharpe(&w).ok_or_else(|| {
        AnalyticsError::optimization(format!("ticker at index {best} has zero variance"))
    })?;

    let mut iterations = 0;
    let mut converged = false;
    while iterations < config.max_iterations {
        iterations += 1;
        let var = quadratic_form(cov, &w);
        let sd = var.sqrt();
        let ret = dot(&w, excess);
        let sigma_w = mat_vec(cov, &w);
        let grad: Vec<f64> = excess
            .iter()
            .zip(&sigma_w)
            .map(|(e, s)| e / sd - ret * s / (var * sd))
            .collect();

        let mut step = 1.0;
        let mut accepted = None;
        while step > 1e-20 {
            let candidate: Vec<f64> = w.iter().zip(&grad).map(|(wi, gi)| wi + step * gi).collect();
            let next = project_simplex(&candidate);
            if let Some(value) = sharpe(&next) {
                if value > current {
                    accepted = Some((next, value));
                    break;
                }
            }
            step *= 0.5;
        }

        let Some((next, value)) = accepted else {
            converged = true;
            break;
        };
        let change = max_change(&w, &next);
        w = next;
        current = value;
        if change < config.tolerance {
            converged = true;
            break;
        }
    }
    report("maximum sharpe", converged, iterations);
    Ok(w)
}

fn checked_covariance(metrics: &RiskMetrics, config: &OptimizerConfig) -> Result<Vec<Vec<f64>>> {
    if metrics.tickers().is_empty() {
        return Err(AnalyticsError::optimization("no tickers supplied"));
    }
    let cov = metrics.covariance();
    if cov.iter().flatten().any(|v| !v.is_finite()) {
        return Err(AnalyticsError::optimization("covariance matrix has non-finite entries"));
    }
    let scale = cov.iter().enumerate().map(|(i, row)| row[i]).fold(1.0, f64::max);
    if cholesky(&add_ridge(&cov, config.psd_tolerance * scale)).is_none() {
        return Err(AnalyticsError::optimization(
            "covariance matrix is not positive semi-definite",
        ));
    }
    Ok(cov)
}

fn solve_covariance(cov: &[Vec<f64>], rhs: &[f64]) -> Result<Vec<f64>> {
    let l = cholesky(cov).ok_or_else(|| {
        AnalyticsError::optimization("covariance matrix is singular; closed form unavailable")
    })?;
    Ok(cholesky_solve(&l, rhs))
}

fn normalized(raw: Vec<f64>, context: &str) -> Result<Vec<f64>> {
    let total: f64 = raw.iter().sum();
    if total.abs() < f64::EPSILON || !total.is_finite() {
        return Err(AnalyticsError::optimization(format!(
            "{context}: weights cannot be normalized"
        )));
    }
    Ok(raw.into_iter().map(|w| w / total).collect())
}

/// 1 / (2 λmax), or `None` when Σ is zero and every portfolio is riskless.
fn step_size(cov: &[Vec<f64>]) -> Option<f64> {
    let bound = spectral_bound(cov);
    (bound > 0.0).then(|| 1.0 / (2.0 * bound))
}

/// Relative tie threshold, scaled by the largest variance so it tracks the
/// units of Σ.
fn tie_tolerance(cov: &[Vec<f64>], config: &OptimizerConfig) -> f64 {
    let scale = cov.iter().enumerate().map(|(i, row)| row[i]).fold(0.0, f64::max);
    config.tolerance.sqrt() * scale
}

/// Shift weight from ticker j to an earlier ticker i whenever the two are
/// interchangeable: var(x_i − x_j) ≈ 0 and equal marginal risk. A shift that
/// raises portfolio variance is never kept.
fn prefer_smaller_ticker(cov: &[Vec<f64>], w: &mut [f64], tol: f64) {
    let n = w.len();
    for i in 0..n {
        for j in (i + 1)..n {
            if w[j] == 0.0 {
                continue;
            }
            let spread_var = cov[i][i] + cov[j][j] - 2.0 * cov[i][j];
            if spread_var.abs() > tol {
                continue;
            }
            let grad = mat_vec(cov, w);
            if (grad[i] - grad[j]).abs() > tol {
                continue;
            }
            let before = quadratic_form(cov, w);
            let mut shifted = w.to_vec();
            shifted[i] += shifted[j];
            shifted[j] = 0.0;
            if quadratic_form(cov, &shifted) <= before * (1.0 + 1e-12) {
                w.copy_from_slice(&shifted);
            }
        }
    }
}

/// Euclidean projection onto { w : w ≥ 0, Σw = 1 }.
fn project_simplex(v: &[f64]) -> Vec<f64> {
    let mut sorted = v.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));

    let mut cumulative = 0.0;
    let mut theta = 0.0;
    for (k, &u) in sorted.iter().enumerate() {
        cumulative += u;
        let candidate = (cumulative - 1.0) / (k + 1) as f64;
        if u - candidate > 0.0 {
            theta = candidate;
        }
    }
    v.iter().map(|x| (x - theta).max(0.0)).collect()
}

fn build(metrics: &RiskMetrics, mut weights: Vec<f64>, allow_short: bool) -> Result<Portfolio> {
    if !allow_short {
        for w in weights.iter_mut() {
            *w = w.max(0.0);
        }
    }
    let weights = normalized(weights, "portfolio")?;
    Portfolio::new(
        metrics.tickers().iter().map(String::as_str).zip(weights),
        allow_short,
    )
}

fn report(solver: &str, converged: bool, iterations: usize) {
    if converged {
        log::debug!("{solver}: converged after {iterations} iterations");
    } else {
        log::warn!("{solver}: stopped at iteration limit {iterations} before converging");
    }
}

fn max_change(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).fold(0.0, f64::max)
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
