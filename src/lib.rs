//! quantkit — financial time-series analytics.
//!
//! Normalizes and aligns daily price series, computes technical indicators,
//! derives return/risk statistics across tickers and builds optimized
//! portfolio weights.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;

pub use domain::alignment::{align, AlignPolicy, AlignedSeriesSet};
pub use domain::comparison::{compare_portfolios, compare_with_benchmark, BenchmarkComparison, PortfolioSummary};
pub use domain::error::{AnalyticsError, Result};
pub use domain::indicator::{compute, IndicatorResult, IndicatorType, IndicatorValue};
pub use domain::ohlcv::PricePoint;
pub use domain::portfolio::Portfolio;
pub use domain::risk::{CorrelationMatrix, RiskConfig, RiskMetrics};
pub use domain::time_series::{normalize, RawSeries, TimeSeries};
