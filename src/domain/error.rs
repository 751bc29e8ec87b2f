//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for quantkit.
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    #[error("invalid series {ticker}: {reason}")]
    InvalidSeries {
        ticker: String,
        date: Option<NaiveDate>,
        reason: String,
    },

    #[error("no common dates across {}", tickers.join(", "))]
    EmptyIntersection { tickers: Vec<String> },

    #[error("insufficient data for {context}: have {available} points, need {required}")]
    InsufficientData {
        context: String,
        required: usize,
        available: usize,
    },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("optimization failed: {reason}")]
    Optimization { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no data for {ticker}")]
    NoData { ticker: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;

impl AnalyticsError {
    pub(crate) fn insufficient(context: impl Into<String>, required: usize, available: usize) -> Self {
        AnalyticsError::InsufficientData {
            context: context.into(),
            required,
            available,
        }
    }

    pub(crate) fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        AnalyticsError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn optimization(reason: impl Into<String>) -> Self {
        AnalyticsError::Optimization {
            reason: reason.into(),
        }
    }
}
