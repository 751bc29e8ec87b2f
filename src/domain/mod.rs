//! Core domain types and logic.

pub mod alignment;
pub mod batch;
pub mod comparison;
pub mod config;
pub mod config_validation;
pub mod error;
pub mod indicator;
mod linalg;
pub mod metrics;
pub mod ohlcv;
pub mod optimizer;
pub mod portfolio;
pub mod returns;
pub mod risk;
pub mod time_series;
