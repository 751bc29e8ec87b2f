//! Configuration validation.
//!
//! Checks every recognised key before [`AnalyticsConfig`] is built. Absent
//! keys are fine (defaults apply); present keys must be in range.
//!
//! [`AnalyticsConfig`]: crate::domain::config::AnalyticsConfig

use crate::domain::alignment::AlignPolicy;
use crate::domain::error::{AnalyticsError, Result};
use crate::domain::indicator::bollinger;
use crate::domain::returns::ReturnKind;
use crate::ports::config_port::ConfigPort;

pub fn validate_config(config: &dyn ConfigPort) -> Result<()> {
    validate_indicator_config(config)?;
    validate_risk_config(config)?;
    validate_alignment_config(config)?;
    validate_optimizer_config(config)?;
    Ok(())
}

const WINDOW_KEYS: [&str; 9] = [
    "sma_period",
    "ema_period",
    "rsi_period",
    "macd_fast",
    "macd_slow",
    "macd_signal",
    "stochastic_k",
    "stochastic_d",
    "bollinger_period",
];

pub fn validate_indicator_config(config: &dyn ConfigPort) -> Result<()> {
    for key in WINDOW_KEYS {
        if config.get_string("indicators", key).is_some() {
            let value = config.get_int("indicators", key, 0);
            if value < 1 {
                return Err(invalid("indicators", key, "window must be a positive integer"));
            }
        }
    }

    let fast = config.get_int("indicators", "macd_fast", 12);
    let slow = config.get_int("indicators", "macd_slow", 26);
    if fast >= slow {
        return Err(invalid(
            "indicators",
            "macd_fast",
            "macd_fast must be less than macd_slow",
        ));
    }

    if config.get_int("indicators", "bollinger_period", 20) < 2 {
        return Err(invalid(
            "indicators",
            "bollinger_period",
            "bollinger_period must be at least 2",
        ));
    }

    let num_std = config.get_double("indicators", "bollinger_num_std", 2.0);
    if !num_std.is_finite() || !(0.0..=bollinger::MAX_NUM_STD).contains(&num_std) {
        return Err(invalid(
            "indicators",
            "bollinger_num_std",
            &format!("bollinger_num_std must be in [0, {}]", bollinger::MAX_NUM_STD),
        ));
    }
    Ok(())
}

pub fn validate_risk_config(config: &dyn ConfigPort) -> Result<()> {
    let factor = config.get_double("risk", "annualization_factor", 252.0);
    if !factor.is_finite() || factor <= 0.0 {
        return Err(invalid(
            "risk",
            "annualization_factor",
            "annualization_factor must be positive",
        ));
    }

    let rate = config.get_double("risk", "risk_free_rate", 0.02);
    if !(0.0..1.0).contains(&rate) {
        return Err(invalid(
            "risk",
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
        ));
    }

    let confidence = config.get_double("risk", "var_confidence", 0.95);
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(invalid(
            "risk",
            "var_confidence",
            "var_confidence must be strictly between 0 and 1",
        ));
    }

    if let Some(kind) = config.get_string("risk", "return_kind") {
        kind.parse::<ReturnKind>()
            .map_err(|reason| invalid("risk", "return_kind", &reason))?;
    }
    Ok(())
}

pub fn validate_alignment_config(config: &dyn ConfigPort) -> Result<()> {
    if let Some(policy) = config.get_string("alignment", "policy") {
        policy
            .parse::<AlignPolicy>()
            .map_err(|reason| invalid("alignment", "policy", &reason))?;
    }
    Ok(())
}

pub fn validate_optimizer_config(config: &dyn ConfigPort) -> Result<()> {
    if config.get_int("optimizer", "max_iterations", 10_000) < 1 {
        return Err(invalid(
            "optimizer",
            "max_iterations",
            "max_iterations must be at least 1",
        ));
    }

    let tolerance = config.get_double("optimizer", "tolerance", 1e-12);
    if !tolerance.is_finite() || tolerance <= 0.0 {
        return Err(invalid("optimizer", "tolerance", "tolerance must be positive"));
    }

    let psd = config.get_double("optimizer", "psd_tolerance", 1e-10);
    if !psd.is_finite() || psd < 0.0 {
        return Err(invalid(
            "optimizer",
            "psd_tolerance",
            "psd_tolerance must be non-negative",
        ));
    }
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> AnalyticsError {
    AnalyticsError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
