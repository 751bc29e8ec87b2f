//! Typed analytics configuration.
//!
//! Read from any [`ConfigPort`] using the `[indicators]`, `[risk]`,
//! `[alignment]` and `[optimizer]` sections. Every key is optional.

use crate::domain::alignment::AlignPolicy;
use crate::domain::config_validation::validate_config;
use crate::domain::error::Result;
use crate::domain::indicator::{bollinger, ema, macd, rsi, sma, stochastic, IndicatorType};
use crate::domain::optimizer::OptimizerConfig;
use crate::domain::risk::RiskConfig;
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndicatorConfig {
    pub sma_period: usize,
    pub ema_period: usize,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub stochastic_k: usize,
    pub stochastic_d: usize,
    pub bollinger_period: usize,
    pub bollinger_num_std: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            sma_period: sma::DEFAULT_PERIOD,
            ema_period: ema::DEFAULT_PERIOD,
            rsi_period: rsi::DEFAULT_PERIOD,
            macd_fast: macd::DEFAULT_FAST,
            macd_slow: macd::DEFAULT_SLOW,
            macd_signal: macd::DEFAULT_SIGNAL,
            stochastic_k: stochastic::DEFAULT_K_PERIOD,
            stochastic_d: stochastic::DEFAULT_D_PERIOD,
            bollinger_period: bollinger::DEFAULT_PERIOD,
            bollinger_num_std: bollinger::DEFAULT_NUM_STD,
        }
    }
}

impl IndicatorConfig {
    /// The full indicator set with the configured parameters.
    pub fn indicator_set(&self) -> Vec<IndicatorType> {
        vec![
            IndicatorType::Sma(self.sma_period),
            IndicatorType::Ema(self.ema_period),
            IndicatorType::Rsi(self.rsi_period),
            IndicatorType::Macd {
                fast: self.macd_fast,
                slow: self.macd_slow,
                signal: self.macd_signal,
            },
            IndicatorType::Obv,
            IndicatorType::Vpt,
            IndicatorType::Stochastic {
                k_period: self.stochastic_k,
                d_period: self.stochastic_d,
            },
            IndicatorType::Bollinger {
                period: self.bollinger_period,
                num_std_x100: (self.bollinger_num_std * 100.0).round() as u32,
            },
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalyticsConfig {
    pub indicators: IndicatorConfig,
    pub risk: RiskConfig,
    pub alignment: AlignPolicy,
    pub optimizer: OptimizerConfig,
}

impl AnalyticsConfig {
    /// Validate, then read every section, falling back to defaults for
    /// absent keys.
    pub fn from_port(config: &dyn ConfigPort) -> Result<Self> {
        validate_config(config)?;
        let defaults = AnalyticsConfig::default();

        let window = |key: &str, default: usize| -> usize {
            config.get_int("indicators", key, default as i64) as usize
        };
        let d = &defaults.indicators;
        let indicators = IndicatorConfig {
            sma_period: window("sma_period", d.sma_period),
            ema_period: window("ema_period", d.ema_period),
            rsi_period: window("rsi_period", d.rsi_period),
            macd_fast: window("macd_fast", d.macd_fast),
            macd_slow: window("macd_slow", d.macd_slow),
            macd_signal: window("macd_signal", d.macd_signal),
            stochastic_k: window("stochastic_k", d.stochastic_k),
            stochastic_d: window("stochastic_d", d.stochastic_d),
            bollinger_period: window("bollinger_period", d.bollinger_period),
            bollinger_num_std: config.get_double(
                "indicators",
                "bollinger_num_std",
                d.bollinger_num_std,
            ),
        };

        // Parse failures were already rejected by validation.
        let r = &defaults.risk;
        let risk = RiskConfig {
            annualization_factor: config.get_double(
                "risk",
                "annualization_factor",
                r.annualization_factor,
            ),
            return_kind: config
                .get_string("risk", "return_kind")
                .and_then(|s| s.parse().ok())
                .unwrap_or(r.return_kind),
            risk_free_rate: config.get_double("risk", "risk_free_rate", r.risk_free_rate),
            var_confidence: config.get_double("risk", "var_confidence", r.var_confidence),
        };

        let alignment = config
            .get_string("alignment", "policy")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.alignment);

        let o = &defaults.optimizer;
        let optimizer = OptimizerConfig {
            allow_short: config.get_bool("optimizer", "allow_short", o.allow_short),
            max_iterations: config.get_int("optimizer", "max_iterations", o.max_iterations as i64)
                as usize,
            tolerance: config.get_double("optimizer", "tolerance", o.tolerance),
            psd_tolerance: config.get_double("optimizer", "psd_tolerance", o.psd_tolerance),
            risk_free_rate: risk.risk_free_rate,
        };

        log::debug!(
            "config loaded: alignment={:?}, return_kind={:?}, allow_short={}",
            alignment,
            risk.return_kind,
            optimizer.allow_short
        );

        Ok(Self {
            indicators,
            risk,
            alignment,
            optimizer,
        })
    }
}
