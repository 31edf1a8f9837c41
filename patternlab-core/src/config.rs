//! Serializable backtest configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the engine sizes a new position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionSizing {
    /// Always `fixed_qty` units.
    #[default]
    Fixed,
    /// Size so that the stop distance risks `risk_per_trade_pct` of equity.
    ///
    /// The legacy mode names `risk_pct` and `risk_fixed` were never
    /// distinguished; both deserialize to this variant.
    #[serde(alias = "risk_pct", alias = "risk_fixed")]
    RiskBased,
}

/// Configuration for a single simulation run. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    #[serde(default = "default_initial_capital")]
    pub initial_capital: f64,

    /// Charged once per side; a round trip costs twice this.
    #[serde(default = "default_commission")]
    pub commission_per_trade: f64,

    /// Price adjustment applied to entry and stop levels, in pips.
    #[serde(default = "default_slippage")]
    pub slippage_pips: f64,

    /// Percent of equity risked per trade in risk-based sizing.
    #[serde(default = "default_risk_pct")]
    pub risk_per_trade_pct: f64,

    #[serde(default)]
    pub position_sizing: PositionSizing,

    #[serde(default = "default_fixed_qty")]
    pub fixed_qty: f64,
}

fn default_initial_capital() -> f64 {
    100_000.0
}
fn default_commission() -> f64 {
    1.5
}
fn default_slippage() -> f64 {
    1.0
}
fn default_risk_pct() -> f64 {
    1.0
}
fn default_fixed_qty() -> f64 {
    1.0
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_capital: default_initial_capital(),
            commission_per_trade: default_commission(),
            slippage_pips: default_slippage(),
            risk_per_trade_pct: default_risk_pct(),
            position_sizing: PositionSizing::default(),
            fixed_qty: default_fixed_qty(),
        }
    }
}

impl BacktestConfig {
    /// Parses a config from TOML text. Missing fields take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Loads a config from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

/// Errors loading a backtest configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
