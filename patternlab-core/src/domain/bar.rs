//! Bar — the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV bar annotated with the boolean columns written by signal collaborators.
///
/// The four flag columns start out at their neutral values (`signal_long` and
/// `signal_short` false, `filter_ok` and `session_ok` true) and are overwritten
/// by entry patterns, filters, and session windows before the bar sequence is
/// handed to the simulation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    #[serde(default)]
    pub signal_long: bool,
    #[serde(default)]
    pub signal_short: bool,
    #[serde(default = "default_true")]
    pub filter_ok: bool,
    #[serde(default = "default_true")]
    pub session_ok: bool,
}

fn default_true() -> bool {
    true
}

impl Bar {
    /// Builds a bar with all flag columns at their neutral defaults.
    pub fn new(timestamp: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            signal_long: false,
            signal_short: false,
            filter_ok: true,
            session_ok: true,
        }
    }

    /// Returns true if any price or volume field is NaN.
    pub fn has_nan_field(&self) -> bool {
        self.open.is_nan()
            || self.high.is_nan()
            || self.low.is_nan()
            || self.close.is_nan()
            || self.volume.is_nan()
    }
}

/// Input validation failure for a bar sequence.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("bar sequence is empty")]
    Empty,

    #[error("bar {index} has a NaN price or volume field")]
    NanField { index: usize },

    #[error("bar {index} timestamp does not increase over bar {}", index - 1)]
    NonIncreasingTimestamp { index: usize },
}

/// Checks that a bar sequence is non-empty, NaN-free, and strictly
/// timestamp-ordered (duplicates rejected).
pub fn validate_bars(bars: &[Bar]) -> Result<(), InputError> {
    if bars.is_empty() {
        return Err(InputError::Empty);
    }
    for (index, bar) in bars.iter().enumerate() {
        if bar.has_nan_field() {
            return Err(InputError::NanField { index });
        }
        if index > 0 && bar.timestamp <= bars[index - 1].timestamp {
            return Err(InputError::NonIncreasingTimestamp { index });
        }
    }
    Ok(())
}
