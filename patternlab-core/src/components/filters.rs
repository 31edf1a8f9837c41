//! Builtin signal filters.
//!
//! Filters overwrite `filter_ok` on every bar; they never touch the signal
//! columns themselves. ANDing signals with `filter_ok` is the optimizer's job.

use super::{rolling_mean, ComponentError, ComponentMeta, SignalFilter};
use crate::domain::{param_f64, param_str, param_usize, Bar, ParamMap, ParamSpec};

fn mode_spec(options: &[&str]) -> (&'static str, ParamSpec) {
    (
        "mode",
        ParamSpec::Choice {
            options: options.iter().map(|s| s.to_string()).collect(),
            default: "no_filter".into(),
        },
    )
}

// ─── MA cross filter ─────────────────────────────────────────────────

/// Trend filter on the relationship of two moving averages.
///
/// `bullish` passes only while the fast MA is above the slow MA, `bearish`
/// only while below. `no_filter` (and any unrecognized mode) passes
/// everything. Bars where either MA is still warming up fail the directional
/// modes.
pub struct MaCrossFilter {
    meta: ComponentMeta,
}

impl MaCrossFilter {
    pub fn new() -> Self {
        Self {
            meta: ComponentMeta {
                name: "ma_cross",
                display_name: "Moving Average Cross Filter",
                description: "Gates entries by trend direction: fast MA above or below slow MA.",
                params: vec![
                    mode_spec(&["no_filter", "bullish", "bearish"]),
                    (
                        "fast_period",
                        ParamSpec::Int {
                            min: 10,
                            max: 100,
                            step: 5,
                            default: 50,
                        },
                    ),
                    (
                        "slow_period",
                        ParamSpec::Int {
                            min: 100,
                            max: 300,
                            step: 10,
                            default: 200,
                        },
                    ),
                ],
                enabled_by_default: false,
            },
        }
    }
}

impl Default for MaCrossFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalFilter for MaCrossFilter {
    fn meta(&self) -> &ComponentMeta {
        &self.meta
    }

    fn apply(&self, bars: &mut [Bar], params: &ParamMap) -> Result<(), ComponentError> {
        let fast_period = param_usize(params, "fast_period", 50);
        let slow_period = param_usize(params, "slow_period", 200);
        if fast_period == 0 || slow_period == 0 {
            return Err(ComponentError::InvalidParam {
                name: "fast_period",
                reason: "MA periods must be at least 1".into(),
            });
        }
        let mode = param_str(params, "mode", "no_filter");

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let fast = rolling_mean(&closes, fast_period);
        let slow = rolling_mean(&closes, slow_period);

        for (i, bar) in bars.iter_mut().enumerate() {
            // NaN comparisons are false, so warmup bars fail directional modes.
            bar.filter_ok = match mode {
                "bullish" => fast[i] > slow[i],
                "bearish" => fast[i] < slow[i],
                _ => true,
            };
        }
        Ok(())
    }
}

// ─── RSI filter ──────────────────────────────────────────────────────

/// Overbought/oversold filter on a rolling-mean RSI.
///
/// `confirmation` passes only in the extreme zones (RSI below oversold or
/// above overbought); `divergence` passes only between them. Warmup bars
/// fail `confirmation` and pass `divergence`.
pub struct RsiFilter {
    meta: ComponentMeta,
}

impl RsiFilter {
    pub fn new() -> Self {
        Self {
            meta: ComponentMeta {
                name: "rsi",
                display_name: "RSI Filter",
                description: "Gates entries by RSI overbought/oversold zones.",
                params: vec![
                    mode_spec(&["no_filter", "confirmation", "divergence"]),
                    (
                        "period",
                        ParamSpec::Int {
                            min: 5,
                            max: 30,
                            step: 1,
                            default: 14,
                        },
                    ),
                    (
                        "oversold",
                        ParamSpec::Int {
                            min: 10,
                            max: 40,
                            step: 5,
                            default: 30,
                        },
                    ),
                    (
                        "overbought",
                        ParamSpec::Int {
                            min: 60,
                            max: 90,
                            step: 5,
                            default: 70,
                        },
                    ),
                ],
                enabled_by_default: false,
            },
        }
    }
}

impl Default for RsiFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalFilter for RsiFilter {
    fn meta(&self) -> &ComponentMeta {
        &self.meta
    }

    fn apply(&self, bars: &mut [Bar], params: &ParamMap) -> Result<(), ComponentError> {
        let period = param_usize(params, "period", 14);
        if period == 0 {
            return Err(ComponentError::InvalidParam {
                name: "period",
                reason: "must be at least 1".into(),
            });
        }
        let oversold = param_f64(params, "oversold", 30.0);
        let overbought = param_f64(params, "overbought", 70.0);
        let mode = param_str(params, "mode", "no_filter");

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let rsi = rsi_values(&closes, period);

        for (i, bar) in bars.iter_mut().enumerate() {
            bar.filter_ok = match mode {
                "confirmation" => rsi[i] < oversold || rsi[i] > overbought,
                // Warmup (NaN) bars pass the contrarian mode.
                "divergence" => rsi[i].is_nan() || (rsi[i] >= oversold && rsi[i] <= overbought),
                _ => true,
            };
        }
        Ok(())
    }
}

/// RSI from rolling means of gains and losses (simple averaging, not Wilder
/// smoothing). NaN until one full window of deltas exists.
fn rsi_values(closes: &[f64], period: usize) -> Vec<f64> {
    let n = closes.len();
    let mut rsi = vec![f64::NAN; n];
    if n < 2 {
        return rsi;
    }

    let mut gains = Vec::with_capacity(n - 1);
    let mut losses = Vec::with_capacity(n - 1);
    for i in 1..n {
        let delta = closes[i] - closes[i - 1];
        gains.push(delta.max(0.0));
        losses.push((-delta).max(0.0));
    }

    let avg_gain = rolling_mean(&gains, period);
    let avg_loss = rolling_mean(&losses, period);
    for i in 0..n - 1 {
        // All-zero losses drive rs to +inf and RSI to 100; 0/0 stays NaN.
        let rs = avg_gain[i] / avg_loss[i];
        rsi[i + 1] = 100.0 - 100.0 / (1.0 + rs);
    }
    rsi
}
