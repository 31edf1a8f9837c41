//! Builtin entry patterns.
//!
//! Each pattern overwrites `signal_long`/`signal_short` across the whole bar
//! sequence. Bars without enough lookback get `false`.

use super::{rolling_mean, ComponentError, ComponentMeta, EntryPattern};
use crate::domain::{param_f64, param_str, param_usize, Bar, ParamMap, ParamSpec};

fn direction_spec() -> (&'static str, ParamSpec) {
    (
        "direction",
        ParamSpec::Choice {
            options: vec!["long".into(), "short".into(), "both".into()],
            default: "both".into(),
        },
    )
}

/// Masks one side out after signal generation. Anything other than
/// `long`/`short` keeps both sides.
fn apply_direction(bars: &mut [Bar], direction: &str) {
    match direction {
        "long" => {
            for bar in bars.iter_mut() {
                bar.signal_short = false;
            }
        }
        "short" => {
            for bar in bars.iter_mut() {
                bar.signal_long = false;
            }
        }
        _ => {}
    }
}

// ─── Shakeout ────────────────────────────────────────────────────────

/// False-breakout reversal.
///
/// Long: the previous bar is bearish and breaks below the low two bars back,
/// the current bar is bullish and closes back above that low. Short is the
/// mirror against the high two bars back.
pub struct Shakeout {
    meta: ComponentMeta,
}

impl Shakeout {
    pub fn new() -> Self {
        Self {
            meta: ComponentMeta {
                name: "shakeout",
                display_name: "Shake-out",
                description: "False breakout of a prior extreme that immediately reverses, \
                              trapping stop-hunters.",
                params: vec![direction_spec()],
                enabled_by_default: true,
            },
        }
    }
}

impl Default for Shakeout {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryPattern for Shakeout {
    fn meta(&self) -> &ComponentMeta {
        &self.meta
    }

    fn apply(&self, bars: &mut [Bar], params: &ParamMap) -> Result<(), ComponentError> {
        for i in 0..bars.len() {
            let (long, short) = if i >= 2 {
                let cur = &bars[i];
                let prev = &bars[i - 1];
                let anchor = &bars[i - 2];
                let long = prev.close < prev.open
                    && prev.low < anchor.low
                    && cur.close > cur.open
                    && cur.close > anchor.low;
                let short = prev.close > prev.open
                    && prev.high > anchor.high
                    && cur.close < cur.open
                    && cur.close < anchor.high;
                (long, short)
            } else {
                (false, false)
            };
            bars[i].signal_long = long;
            bars[i].signal_short = short;
        }
        apply_direction(bars, param_str(params, "direction", "both"));
        Ok(())
    }
}

// ─── Engulfing ───────────────────────────────────────────────────────

/// Classic engulfing candle: the current body opens inside and closes beyond
/// the previous bar's body, in the opposite direction.
pub struct Engulfing {
    meta: ComponentMeta,
}

impl Engulfing {
    pub fn new() -> Self {
        Self {
            meta: ComponentMeta {
                name: "engulfing",
                display_name: "Engulfing",
                description: "Current candle fully engulfs the previous candle's body, \
                              signalling a momentum reversal.",
                params: vec![direction_spec()],
                enabled_by_default: true,
            },
        }
    }
}

impl Default for Engulfing {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryPattern for Engulfing {
    fn meta(&self) -> &ComponentMeta {
        &self.meta
    }

    fn apply(&self, bars: &mut [Bar], params: &ParamMap) -> Result<(), ComponentError> {
        for i in 0..bars.len() {
            let (long, short) = if i >= 1 {
                let cur = &bars[i];
                let prev = &bars[i - 1];
                let long = cur.close > cur.open
                    && prev.close < prev.open
                    && cur.close >= prev.open
                    && cur.open <= prev.close;
                let short = cur.close < cur.open
                    && prev.close > prev.open
                    && cur.close <= prev.open
                    && cur.open >= prev.close;
                (long, short)
            } else {
                (false, false)
            };
            bars[i].signal_long = long;
            bars[i].signal_short = short;
        }
        apply_direction(bars, param_str(params, "direction", "both"));
        Ok(())
    }
}

// ─── Climactic volume ────────────────────────────────────────────────

/// Volume spike above its moving average by a multiplier; candle color picks
/// the direction.
pub struct ClimacticVolume {
    meta: ComponentMeta,
}

impl ClimacticVolume {
    pub fn new() -> Self {
        Self {
            meta: ComponentMeta {
                name: "climactic_volume",
                display_name: "Climactic Volume",
                description: "Volume exceeds its moving average by a large multiplier, \
                              suggesting exhaustion or capitulation.",
                params: vec![
                    (
                        "sma_period",
                        ParamSpec::Int {
                            min: 5,
                            max: 50,
                            step: 1,
                            default: 20,
                        },
                    ),
                    (
                        "multiplier",
                        ParamSpec::Float {
                            min: 1.0,
                            max: 3.0,
                            step: 0.25,
                            default: 1.75,
                        },
                    ),
                    direction_spec(),
                ],
                enabled_by_default: false,
            },
        }
    }
}

impl Default for ClimacticVolume {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryPattern for ClimacticVolume {
    fn meta(&self) -> &ComponentMeta {
        &self.meta
    }

    fn apply(&self, bars: &mut [Bar], params: &ParamMap) -> Result<(), ComponentError> {
        let sma_period = param_usize(params, "sma_period", 20);
        if sma_period == 0 {
            return Err(ComponentError::InvalidParam {
                name: "sma_period",
                reason: "must be at least 1".into(),
            });
        }
        let multiplier = param_f64(params, "multiplier", 1.75);

        let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
        let vol_ma = rolling_mean(&volumes, sma_period);

        for (i, bar) in bars.iter_mut().enumerate() {
            // NaN moving average (window not yet full) compares false.
            let climactic = bar.volume > vol_ma[i] * multiplier;
            bar.signal_long = climactic && bar.close > bar.open;
            bar.signal_short = climactic && bar.close < bar.open;
        }
        apply_direction(bars, param_str(params, "direction", "both"));
        Ok(())
    }
}
