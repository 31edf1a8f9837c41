//! Trade simulation engine — a deterministic per-bar state machine.
//!
//! Walks a validated bar sequence in timestamp order, maintains at most one
//! open position, and emits a trade ledger, a per-bar equity curve, and
//! summary metrics. The engine is a leaf: it knows nothing about components
//! or the optimizer, and it never mutates its input.

pub mod metrics;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{BacktestConfig, PositionSizing};
use crate::domain::{
    validate_bars, Bar, ExitReason, InputError, ParamMap, PositionState, Side, Trade,
    TradeDirection,
};
use metrics::SummaryMetrics;

/// One point of the per-bar equity curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub equity: f64,
}

/// Complete output of one simulation run. Read-only once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Same length as the input bar sequence; equity only moves on bars
    /// where a trade closes.
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<Trade>,
    pub metrics: SummaryMetrics,
    /// Echo of the parameter set the signals were generated with.
    pub parameters: ParamMap,
}

/// Deterministic simulation engine over annotated bars.
#[derive(Debug, Clone)]
pub struct SimulationEngine {
    config: BacktestConfig,
}

impl SimulationEngine {
    pub fn new(config: BacktestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Runs the state machine over `bars` and returns the full result.
    ///
    /// Fails with `InputError` on an empty sequence, NaN fields, or
    /// non-increasing timestamps. Bar 0 never trades; it seeds the curve
    /// with the initial capital.
    pub fn run(&self, bars: &[Bar], parameters: &ParamMap) -> Result<BacktestResult, InputError> {
        validate_bars(bars)?;

        let mut equity: Vec<f64> = Vec::with_capacity(bars.len());
        equity.push(self.config.initial_capital);
        let mut trades: Vec<Trade> = Vec::new();
        let mut position: Option<PositionState> = None;

        for (i, bar) in bars.iter().enumerate().skip(1) {
            let mut eq = equity[i - 1];

            // Exit check first: the position carried into this bar is tested
            // against this bar's range. Stop-loss is checked before the target
            // and wins when both are touched on the same bar.
            if let Some(pos) = position.take() {
                match check_exit(&pos, bar) {
                    Some(reason) => {
                        let exit_price = bar.close;
                        let pnl = (exit_price - pos.entry_price) * pos.quantity
                            - 2.0 * self.config.commission_per_trade;
                        eq += pnl;
                        trades.push(Trade {
                            entry_bar: pos.entry_bar,
                            exit_bar: i,
                            direction: match pos.side {
                                Side::Long => TradeDirection::Long,
                                Side::Short => TradeDirection::Short,
                            },
                            entry_price: pos.entry_price,
                            exit_price,
                            quantity: pos.quantity,
                            pnl,
                            exit_reason: reason,
                        });
                    }
                    None => position = Some(pos),
                }
            }

            // Entry check: only when flat, which includes the bar a position
            // just closed on. Long takes precedence when both flags are set.
            // Entries never move equity; cash is not marked to market intrabar.
            if position.is_none() {
                if bar.signal_long {
                    position = Some(self.enter_long(i, bar, eq));
                } else if bar.signal_short {
                    position = Some(self.enter_short(i, bar, eq));
                }
            }

            equity.push(eq);
        }

        let metrics = SummaryMetrics::compute(&equity, &trades);
        let equity_curve = bars
            .iter()
            .zip(&equity)
            .map(|(bar, &eq)| EquityPoint {
                timestamp: bar.timestamp,
                equity: eq,
            })
            .collect();

        Ok(BacktestResult {
            equity_curve,
            trades,
            metrics,
            parameters: parameters.clone(),
        })
    }

    // Entry levels come from the signal bar's own high/low — information a
    // live system would not have at decision time. Known modeling choice,
    // preserved rather than corrected; see DESIGN.md.
    fn enter_long(&self, bar_index: usize, bar: &Bar, equity: f64) -> PositionState {
        let entry_price = bar.high + self.config.slippage_pips;
        let stop_loss = bar.low - self.config.slippage_pips;
        let risk = entry_price - stop_loss;
        PositionState {
            side: Side::Long,
            entry_bar: bar_index,
            entry_price,
            stop_loss,
            take_profit: entry_price + 1.5 * risk,
            quantity: self.position_size(entry_price, stop_loss, equity),
        }
    }

    fn enter_short(&self, bar_index: usize, bar: &Bar, equity: f64) -> PositionState {
        let entry_price = bar.low - self.config.slippage_pips;
        let stop_loss = bar.high + self.config.slippage_pips;
        let risk = stop_loss - entry_price;
        PositionState {
            side: Side::Short,
            entry_bar: bar_index,
            entry_price,
            stop_loss,
            take_profit: entry_price - 1.5 * risk,
            quantity: -self.position_size(entry_price, stop_loss, equity),
        }
    }

    /// Unsigned position size for a new entry.
    ///
    /// Risk-based sizing floors at 0.01 units so a tiny stop distance cannot
    /// produce a zero-size order.
    fn position_size(&self, entry: f64, stop: f64, equity: f64) -> f64 {
        match self.config.position_sizing {
            PositionSizing::Fixed => self.config.fixed_qty,
            PositionSizing::RiskBased => {
                let risk_distance = (entry - stop).abs();
                let risk_money = equity * (self.config.risk_per_trade_pct / 100.0);
                (risk_money / risk_distance).max(0.01)
            }
        }
    }
}

/// Tests the carried position against one bar's range.
///
/// Long: stop on `low <= stop_loss`, target on `high >= take_profit` (target
/// only when positive). Short is the mirror. Stop is checked first.
fn check_exit(pos: &PositionState, bar: &Bar) -> Option<ExitReason> {
    match pos.side {
        Side::Long => {
            if bar.low <= pos.stop_loss {
                return Some(ExitReason::StopLoss);
            }
            if pos.take_profit > 0.0 && bar.high >= pos.take_profit {
                return Some(ExitReason::TakeProfit);
            }
        }
        Side::Short => {
            if bar.high >= pos.stop_loss {
                return Some(ExitReason::StopLoss);
            }
            if pos.take_profit > 0.0 && bar.low <= pos.take_profit {
                return Some(ExitReason::TakeProfit);
            }
        }
    }
    None
}
