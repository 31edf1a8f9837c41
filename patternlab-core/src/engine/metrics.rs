//! Performance metrics — pure functions over the trade ledger and equity curve.
//!
//! Every metric is a pure function: ledger and/or curve in, scalar out. No
//! dependencies on the engine loop or components.

use serde::{Deserialize, Serialize};

use crate::domain::Trade;

/// Fixed set of summary statistics for one simulation run.
///
/// The field set never varies with trade count: an empty ledger produces the
/// zero-filled default for every field, including `final_equity`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Winners / total, in percent.
    pub win_rate: f64,
    pub total_pnl: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    /// |gross profit / gross loss|; 0 when there are no losing trades.
    pub profit_factor: f64,
    /// Worst peak-to-trough equity move, in percent. Always <= 0.
    pub max_drawdown: f64,
    /// Annualized over 252 periods; 0 when return variance is 0.
    pub sharpe_ratio: f64,
    pub final_equity: f64,
    /// (final - initial) / initial, in percent.
    pub roi: f64,
}

impl SummaryMetrics {
    /// Computes all metrics from a completed run.
    ///
    /// `equity` must be the full per-bar curve. An empty ledger short-circuits
    /// to the zero-filled default.
    pub fn compute(equity: &[f64], trades: &[Trade]) -> Self {
        if trades.is_empty() {
            return Self::default();
        }

        let winners: Vec<f64> = trades.iter().filter(|t| t.pnl > 0.0).map(|t| t.pnl).collect();
        let losers: Vec<f64> = trades.iter().filter(|t| t.pnl < 0.0).map(|t| t.pnl).collect();
        let total_pnl: f64 = trades.iter().map(|t| t.pnl).sum();

        Self {
            total_trades: trades.len(),
            winning_trades: winners.len(),
            losing_trades: losers.len(),
            win_rate: winners.len() as f64 / trades.len() as f64 * 100.0,
            total_pnl,
            avg_win: mean(&winners),
            avg_loss: mean(&losers),
            profit_factor: profit_factor(&winners, &losers),
            max_drawdown: max_drawdown_pct(equity),
            sharpe_ratio: sharpe_ratio(equity),
            final_equity: equity.last().copied().unwrap_or(0.0),
            roi: roi_pct(equity),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// |sum of winning pnl / sum of losing pnl|.
///
/// Defined as 0 when there are no losing trades or their sum is zero.
pub fn profit_factor(winners: &[f64], losers: &[f64]) -> f64 {
    let gross_loss: f64 = losers.iter().sum();
    if losers.is_empty() || gross_loss == 0.0 {
        return 0.0;
    }
    let gross_profit: f64 = winners.iter().sum();
    (gross_profit / gross_loss).abs()
}

/// Worst drawdown against the running equity maximum, in percent (<= 0).
pub fn max_drawdown_pct(equity: &[f64]) -> f64 {
    let mut peak = match equity.first() {
        Some(&first) => first,
        None => return 0.0,
    };
    let mut max_dd = 0.0_f64;
    for &eq in equity {
        if eq > peak {
            peak = eq;
        }
        if peak > 0.0 {
            let dd = (eq - peak) / peak * 100.0;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Annualized Sharpe from bar-over-bar percentage equity changes.
///
/// sharpe = mean(returns) / std(returns) * sqrt(252); 0 when std is 0.
pub fn sharpe_ratio(equity: &[f64]) -> f64 {
    let returns = bar_returns(equity);
    let std = std_dev(&returns);
    if std < 1e-15 {
        return 0.0;
    }
    mean(&returns) / std * (252.0_f64).sqrt()
}

/// (final - initial) / initial, in percent.
pub fn roi_pct(equity: &[f64]) -> f64 {
    if equity.len() < 2 || equity[0] == 0.0 {
        return 0.0;
    }
    (equity[equity.len() - 1] - equity[0]) / equity[0] * 100.0
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Bar-over-bar percentage changes of the equity curve.
pub fn bar_returns(equity: &[f64]) -> Vec<f64> {
    if equity.len() < 2 {
        return Vec::new();
    }
    equity
        .windows(2)
        .map(|w| if w[0] != 0.0 { (w[1] - w[0]) / w[0] } else { 0.0 })
        .collect()
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
