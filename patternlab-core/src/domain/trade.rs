//! Closed-trade record appended to the ledger.

use serde::{Deserialize, Serialize};

/// Direction of a completed trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeDirection {
    Long,
    Short,
}

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
}

/// Immutable record of one closed trade.
///
/// Invariant: `exit_bar > entry_bar` — a position opened on bar i is first
/// eligible for exit on bar i+1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub entry_bar: usize,
    pub exit_bar: usize,
    pub direction: TradeDirection,
    pub entry_price: f64,
    pub exit_price: f64,
    /// Signed quantity, matching the position that produced this trade.
    pub quantity: f64,
    /// Net of round-trip commission.
    pub pnl: f64,
    pub exit_reason: ExitReason,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }
}
