//! Open-position state held by the simulation engine during a run.

use serde::{Deserialize, Serialize};

/// Direction of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Long,
    Short,
}

/// Mutable state for the single position the engine may hold at a time.
///
/// Created when an entry signal fires, destroyed when the stop or target is
/// touched. Flat is represented as `Option<PositionState>::None`, so exactly
/// one position exists at any simulated time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionState {
    pub side: Side,
    /// Index of the bar whose signal opened this position.
    pub entry_bar: usize,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    /// Signed quantity: positive for long, negative for short.
    pub quantity: f64,
}

impl PositionState {
    /// Quantity sign must match the side.
    pub fn is_consistent(&self) -> bool {
        match self.side {
            Side::Long => self.quantity > 0.0,
            Side::Short => self.quantity < 0.0,
        }
    }
}
