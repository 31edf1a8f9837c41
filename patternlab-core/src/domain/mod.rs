//! Domain types: bars, parameters, position state, trades.

pub mod bar;
pub mod params;
pub mod position;
pub mod trade;

pub use bar::{validate_bars, Bar, InputError};
pub use params::{param_f64, param_str, param_usize, ParamMap, ParamSpec, ParamValue};
pub use position::{PositionState, Side};
pub use trade::{ExitReason, Trade, TradeDirection};
