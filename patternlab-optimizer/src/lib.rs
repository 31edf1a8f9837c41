//! PatternLab Optimizer — exhaustive grid search over entry-pattern
//! parameters.
//!
//! Ranges expand to a Cartesian grid, every cell runs an independent backtest
//! (rayon fan-out by default), survivors are scored by a composite of ROI,
//! profit factor, and drawdown, and come back ranked. Output is deterministic:
//! grid order is preserved through the pool and ties keep it.
//!
//! The core simulation lives in `patternlab-core`; this crate only
//! orchestrates it.

pub mod grid;
mod job;
pub mod optimizer;
pub mod summary;

pub use grid::{ParamGrid, ParamRanges};
pub use job::FilterConfig;
pub use optimizer::{rank_score, OptimizationResult, OptimizeError, Optimizer};
pub use summary::{format_summary, print_summary};
