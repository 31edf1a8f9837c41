//! Grid-search sweep: fan jobs out across worker threads, rank survivors.
//!
//! Results come back in grid order no matter how the pool schedules the work,
//! and the final ranking is a stable sort, so two sweeps over identical inputs
//! produce identical output.

use std::cmp::Ordering;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use patternlab_core::components::{ComponentRegistry, RegistryError};
use patternlab_core::config::BacktestConfig;
use patternlab_core::domain::{validate_bars, Bar, InputError, ParamMap, ParamValue};
use patternlab_core::engine::metrics::SummaryMetrics;
use patternlab_core::engine::SimulationEngine;

use crate::grid::{ParamGrid, ParamRanges};
use crate::job::{resolve_filters, run_job, FilterConfig, ResolvedFilters};

// ─── Results ─────────────────────────────────────────────────────────

/// One ranked grid cell: the parameter set, its backtest metrics, and the
/// composite score it was ordered by.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationResult {
    pub params: ParamMap,
    pub metrics: SummaryMetrics,
    pub rank_score: f64,
}

/// Composite ranking score in favor of steady equity: ROI and profit factor
/// each weigh 0.3, drawdown avoidance 0.4. ROI saturates at 200%, profit
/// factor at 3.
pub fn rank_score(metrics: &SummaryMetrics) -> f64 {
    let roi = (metrics.roi / 100.0).clamp(-1.0, 2.0);
    let pf = (metrics.profit_factor / 3.0).min(1.0);
    let dd = (1.0 - metrics.max_drawdown.abs() / 100.0).max(0.0);
    roi * 0.3 + pf * 0.3 + dd * 0.4
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Up-front validation failure. Unknown component names and malformed bar
/// input abort the whole sweep; per-job failures are merely dropped.
#[derive(Debug, thiserror::Error)]
pub enum OptimizeError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

// ─── Optimizer ───────────────────────────────────────────────────────

/// Exhaustive grid search over a pattern's parameter ranges.
pub struct Optimizer<'a> {
    registry: &'a ComponentRegistry,
    engine: SimulationEngine,
    parallel: bool,
}

impl<'a> Optimizer<'a> {
    pub fn new(registry: &'a ComponentRegistry, config: BacktestConfig) -> Self {
        Self {
            registry,
            engine: SimulationEngine::new(config),
            parallel: true,
        }
    }

    /// Serial mode runs the identical pipeline on the calling thread.
    /// Useful for profiling and for pinning down a misbehaving cell.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sweeps `ranges` for one entry pattern and returns the ranked survivors.
    ///
    /// Unknown pattern/filter names and malformed bars fail the whole call.
    /// Individual cells that error at runtime, or that produce zero trades,
    /// are dropped from the output.
    pub fn optimize(
        &self,
        bars: &[Bar],
        pattern_name: &str,
        ranges: &ParamRanges,
        filters: &[FilterConfig],
    ) -> Result<Vec<OptimizationResult>, OptimizeError> {
        let mut results = self.sweep(bars, pattern_name, ranges, filters)?;
        rank(&mut results);
        if results.is_empty() {
            warn!(pattern = pattern_name, "sweep produced no tradeable parameter sets");
        }
        Ok(results)
    }

    /// Sweeps several patterns and ranks them against each other.
    ///
    /// Each result's params gain a `"pattern"` entry naming the pattern that
    /// produced it.
    pub fn optimize_multi_pattern(
        &self,
        bars: &[Bar],
        patterns: &[(&str, ParamRanges)],
    ) -> Result<Vec<OptimizationResult>, OptimizeError> {
        let mut combined = Vec::new();
        for (pattern_name, ranges) in patterns {
            let mut results = self.sweep(bars, pattern_name, ranges, &[])?;
            for result in &mut results {
                result
                    .params
                    .insert("pattern".to_string(), ParamValue::Text(pattern_name.to_string()));
            }
            combined.extend(results);
        }
        rank(&mut combined);
        if combined.is_empty() {
            warn!("multi-pattern sweep produced no tradeable parameter sets");
        }
        Ok(combined)
    }

    /// Unranked sweep body shared by both entry points. Returns survivors in
    /// grid order with `rank_score` still zero.
    fn sweep(
        &self,
        bars: &[Bar],
        pattern_name: &str,
        ranges: &ParamRanges,
        filters: &[FilterConfig],
    ) -> Result<Vec<OptimizationResult>, OptimizeError> {
        validate_bars(bars)?;
        let pattern = self.registry.pattern(pattern_name)?;
        let resolved = resolve_filters(self.registry, filters)?;

        let param_sets = ParamGrid::expand(ranges).param_sets();
        debug!(
            pattern = pattern_name,
            jobs = param_sets.len(),
            bars = bars.len(),
            parallel = self.parallel,
            "starting sweep"
        );

        let cell = |(grid_index, params): (usize, &ParamMap)| {
            self.run_cell(bars, pattern.as_ref(), &resolved, params, grid_index)
        };

        // Order-preserving collect keeps output deterministic under rayon.
        let outcomes: Vec<Option<OptimizationResult>> = if self.parallel {
            param_sets.par_iter().enumerate().map(cell).collect()
        } else {
            param_sets.iter().enumerate().map(cell).collect()
        };

        Ok(outcomes.into_iter().flatten().collect())
    }

    fn run_cell(
        &self,
        bars: &[Bar],
        pattern: &dyn patternlab_core::components::EntryPattern,
        filters: &ResolvedFilters,
        params: &ParamMap,
        grid_index: usize,
    ) -> Option<OptimizationResult> {
        match run_job(&self.engine, bars, pattern, filters, params) {
            Ok(result) if result.metrics.total_trades == 0 => None,
            Ok(result) => Some(OptimizationResult {
                params: params.clone(),
                metrics: result.metrics,
                rank_score: 0.0,
            }),
            Err(err) => {
                warn!(grid_index, error = %err, "dropping failed sweep job");
                None
            }
        }
    }
}

/// Scores every result and sorts descending. The sort is stable, so equal
/// scores keep their grid (or concatenation) order.
fn rank(results: &mut [OptimizationResult]) {
    for result in results.iter_mut() {
        result.rank_score = rank_score(&result.metrics);
    }
    results.sort_by(|a, b| {
        b.rank_score
            .partial_cmp(&a.rank_score)
            .unwrap_or(Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    use patternlab_core::components::{ComponentError, ComponentMeta, EntryPattern};
    use patternlab_core::domain::ParamSpec;

    // ── Test pattern: signals long on the bar index named by `trigger` ──

    struct IndexTrigger {
        meta: ComponentMeta,
    }

    impl IndexTrigger {
        fn new() -> Self {
            Self {
                meta: ComponentMeta {
                    name: "index_trigger",
                    display_name: "Index Trigger",
                    description: "Flags a single bar by index; test-only.",
                    params: vec![(
                        "trigger",
                        ParamSpec::Int { min: 0, max: 100, step: 1, default: 1 },
                    )],
                    enabled_by_default: false,
                },
            }
        }
    }

    impl EntryPattern for IndexTrigger {
        fn meta(&self) -> &ComponentMeta {
            &self.meta
        }

        fn apply(&self, bars: &mut [Bar], params: &ParamMap) -> Result<(), ComponentError> {
            // Fallback is bar 1, the first bar the engine can enter on.
            let trigger = patternlab_core::domain::param_usize(params, "trigger", 1);
            for (i, bar) in bars.iter_mut().enumerate() {
                bar.signal_long = i == trigger;
                bar.signal_short = false;
            }
            Ok(())
        }
    }

    fn registry_with_trigger() -> ComponentRegistry {
        let mut registry = ComponentRegistry::builtin();
        registry.register_pattern(Arc::new(IndexTrigger::new()));
        registry
    }

    fn bar(minute: u32, open: f64, high: f64, low: f64, close: f64) -> Bar {
        let ts = Utc.with_ymd_and_hms(2024, 7, 8, 10, minute, 0).unwrap();
        Bar::new(ts, open, high, low, close, 10_000.0)
    }

    /// trigger=1 wins at the target, trigger=2 gets stopped out, trigger=3
    /// never closes (no trade).
    fn scripted_bars() -> Vec<Bar> {
        vec![
            bar(0, 100.0, 101.0, 99.0, 100.0),
            // trigger=1: entry 103, stop 98, target 110.5.
            bar(1, 100.0, 102.0, 99.0, 101.0),
            // High 111 clears the target; exit at close 110, pnl +4
            // after the 1.5-per-side round-trip commission.
            // trigger=2: entry 112, stop 98, target 133.
            bar(2, 100.0, 111.0, 99.0, 110.0),
            // Low 90 breaks trigger=2's stop; exit at close 95, pnl -20.
            // trigger=3: entry 102, stop 89, target 121.5.
            bar(3, 100.0, 101.0, 90.0, 95.0),
            // Touches nothing for trigger=3; its position never closes.
            bar(4, 95.0, 96.0, 94.0, 95.0),
        ]
    }

    fn trigger_ranges(min: i64, max: i64) -> ParamRanges {
        ParamRanges::new().with(
            "trigger",
            ParamSpec::Int { min, max, step: 1, default: min },
        )
    }

    #[test]
    fn winning_cell_outranks_losing_cell() {
        let registry = registry_with_trigger();
        let optimizer = Optimizer::new(&registry, BacktestConfig::default());
        let results = optimizer
            .optimize(&scripted_bars(), "index_trigger", &trigger_ranges(1, 3), &[])
            .unwrap();

        // trigger=3 never closes a trade and is dropped.
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].params["trigger"].as_i64(), Some(1));
        assert_eq!(results[1].params["trigger"].as_i64(), Some(2));
        assert!(results[0].rank_score > results[1].rank_score);
        // pnl = (exit - entry) × qty - 2 × 1.5 commission:
        // trigger=1: (110 - 103) - 3 = 4; trigger=2: (95 - 112) - 3 = -20.
        assert!((results[0].metrics.total_pnl - 4.0).abs() < 1e-10);
        assert!((results[1].metrics.total_pnl - (-20.0)).abs() < 1e-10);
    }

    #[test]
    fn scores_are_sorted_non_increasing() {
        let registry = registry_with_trigger();
        let optimizer = Optimizer::new(&registry, BacktestConfig::default());
        let results = optimizer
            .optimize(&scripted_bars(), "index_trigger", &trigger_ranges(0, 4), &[])
            .unwrap();
        for pair in results.windows(2) {
            assert!(pair[0].rank_score >= pair[1].rank_score);
        }
    }

    #[test]
    fn equal_scores_keep_grid_order() {
        let mut results = vec![
            OptimizationResult {
                params: ParamMap::from([("trigger".to_string(), ParamValue::Int(1))]),
                metrics: SummaryMetrics::default(),
                rank_score: 0.0,
            },
            OptimizationResult {
                params: ParamMap::from([("trigger".to_string(), ParamValue::Int(2))]),
                metrics: SummaryMetrics::default(),
                rank_score: 0.0,
            },
        ];
        rank(&mut results);
        assert_eq!(results[0].params["trigger"].as_i64(), Some(1));
        assert_eq!(results[1].params["trigger"].as_i64(), Some(2));
    }

    #[test]
    fn parallel_and_serial_sweeps_agree() {
        let registry = registry_with_trigger();
        let parallel = Optimizer::new(&registry, BacktestConfig::default());
        let serial = Optimizer::new(&registry, BacktestConfig::default()).with_parallelism(false);
        let bars = scripted_bars();
        let ranges = trigger_ranges(0, 4);
        let a = parallel.optimize(&bars, "index_trigger", &ranges, &[]).unwrap();
        let b = serial.optimize(&bars, "index_trigger", &ranges, &[]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unknown_pattern_fails_the_whole_sweep() {
        let registry = ComponentRegistry::builtin();
        let optimizer = Optimizer::new(&registry, BacktestConfig::default());
        let err = optimizer
            .optimize(&scripted_bars(), "no_such_pattern", &ParamRanges::new(), &[])
            .unwrap_err();
        assert!(matches!(err, OptimizeError::Registry(_)));
    }

    #[test]
    fn unknown_filter_fails_the_whole_sweep() {
        let registry = registry_with_trigger();
        let optimizer = Optimizer::new(&registry, BacktestConfig::default());
        let err = optimizer
            .optimize(
                &scripted_bars(),
                "index_trigger",
                &trigger_ranges(1, 1),
                &[FilterConfig::new("no_such_filter")],
            )
            .unwrap_err();
        assert!(matches!(err, OptimizeError::Registry(_)));
    }

    #[test]
    fn empty_bars_fail_the_whole_sweep() {
        let registry = registry_with_trigger();
        let optimizer = Optimizer::new(&registry, BacktestConfig::default());
        let err = optimizer
            .optimize(&[], "index_trigger", &trigger_ranges(1, 1), &[])
            .unwrap_err();
        assert!(matches!(err, OptimizeError::Input(_)));
    }

    #[test]
    fn empty_ranges_run_exactly_one_job() {
        let registry = registry_with_trigger();
        let optimizer = Optimizer::new(&registry, BacktestConfig::default());
        // trigger defaults to 1; bar 1 signals, bar 2 clears the target.
        let results = optimizer
            .optimize(&scripted_bars(), "index_trigger", &ParamRanges::new(), &[])
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].metrics.total_trades, 1);
        assert!(results[0].params.is_empty());
    }

    #[test]
    fn failing_cells_are_dropped_not_fatal() {
        let registry = ComponentRegistry::builtin();
        let optimizer = Optimizer::new(&registry, BacktestConfig::default());
        // sma_period=0 is rejected by the pattern; 20 merely finds nothing
        // on this short series. Neither aborts the sweep.
        let ranges = ParamRanges::new().with(
            "sma_period",
            ParamSpec::Int { min: 0, max: 20, step: 20, default: 20 },
        );
        let results = optimizer
            .optimize(&scripted_bars(), "climactic_volume", &ranges, &[])
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn multi_pattern_tags_and_reranks() {
        let registry = registry_with_trigger();
        let optimizer = Optimizer::new(&registry, BacktestConfig::default());
        let results = optimizer
            .optimize_multi_pattern(
                &scripted_bars(),
                &[
                    ("engulfing", ParamRanges::new()),
                    ("index_trigger", trigger_ranges(1, 2)),
                ],
            )
            .unwrap();

        assert!(!results.is_empty());
        for result in &results {
            assert!(result.params.contains_key("pattern"));
        }
        for pair in results.windows(2) {
            assert!(pair[0].rank_score >= pair[1].rank_score);
        }
        // The winning trigger cell carries its pattern tag.
        let best = &results[0];
        assert_eq!(best.params["pattern"].as_str(), Some("index_trigger"));
        assert_eq!(best.params["trigger"].as_i64(), Some(1));
    }

    #[test]
    fn rank_score_weights_and_saturation() {
        let mut metrics = SummaryMetrics {
            roi: 50.0,
            profit_factor: 1.5,
            max_drawdown: -20.0,
            ..SummaryMetrics::default()
        };
        let expected = 0.5 * 0.3 + 0.5 * 0.3 + 0.8 * 0.4;
        assert!((rank_score(&metrics) - expected).abs() < 1e-12);

        // Saturation: ROI caps at 200%, profit factor at 3.
        metrics.roi = 1_000.0;
        metrics.profit_factor = 50.0;
        metrics.max_drawdown = 0.0;
        let capped = 2.0 * 0.3 + 1.0 * 0.3 + 1.0 * 0.4;
        assert!((rank_score(&metrics) - capped).abs() < 1e-12);

        // Deep drawdown bottoms out at zero contribution.
        metrics.roi = -500.0;
        metrics.profit_factor = 0.0;
        metrics.max_drawdown = -150.0;
        assert!((rank_score(&metrics) - (-1.0 * 0.3)).abs() < 1e-12);
    }
}
