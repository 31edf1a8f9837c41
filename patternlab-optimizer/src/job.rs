//! One sweep job: pattern + filters + engine over a private bar copy.

use anyhow::Context;
use serde::{Deserialize, Serialize};

use patternlab_core::components::{ComponentRegistry, SignalFilter};
use patternlab_core::domain::{Bar, ParamMap};
use patternlab_core::engine::{BacktestResult, SimulationEngine};

/// A filter selected for a sweep, with its fixed parameters.
///
/// Filter parameters are not part of the grid; they are held constant across
/// every job of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    pub name: String,
    #[serde(default)]
    pub params: ParamMap,
}

impl FilterConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), params: ParamMap::new() }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: patternlab_core::domain::ParamValue) -> Self {
        self.params.insert(name.into(), value);
        self
    }
}

/// Filters resolved against the registry, ready to run.
pub(crate) type ResolvedFilters = Vec<(std::sync::Arc<dyn SignalFilter>, ParamMap)>;

pub(crate) fn resolve_filters(
    registry: &ComponentRegistry,
    configs: &[FilterConfig],
) -> Result<ResolvedFilters, patternlab_core::components::RegistryError> {
    configs
        .iter()
        .map(|c| Ok((registry.filter(&c.name)?.clone(), c.params.clone())))
        .collect()
}

/// Runs one grid cell end to end.
///
/// The job works on its own copy of the bars, so jobs never observe each
/// other's signal columns. Any component or engine failure propagates to the
/// caller, which decides whether to drop the cell.
pub(crate) fn run_job(
    engine: &SimulationEngine,
    bars: &[Bar],
    pattern: &dyn patternlab_core::components::EntryPattern,
    filters: &ResolvedFilters,
    params: &ParamMap,
) -> anyhow::Result<BacktestResult> {
    let mut bars = bars.to_vec();

    pattern
        .apply(&mut bars, params)
        .with_context(|| format!("pattern {}", pattern.meta().name))?;

    for (filter, filter_params) in filters {
        filter
            .apply(&mut bars, filter_params)
            .with_context(|| format!("filter {}", filter.meta().name))?;
    }

    // Filters veto entries; with none configured the columns stay untouched.
    if !filters.is_empty() {
        for bar in bars.iter_mut() {
            bar.signal_long = bar.signal_long && bar.filter_ok;
            bar.signal_short = bar.signal_short && bar.filter_ok;
        }
    }

    let result = engine.run(&bars, params)?;
    Ok(result)
}
