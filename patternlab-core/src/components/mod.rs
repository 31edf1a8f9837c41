//! Signal collaborators — entry patterns, filters, session windows — and the
//! registry that owns them.
//!
//! Components are consumed through one narrow contract: they receive the whole
//! bar sequence plus a parameter map and overwrite their boolean column
//! (`signal_long`/`signal_short` for patterns, `filter_ok` for filters,
//! `session_ok` for sessions). The registry is constructed explicitly at
//! startup and immutable afterwards — no global state, no registration side
//! effects.

pub mod filters;
pub mod patterns;
pub mod sessions;

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{Bar, ParamMap, ParamSpec};

pub use filters::{MaCrossFilter, RsiFilter};
pub use patterns::{ClimacticVolume, Engulfing, Shakeout};
pub use sessions::{apply_sessions, LondonSession, NewYorkSession, TokyoSession};

// ─── Metadata ────────────────────────────────────────────────────────

/// Describes a component for discovery by driving code.
///
/// The ordered parameter specs double as default optimization ranges.
#[derive(Debug, Clone)]
pub struct ComponentMeta {
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    /// Parameter name → spec, in declaration order.
    pub params: Vec<(&'static str, ParamSpec)>,
    pub enabled_by_default: bool,
}

impl ComponentMeta {
    /// Default parameter set derived from the specs.
    pub fn default_params(&self) -> ParamMap {
        self.params
            .iter()
            .map(|(name, spec)| (name.to_string(), spec.default_value()))
            .collect()
    }
}

// ─── Component traits ────────────────────────────────────────────────

/// A component rejected its parameters or could not run.
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    #[error("invalid parameter {name}: {reason}")]
    InvalidParam { name: &'static str, reason: String },
}

/// Flags bars as candidate long/short entries.
///
/// Overwrites `signal_long` and `signal_short` on every bar; windows with
/// insufficient lookback produce `false`.
pub trait EntryPattern: Send + Sync {
    fn meta(&self) -> &ComponentMeta;
    fn apply(&self, bars: &mut [Bar], params: &ParamMap) -> Result<(), ComponentError>;
}

/// Gates entries by overwriting `filter_ok` on every bar.
pub trait SignalFilter: Send + Sync {
    fn meta(&self) -> &ComponentMeta;
    fn apply(&self, bars: &mut [Bar], params: &ParamMap) -> Result<(), ComponentError>;
}

/// Time-of-day trading window. ORs its window into `session_ok`.
pub trait SessionWindow: Send + Sync {
    fn meta(&self) -> &ComponentMeta;

    /// Whether the given bar timestamp falls inside this session.
    fn contains(&self, bar: &Bar) -> bool;

    /// ORs this session's window into `session_ok`. Callers combining
    /// several sessions should go through [`apply_sessions`], which resets
    /// the column first.
    fn apply(&self, bars: &mut [Bar]) {
        for bar in bars.iter_mut() {
            bar.session_ok = bar.session_ok || self.contains(bar);
        }
    }
}

// ─── Registry ────────────────────────────────────────────────────────

/// Component lookup failure — surfaced to the caller, never recovered.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown entry pattern: {0}")]
    UnknownPattern(String),

    #[error("unknown filter: {0}")]
    UnknownFilter(String),

    #[error("unknown session: {0}")]
    UnknownSession(String),
}

/// Explicitly constructed mapping from component name to implementation.
///
/// Built once (typically via [`ComponentRegistry::builtin`]) and then shared
/// immutably with the optimizer and driving code.
#[derive(Default)]
pub struct ComponentRegistry {
    patterns: HashMap<String, Arc<dyn EntryPattern>>,
    filters: HashMap<String, Arc<dyn SignalFilter>>,
    sessions: HashMap<String, Arc<dyn SessionWindow>>,
}

impl ComponentRegistry {
    /// Empty registry for callers that register their own components.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-loaded with every builtin component.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register_pattern(Arc::new(Shakeout::new()));
        registry.register_pattern(Arc::new(Engulfing::new()));
        registry.register_pattern(Arc::new(ClimacticVolume::new()));
        registry.register_filter(Arc::new(MaCrossFilter::new()));
        registry.register_filter(Arc::new(RsiFilter::new()));
        registry.register_session(Arc::new(LondonSession::new()));
        registry.register_session(Arc::new(NewYorkSession::new()));
        registry.register_session(Arc::new(TokyoSession::new()));
        registry
    }

    pub fn register_pattern(&mut self, pattern: Arc<dyn EntryPattern>) {
        self.patterns.insert(pattern.meta().name.to_string(), pattern);
    }

    pub fn register_filter(&mut self, filter: Arc<dyn SignalFilter>) {
        self.filters.insert(filter.meta().name.to_string(), filter);
    }

    pub fn register_session(&mut self, session: Arc<dyn SessionWindow>) {
        self.sessions.insert(session.meta().name.to_string(), session);
    }

    pub fn pattern(&self, name: &str) -> Result<&Arc<dyn EntryPattern>, RegistryError> {
        self.patterns
            .get(name)
            .ok_or_else(|| RegistryError::UnknownPattern(name.to_string()))
    }

    pub fn filter(&self, name: &str) -> Result<&Arc<dyn SignalFilter>, RegistryError> {
        self.filters
            .get(name)
            .ok_or_else(|| RegistryError::UnknownFilter(name.to_string()))
    }

    pub fn session(&self, name: &str) -> Result<&Arc<dyn SessionWindow>, RegistryError> {
        self.sessions
            .get(name)
            .ok_or_else(|| RegistryError::UnknownSession(name.to_string()))
    }

    /// Sorted pattern names, for discovery/UI listings.
    pub fn pattern_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.patterns.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn filter_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.filters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn session_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.sessions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

// ─── Shared indicator helpers ────────────────────────────────────────

/// Trailing simple moving average; NaN until the window is full.
pub(crate) fn rolling_mean(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }
    let mut window_sum: f64 = values[..period].iter().sum();
    out[period - 1] = window_sum / period as f64;
    for i in period..values.len() {
        window_sum += values[i] - values[i - period];
        out[i] = window_sum / period as f64;
    }
    out
}
