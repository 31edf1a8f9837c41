//! Parameter grid expansion for grid search.
//!
//! Ranges expand to ordered candidate lists; the grid is their eager
//! Cartesian product in lexicographic order over the declared parameter
//! order (last parameter varies fastest).

use patternlab_core::domain::{ParamMap, ParamSpec, ParamValue};

/// Ordered set of per-parameter range specifications.
///
/// Declaration order matters: it fixes the grid's product order and thereby
/// the tie-break order of the final ranking.
#[derive(Debug, Clone, Default)]
pub struct ParamRanges(Vec<(String, ParamSpec)>);

impl ParamRanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, spec: ParamSpec) {
        self.0.push((name.into(), spec));
    }

    pub fn with(mut self, name: impl Into<String>, spec: ParamSpec) -> Self {
        self.push(name, spec);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, ParamSpec)> {
        self.0.iter()
    }
}

impl From<Vec<(String, ParamSpec)>> for ParamRanges {
    fn from(ranges: Vec<(String, ParamSpec)>) -> Self {
        Self(ranges)
    }
}

/// Expands one range spec into its ordered candidate values.
///
/// Integer and float ranges run `min..=max` by `step`; float candidates are
/// generated multiplicatively and rounded to 2 decimals so accumulation drift
/// cannot drop the endpoint. A non-positive step degenerates to `[min]`.
pub fn expand_spec(spec: &ParamSpec) -> Vec<ParamValue> {
    match spec {
        ParamSpec::Int { min, max, step, .. } => {
            if *step <= 0 {
                return vec![ParamValue::Int(*min)];
            }
            let mut values = Vec::new();
            let mut v = *min;
            while v <= *max {
                values.push(ParamValue::Int(v));
                v += step;
            }
            values
        }
        ParamSpec::Float { min, max, step, .. } => {
            if *step <= 0.0 {
                return vec![ParamValue::Float(round2(*min))];
            }
            let mut values = Vec::new();
            let mut k = 0u32;
            loop {
                let v = min + f64::from(k) * step;
                if v > max + 1e-9 {
                    break;
                }
                values.push(ParamValue::Float(round2(v)));
                k += 1;
            }
            values
        }
        ParamSpec::Choice { options, .. } => options
            .iter()
            .map(|o| ParamValue::Text(o.clone()))
            .collect(),
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Fully expanded grid: one ordered value axis per parameter.
#[derive(Debug, Clone)]
pub struct ParamGrid {
    axes: Vec<(String, Vec<ParamValue>)>,
}

impl ParamGrid {
    /// Expands every range into its value axis, keeping declaration order.
    pub fn expand(ranges: &ParamRanges) -> Self {
        let axes = ranges
            .iter()
            .map(|(name, spec)| (name.clone(), expand_spec(spec)))
            .collect();
        Self { axes }
    }

    /// Total number of parameter sets in the grid.
    ///
    /// An empty grid (no parameters) has size 1: the single empty set.
    pub fn size(&self) -> usize {
        self.axes.iter().map(|(_, values)| values.len()).product()
    }

    /// Generates every parameter set eagerly, in lexicographic product order
    /// over the declared parameter order.
    pub fn param_sets(&self) -> Vec<ParamMap> {
        if self.size() == 0 {
            return Vec::new();
        }
        let mut sets = Vec::with_capacity(self.size());
        let mut idx = vec![0usize; self.axes.len()];
        'grid: loop {
            let mut set = ParamMap::new();
            for (axis, &i) in self.axes.iter().zip(&idx) {
                set.insert(axis.0.clone(), axis.1[i].clone());
            }
            sets.push(set);

            // Odometer increment, last axis fastest.
            for k in (0..self.axes.len()).rev() {
                idx[k] += 1;
                if idx[k] < self.axes[k].1.len() {
                    continue 'grid;
                }
                idx[k] = 0;
            }
            break;
        }
        sets
    }
}
