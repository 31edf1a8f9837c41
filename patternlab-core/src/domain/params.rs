//! Typed parameter values and per-parameter range specifications.
//!
//! `ParamValue`/`ParamMap` carry the concrete arguments handed to a component;
//! `ParamSpec` describes one parameter's type and admissible range, both for
//! component metadata and for grid expansion in the optimizer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single typed parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view: integers coerce to float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v}"),
        }
    }
}

/// Named parameter set for one component invocation.
pub type ParamMap = BTreeMap<String, ParamValue>;

/// Range specification for one optimizable parameter.
///
/// Integer and float ranges run from `min` to `max` inclusive by `step`;
/// choice parameters enumerate their options verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParamSpec {
    Int {
        min: i64,
        max: i64,
        step: i64,
        default: i64,
    },
    Float {
        min: f64,
        max: f64,
        step: f64,
        default: f64,
    },
    Choice {
        options: Vec<String>,
        default: String,
    },
}

impl ParamSpec {
    /// The default value a component falls back to when the parameter is absent.
    pub fn default_value(&self) -> ParamValue {
        match self {
            Self::Int { default, .. } => ParamValue::Int(*default),
            Self::Float { default, .. } => ParamValue::Float(*default),
            Self::Choice { default, .. } => ParamValue::Text(default.clone()),
        }
    }
}

// ─── Lookup helpers ──────────────────────────────────────────────────

/// Extract a named f64 parameter, falling back to `default`.
pub fn param_f64(params: &ParamMap, name: &str, default: f64) -> f64 {
    params.get(name).and_then(ParamValue::as_f64).unwrap_or(default)
}

/// Extract a named usize parameter, falling back to `default`.
///
/// Negative values fall back to the default rather than wrapping.
pub fn param_usize(params: &ParamMap, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(ParamValue::as_i64)
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(default)
}

/// Extract a named string parameter, falling back to `default`.
pub fn param_str<'a>(params: &'a ParamMap, name: &str, default: &'a str) -> &'a str {
    params.get(name).and_then(ParamValue::as_str).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_coerces_to_f64() {
        assert_eq!(ParamValue::Int(7).as_f64(), Some(7.0));
        assert_eq!(ParamValue::Text("x".into()).as_f64(), None);
    }

    #[test]
    fn untagged_serde_roundtrip() {
        let mut params = ParamMap::new();
        params.insert("period".into(), ParamValue::Int(20));
        params.insert("multiplier".into(), ParamValue::Float(1.75));
        params.insert("direction".into(), ParamValue::Text("both".into()));

        let json = serde_json::to_string(&params).unwrap();
        let deser: ParamMap = serde_json::from_str(&json).unwrap();
        assert_eq!(params, deser);
    }

    #[test]
    fn spec_default_values() {
        let spec = ParamSpec::Int {
            min: 5,
            max: 50,
            step: 1,
            default: 20,
        };
        assert_eq!(spec.default_value(), ParamValue::Int(20));

        let spec = ParamSpec::Choice {
            options: vec!["long".into(), "short".into(), "both".into()],
            default: "both".into(),
        };
        assert_eq!(spec.default_value(), ParamValue::Text("both".into()));
    }

    #[test]
    fn lookup_helpers_fall_back() {
        let mut params = ParamMap::new();
        params.insert("period".into(), ParamValue::Int(14));
        params.insert("mode".into(), ParamValue::Text("bullish".into()));

        assert_eq!(param_usize(&params, "period", 20), 14);
        assert_eq!(param_usize(&params, "missing", 20), 20);
        assert_eq!(param_f64(&params, "period", 0.0), 14.0);
        assert_eq!(param_str(&params, "mode", "no_filter"), "bullish");
        assert_eq!(param_str(&params, "missing", "no_filter"), "no_filter");
    }

    #[test]
    fn negative_int_does_not_wrap_to_usize() {
        let mut params = ParamMap::new();
        params.insert("period".into(), ParamValue::Int(-3));
        assert_eq!(param_usize(&params, "period", 20), 20);
    }

    #[test]
    fn display_is_compact() {
        assert_eq!(ParamValue::Int(42).to_string(), "42");
        assert_eq!(ParamValue::Float(1.5).to_string(), "1.5");
        assert_eq!(ParamValue::Text("both".into()).to_string(), "both");
    }
}
