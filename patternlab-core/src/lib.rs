//! PatternLab Core — bar data model, signal components, trade simulation.
//!
//! This crate contains the heart of the strategy lab:
//! - Domain types (annotated bars, typed parameters, positions, trades)
//! - Component registry with builtin entry patterns, filters, and sessions
//! - Deterministic per-bar simulation engine with stop/target exits
//! - Summary metrics over the trade ledger and equity curve
//!
//! Grid expansion, parallel sweeps, and ranking live in `patternlab-optimizer`.

pub mod components;
pub mod config;
pub mod domain;
pub mod engine;
