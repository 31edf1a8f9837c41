//! Plain-text rendering of ranked sweep results. Presentation only.

use std::fmt::Write as _;

use crate::optimizer::OptimizationResult;

/// Renders the top `top_n` results as a fixed-width rank table.
pub fn format_summary(results: &[OptimizationResult], top_n: usize) -> String {
    let mut out = String::new();
    let shown = results.len().min(top_n);
    let _ = writeln!(out, "Top {shown} of {} parameter sets", results.len());
    let _ = writeln!(
        out,
        "{:>4}  {:>7}  {:>8}  {:>6}  {:>6}  {:>8}  params",
        "rank", "score", "roi%", "pf", "trades", "max dd%"
    );
    for (i, result) in results.iter().take(top_n).enumerate() {
        let m = &result.metrics;
        let _ = writeln!(
            out,
            "{:>4}  {:>7.4}  {:>8.2}  {:>6.2}  {:>6}  {:>8.2}  {}",
            i + 1,
            result.rank_score,
            m.roi,
            m.profit_factor,
            m.total_trades,
            m.max_drawdown,
            format_params(result),
        );
    }
    out
}

/// Prints the rank table to stdout.
pub fn print_summary(results: &[OptimizationResult], top_n: usize) {
    print!("{}", format_summary(results, top_n));
}

fn format_params(result: &OptimizationResult) -> String {
    result
        .params
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join(", ")
}
