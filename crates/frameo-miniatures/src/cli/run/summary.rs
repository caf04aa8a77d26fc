//! End-of-run summary table.

use frameo_core::RunSummary;
use std::time::Duration;

/// Print a formatted summary table after a run.
pub fn print_summary(summary: &RunSummary, elapsed: Duration) {
    eprintln!();
    eprint!("{}", render(summary, elapsed));
}

fn render(summary: &RunSummary, elapsed: Duration) -> String {
    let stats = &summary.processing;
    let total = stats.total();
    let rate = if elapsed.as_secs_f64() > 0.0 {
        total as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };
    let title = if summary.dry_run {
        "         Summary (dry run)"
    } else {
        "               Summary"
    };

    let mut lines = vec![
        "  ====================================".to_string(),
        title.to_string(),
        "  ====================================".to_string(),
    ];
    if summary.dry_run {
        lines.push(format!("    Planned:      {:>8}", stats.planned));
    } else {
        lines.push(format!("    Written:      {:>8}", stats.written));
    }
    if stats.skipped > 0 {
        lines.push(format!("    Skipped:      {:>8}", stats.skipped));
    }
    if stats.failed > 0 {
        lines.push(format!("    Failed:       {:>8}", stats.failed));
    }
    if let Some(pruned) = summary.pruned {
        lines.push(format!("    Pruned files: {:>8}", pruned.removed_files));
        lines.push(format!("    Pruned dirs:  {:>8}", pruned.removed_dirs));
    }
    lines.push("  ------------------------------------".to_string());
    lines.push(format!("    Total:        {:>8}", total));
    lines.push(format!("    Duration:     {:>7.1}s", elapsed.as_secs_f64()));
    lines.push(format!("    Rate:         {:>7.1} img/sec", rate));
    lines.push("  ====================================".to_string());

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
