//! Human-readable rendering of probe runs and recheck changes.

use std::time::Duration;

use crate::orchestrator::{ProbeRun, ProbeSummary, StatusChange};
use crate::probe::Existence;

use super::{OutputMode, ProbeTheme};

/// Format a duration for display.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1.0 {
        format!("{}ms", d.as_millis())
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}

/// Format a byte count for display.
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{} B", bytes)
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}

/// One line per package, grouped under version and category headings.
///
/// Found packages are listed only in verbose mode; missing and
/// inconclusive ones always are.
pub fn report_lines(run: &ProbeRun, theme: &ProbeTheme, mode: OutputMode) -> Vec<String> {
    let mut lines = Vec::new();

    for (version, categories) in &run.report {
        lines.push(theme.highlight.apply_to(version).to_string());
        if categories.is_empty() {
            lines.push(format!("  {}", theme.dim.apply_to("no packages matched")));
            continue;
        }

        for (category, packages) in categories {
            let shown: Vec<_> = packages
                .iter()
                .filter(|(_, entry)| mode.shows_details() || entry.result != Existence::Found)
                .collect();
            let found = packages.values().filter(|e| e.result.is_found()).count();

            lines.push(format!(
                "  {} {}",
                category,
                theme
                    .dim
                    .apply_to(format!("({}/{} found)", found, packages.len()))
            ));

            for (name, entry) in shown {
                let mut line = format!("    {} {}", theme.existence_icon(entry.result), name);
                if let Some(code) = entry.status_code {
                    line.push_str(&format!(" {}", theme.dim.apply_to(format!("[{}]", code))));
                }
                if let Some(error) = &entry.error {
                    line.push_str(&format!(" {}", theme.dim.apply_to(error)));
                }
                if mode.shows_details() {
                    line.push_str(&format!("\n      {}", theme.dim.apply_to(&entry.url)));
                }
                lines.push(line);
            }
        }
    }

    lines
}

/// `12 packages: 10 found, 1 not found, 1 errors (1.2s)`
pub fn format_summary(summary: &ProbeSummary, duration: Duration, theme: &ProbeTheme) -> String {
    format!(
        "{} packages: {} found, {} not found, {} errors {}",
        summary.total,
        theme.success.apply_to(summary.found),
        theme.error.apply_to(summary.not_found),
        theme.warning.apply_to(summary.errors),
        theme
            .dim
            .apply_to(format!("({})", format_duration(duration)))
    )
}

/// `7.5.0.3 core/pkgB: unknown -> true`
pub fn format_change(change: &StatusChange, theme: &ProbeTheme) -> String {
    format!(
        "{} {}/{}: {} -> {}",
        theme.highlight.apply_to(change.version),
        change.category,
        change.name,
        theme.format_lookup(change.previous),
        theme.format_lookup(crate::cache::Lookup::Recorded(change.current))
    )
}
