//! Human-readable run reports.

use std::fmt::Write;

use console::style;
use tilemirror::mirror::{CatalogSummary, CleanupSummary, DatasetReport};
use tilemirror::reconcile::PlanStats;
use tilemirror::transcode::TranscodeReport;

/// Format a byte count as a human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Catalog and reconcile figures for one dataset.
pub fn render_plan(dataset: &str, catalog: &CatalogSummary, stats: &PlanStats, jobs: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", style(format!("[{}]", dataset)).bold());
    let _ = writeln!(
        out,
        "  Local tiles:     {} ({} skipped)",
        catalog.local_tiles, catalog.local_skipped
    );
    let _ = writeln!(
        out,
        "  Manifest:        {} entries ({} malformed)",
        catalog.manifest_entries, catalog.manifest_skipped
    );
    let _ = writeln!(
        out,
        "  Deltas:          {} entries over {} days ({} malformed)",
        catalog.delta_entries, catalog.delta_days, catalog.delta_skipped
    );
    let _ = writeln!(
        out,
        "  Up to date:      {}  out of zoom: {}  delta only: {}",
        stats.up_to_date, stats.out_of_zoom, stats.delta_only
    );
    let _ = writeln!(
        out,
        "  To download:     {} ({} missing, {} changed)",
        jobs, stats.missing_locally, stats.changed
    );
    out
}

/// Full report for one synced dataset.
pub fn render_dataset(report: &DatasetReport) -> String {
    let mut out = render_plan(
        report.dataset.as_str(),
        &report.catalog,
        &report.plan,
        report.download.total,
    );

    let download = &report.download;
    let _ = writeln!(
        out,
        "  Downloaded:      {} ({}), {} not found",
        download.written,
        format_bytes(download.bytes),
        download.not_found
    );
    if !download.failed.is_empty() {
        let _ = writeln!(
            out,
            "  {}",
            style(format!(
                "Failed:          {} (retried on next run, see log)",
                download.failure_count()
            ))
            .yellow()
        );
    }

    out.push_str(&render_cleanup(&report.cleanup));
    if let Some(ref transcode) = report.transcode {
        out.push_str(&render_transcode(transcode));
    }
    out
}

/// Cached catalogs removed after a run.
pub fn render_cleanup(cleanup: &CleanupSummary) -> String {
    format!(
        "  Cleanup:         manifest {}, {} delta files removed\n",
        if cleanup.manifest_removed { "removed" } else { "kept" },
        cleanup.deltas_removed
    )
}

/// Transcode pass results.
pub fn render_transcode(report: &TranscodeReport) -> String {
    let mut out = format!("  Transcoded:      {}\n", report.converted);
    if !report.missing.is_empty() {
        let _ = writeln!(out, "  Missing tiles:   {}", report.missing.len());
    }
    if !report.failed.is_empty() {
        let _ = writeln!(
            out,
            "  {}",
            style(format!("Transcode failed: {}", report.failed.len())).yellow()
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_render_cleanup() {
        let cleanup = CleanupSummary {
            manifest_removed: true,
            deltas_removed: 3,
        };
        let text = render_cleanup(&cleanup);
        assert!(text.contains("manifest removed"));
        assert!(text.contains("3 delta files"));
    }

    #[test]
    fn test_render_plan_counts() {
        let stats = PlanStats {
            missing_locally: 2,
            changed: 1,
            ..Default::default()
        };
        let text = render_plan("std", &CatalogSummary::default(), &stats, 3);
        assert!(text.contains("To download:     3 (2 missing, 1 changed)"));
    }
}
