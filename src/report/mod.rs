//! Terminal summary of a finished run.

use crate::domain::IngestReport;

/// One line for stdout, e.g.
/// `written gs://landing/raw/api=frankfurter/date=2025-06-01.json (data_date=2025-06-01, run_date=2025-06-02, stale=true)`.
///
/// `location` is the bucket root: `gs://landing` or `<local-root>/landing`.
pub fn format_summary(report: &IngestReport, location: &str) -> String {
    format!(
        "{} {}/{} (data_date={}, run_date={}, stale={})",
        report.outcome.label(),
        location.trim_end_matches('/'),
        report.key,
        report.data_date,
        report.run_date,
        report.stale,
    )
}
