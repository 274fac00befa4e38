use super::shared::format_bytes;
use crate::types::ScanSummary;
use std::path::Path;

pub fn format_scan_summary(summary: &ScanSummary, index_path: &Path) -> String {
    format!(
        "Indexed {} files, {} in {} ms\n  Root: {}\n  Index: {}",
        summary.total_files,
        format_bytes(summary.total_bytes),
        summary.duration_millis,
        summary.root_path,
        index_path.display()
    )
}

pub fn format_scan_skipped(path: &Path) -> String {
    format!(
        "{} is a file, not a directory. No index written.",
        path.display()
    )
}
