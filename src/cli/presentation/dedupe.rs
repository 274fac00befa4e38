//! Duplicate report formatters.

use super::shared::{format_bytes, format_section_heading};
use crate::dedupe::DuplicateReport;
use crate::error::IndexError;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

/// One table per group, then totals.
pub fn format_dedupe_text(report: &DuplicateReport, color: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}\n\n",
        format_section_heading("Duplicate files", color)
    ));
    out.push_str(&format!("  Root: {}\n\n", report.root_path));

    if report.is_empty() {
        out.push_str("No duplicate files found.\n");
        return out;
    }

    for group in &report.groups {
        let hash_label = if color {
            format!("{}", group.hash.yellow())
        } else {
            group.hash.clone()
        };
        out.push_str(&format!(
            "{} ({} files, {} each)\n",
            hash_label,
            group.count(),
            format_bytes(group.representative_size())
        ));

        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Path", "Size", "Modified (ms)"]);
        for entry in &group.entries {
            table.add_row(vec![
                entry.relative_path.clone(),
                entry.size.to_string(),
                entry.modified_time_millis.to_string(),
            ]);
        }
        out.push_str(&format!("{}\n\n", table));
    }

    out.push_str(&format!(
        "{} groups, {} files, {} reclaimable\n",
        report.groups.len(),
        report.duplicate_files,
        format_bytes(report.reclaimable_bytes)
    ));
    out
}

pub fn format_dedupe_json(report: &DuplicateReport) -> Result<String, IndexError> {
    serde_json::to_string_pretty(report)
        .map_err(|e| IndexError::io("rendering duplicate report", e.into()))
}
