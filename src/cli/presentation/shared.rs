//! Shared presentation helpers.

use owo_colors::OwoColorize;

/// Section heading, bold and underlined when `color` is set.
pub fn format_section_heading(title: &str, color: bool) -> String {
    if color {
        format!("{}", title.bold().underline())
    } else {
        title.to_string()
    }
}

/// Human-readable byte count with the exact value, e.g. `1.5 KiB (1536 bytes)`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{} bytes", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = "";
    for candidate in UNITS {
        value /= 1024.0;
        unit = candidate;
        if value < 1024.0 {
            break;
        }
    }
    format!("{:.1} {} ({} bytes)", value, unit, bytes)
}
