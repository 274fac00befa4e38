//! CLI presentation: text and json formatters per command.

mod dedupe;
mod scan;
mod shared;
mod watch;

pub use dedupe::{format_dedupe_json, format_dedupe_text};
pub use scan::{format_scan_skipped, format_scan_summary};
pub use shared::{format_bytes, format_section_heading};
pub use watch::format_watch_outcome;
