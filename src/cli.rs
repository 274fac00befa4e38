//! CLI domain: parse, route, output, and presentation only.
//! No index logic; a single route table dispatches to the library.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands, ReportFormat};
pub use presentation::{
    format_bytes, format_dedupe_json, format_dedupe_text, format_scan_skipped,
    format_scan_summary, format_section_heading, format_watch_outcome,
};
pub use route::RunContext;
