use crate::watch::WatchOutcome;
use std::path::Path;

pub fn format_watch_outcome(outcome: WatchOutcome, root: &Path, entries: usize) -> String {
    match outcome {
        WatchOutcome::NothingRegistered => {
            format!("Nothing to watch under {}", root.display())
        }
        WatchOutcome::Stopped => format!(
            "Stopped watching {} ({} entries indexed)",
            root.display(),
            entries
        ),
        WatchOutcome::Exhausted => format!(
            "{} is no longer available; stopped watching ({} entries indexed)",
            root.display(),
            entries
        ),
    }
}
