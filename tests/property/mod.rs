//! Property-based tests for the index format and duplicate grouping

mod dedupe_grouping;
