//! Index persistence
//!
//! The index lives in a single line-oriented UTF-8 text file that is rewritten
//! wholesale on every save.

pub mod index_file;

pub use index_file::{load, parse, resolve_target, IndexStore, DEFAULT_INDEX_FILE_NAME};
