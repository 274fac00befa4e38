//! Merge rules: defaults first, later sources override earlier ones.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("index.default_index_path", "index.txt")?
        .set_default("index.follow_symlinks", false)?
        .set_default("index.ignore_patterns", Vec::<String>::new())?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")
}
