//! Environment source: `FILEBOX__SECTION__KEY`, e.g. `FILEBOX__LOGGING__LEVEL=debug`.
//!
//! `FILEBOX__INDEX__IGNORE_PATTERNS` takes a comma separated list.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

pub const ENV_PREFIX: &str = "FILEBOX";
pub const ENV_SEPARATOR: &str = "__";

/// Environment source with the filebox prefix and separators.
pub fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator(ENV_SEPARATOR)
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("index.ignore_patterns")
}

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    environment: Environment,
) -> ConfigBuilder<DefaultState> {
    builder.add_source(environment)
}
