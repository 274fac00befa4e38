//! Single entry point for building a [`FileboxConfig`] from all sources.

use super::merge::merge_policy;
use super::sources::{env_vars, explicit_file, global_file};
use super::FileboxConfig;
use crate::error::IndexError;
use config::Environment;
use std::path::Path;

/// Loads and validates configuration.
///
/// Precedence (lowest to highest): defaults, global file, explicit file,
/// `FILEBOX__*` environment variables.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from every source. `explicit` is the `--config` file, if given.
    pub fn load(explicit: Option<&Path>) -> Result<FileboxConfig, IndexError> {
        Self::load_with_environment(explicit, env_vars::environment(), true)
    }

    /// Load from defaults, `path` and the environment, skipping the global file.
    pub fn load_from_file(path: &Path) -> Result<FileboxConfig, IndexError> {
        Self::load_with_environment(Some(path), env_vars::environment(), false)
    }

    /// Load with a caller-supplied environment source.
    pub fn load_with_environment(
        explicit: Option<&Path>,
        environment: Environment,
        include_global: bool,
    ) -> Result<FileboxConfig, IndexError> {
        let mut builder = merge_policy::builder_with_defaults()?;
        if include_global {
            builder = global_file::add_to_builder(builder)?;
        }
        if let Some(path) = explicit {
            builder = explicit_file::add_to_builder(builder, path)?;
        }
        builder = env_vars::add_to_builder(builder, environment);

        let config: FileboxConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}
