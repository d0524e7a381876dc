//! Config loading facade: builds the layered source stack and deserializes it.

use super::merge::builder_with_defaults;
use super::sources;
use super::TurnoutConfig;
use crate::error::ApiError;
use config::File;
use std::path::Path;

/// Loads [`TurnoutConfig`] from the standard source stack or an explicit file.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from defaults, global file, workspace files, and environment.
    pub fn load(workspace_root: &Path) -> Result<TurnoutConfig, ApiError> {
        let builder = builder_with_defaults()?;
        let builder = sources::add_global_file(builder);
        let builder = sources::add_workspace_files(builder, workspace_root);
        let builder = sources::add_environment(builder);
        Self::finish(builder)
    }

    /// Load from defaults, the given file, and environment (skips discovery).
    pub fn load_from_file(path: &Path) -> Result<TurnoutConfig, ApiError> {
        if !path.exists() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let builder = builder_with_defaults()?.add_source(File::from(path.to_path_buf()));
        let builder = sources::add_environment(builder);
        Self::finish(builder)
    }

    fn finish(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<TurnoutConfig, ApiError> {
        let config: TurnoutConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}
