//! Config sources, lowest to highest precedence: global file, workspace files, environment.

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Path to the global config file: `$XDG_CONFIG_HOME/turnout/config.toml`,
/// else `~/.config/turnout/config.toml`.
pub fn global_config_path() -> Option<PathBuf> {
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(std::env::var("HOME").ok()?).join(".config"),
    };
    Some(base.join("turnout").join("config.toml"))
}

fn add_file(builder: ConfigBuilder<DefaultState>, path: &Path) -> ConfigBuilder<DefaultState> {
    if path.exists() {
        debug!(config_path = %path.display(), "Adding config file source");
        builder.add_source(File::from(path.to_path_buf()).required(false))
    } else {
        builder
    }
}

/// Add the global config file to builder if it exists.
pub fn add_global_file(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    match global_config_path() {
        Some(path) => add_file(builder, &path),
        None => builder,
    }
}

/// Add config/config.toml then config/{TURNOUT_ENV}.toml under the workspace root.
pub fn add_workspace_files(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> ConfigBuilder<DefaultState> {
    let config_dir = workspace_root.join("config");
    let env_name = std::env::var("TURNOUT_ENV").unwrap_or_else(|_| "development".to_string());
    let builder = add_file(builder, &config_dir.join("config.toml"));
    add_file(builder, &config_dir.join(format!("{}.toml", env_name)))
}

/// `TURNOUT__GENERATE__BATCH_SIZE=12` style overrides.
pub fn add_environment(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("TURNOUT")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    )
}
