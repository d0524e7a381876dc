//! Merge rules: defaults first, later sources override earlier ones.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("generate.batch_size", 10)?
        .set_default("generate.last_page_fudge", 3)?
        .set_default("generate.concurrency", 4)?
        .set_default("clean.concurrency", 4)
}
