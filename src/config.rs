//! Configuration System
//!
//! Layered configuration for generation, cleanup, the remote service, and
//! logging. Sources merge in order: built-in defaults, the global config file,
//! workspace config files, then `TURNOUT__*` environment variables. CLI flags
//! are applied last by the route layer.

use crate::clean::CleanSettings;
use crate::error::ApiError;
use crate::generation::GenerationSettings;
use crate::logging::LoggingConfig;
use crate::remote::RemoteConfig;
use serde::{Deserialize, Serialize};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnoutConfig {
    /// Spreadsheet service connection
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Generation defaults
    #[serde(default)]
    pub generate: GenerationSettings,

    /// Cleanup defaults
    #[serde(default)]
    pub clean: CleanSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TurnoutConfig {
    /// Checks that do not depend on per-run input such as the date.
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = Vec::new();
        if self.generate.batch_size == 0 {
            errors.push("generate.batch_size must be at least 1".to_string());
        } else if self.generate.last_page_fudge >= self.generate.batch_size {
            errors.push(format!(
                "generate.last_page_fudge ({}) must be smaller than generate.batch_size ({})",
                self.generate.last_page_fudge, self.generate.batch_size
            ));
        }
        if self.generate.concurrency == 0 {
            errors.push("generate.concurrency must be at least 1".to_string());
        }
        if self.clean.concurrency == 0 {
            errors.push("clean.concurrency must be at least 1".to_string());
        }
        if let Err(e) = self.generate.columns.validate() {
            errors.push(e.to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                errors.join("\n")
            )))
        }
    }
}
