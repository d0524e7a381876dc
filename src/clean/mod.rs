//! Cleanup: find previously generated sheets and delete them.

pub mod run;
pub mod selector;

use serde::{Deserialize, Serialize};

pub use run::{run_clean, AssumeYes, CleanOutcome, CleanReport, CleanRequest, Confirmer};
pub use selector::CleanSelector;

/// Cleanup defaults as read from configuration files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanSettings {
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_concurrency() -> usize {
    4
}

impl Default for CleanSettings {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}
