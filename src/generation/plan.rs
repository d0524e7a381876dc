//! Generation planning: validated run settings, batch titles, and the run report.

use crate::batch::{self, BatchDescriptor, ShuffleMode};
use crate::error::{ApiError, BatchErrors, BatchFailure};
use crate::records::ColumnMapping;
use crate::remote::RegionId;
use serde::{Deserialize, Serialize};

/// Generation defaults as read from configuration files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Source spreadsheet holding the turnout list and the template region.
    #[serde(default)]
    pub source_id: String,

    /// A1-style range read from the source spreadsheet.
    #[serde(default = "default_read_range")]
    pub read_range: String,

    /// Region (sheet) id of the template inside the source spreadsheet.
    #[serde(default)]
    pub template_region_id: Option<RegionId>,

    #[serde(default)]
    pub columns: ColumnMapping,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Largest remainder folded into the final batch.
    #[serde(default = "default_last_page_fudge")]
    pub last_page_fudge: usize,

    /// Maximum batches provisioned at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default = "default_title_prefix")]
    pub title_prefix: String,

    /// Name the copied template region ends up with.
    #[serde(default = "default_canonical_region_name")]
    pub canonical_region_name: String,

    /// Cells (without sheet name) that receive the name and phone columns.
    #[serde(default = "default_target_cells")]
    pub target_cells: String,

    #[serde(default)]
    pub shuffle: ShuffleMode,
}

fn default_read_range() -> String {
    "turnout-list!B2:E".to_string()
}

fn default_batch_size() -> usize {
    10
}

fn default_last_page_fudge() -> usize {
    3
}

fn default_concurrency() -> usize {
    4
}

fn default_title_prefix() -> String {
    "IC Turnout".to_string()
}

fn default_canonical_region_name() -> String {
    "Sheet1".to_string()
}

fn default_target_cells() -> String {
    "A2:B".to_string()
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            source_id: String::new(),
            read_range: default_read_range(),
            template_region_id: None,
            columns: ColumnMapping::default(),
            batch_size: default_batch_size(),
            last_page_fudge: default_last_page_fudge(),
            concurrency: default_concurrency(),
            title_prefix: default_title_prefix(),
            canonical_region_name: default_canonical_region_name(),
            target_cells: default_target_cells(),
            shuffle: ShuffleMode::default(),
        }
    }
}

/// Title prefix shared by every sheet generated for `date`.
pub fn title_prefix_for_date(prefix: &str, date: &str) -> String {
    format!("{} - {}", prefix, date)
}

/// Title of the sheet for 1-based batch `number`.
pub fn document_title(prefix: &str, date: &str, number: usize) -> String {
    format!("{} - Group {}", title_prefix_for_date(prefix, date), number)
}

/// `Sheet!Cells`, quoting the sheet name when A1 notation requires it.
pub fn a1_range(sheet: &str, cells: &str) -> String {
    let plain = sheet.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        format!("{}!{}", sheet, cells)
    } else {
        format!("'{}'!{}", sheet.replace('\'', "''"), cells)
    }
}

/// Immutable configuration for one generation run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationConfig {
    pub date: String,
    pub source_id: String,
    pub read_range: String,
    pub template_region_id: RegionId,
    pub columns: ColumnMapping,
    pub batch_size: usize,
    pub last_page_fudge: usize,
    pub concurrency: usize,
    pub title_prefix: String,
    pub canonical_region_name: String,
    pub target_cells: String,
    pub shuffle: ShuffleMode,
}

impl GenerationConfig {
    /// Combine settings with the run date and validate the result.
    pub fn from_settings(settings: GenerationSettings, date: &str) -> Result<Self, ApiError> {
        let template_region_id = settings.template_region_id.ok_or_else(|| {
            ApiError::ConfigError("Template region id is required (--template-sheet)".to_string())
        })?;
        let config = Self {
            date: date.trim().to_string(),
            source_id: settings.source_id.trim().to_string(),
            read_range: settings.read_range,
            template_region_id,
            columns: settings.columns,
            batch_size: settings.batch_size,
            last_page_fudge: settings.last_page_fudge,
            concurrency: settings.concurrency,
            title_prefix: settings.title_prefix,
            canonical_region_name: settings.canonical_region_name,
            target_cells: settings.target_cells,
            shuffle: settings.shuffle,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        let required = [
            ("date", &self.date),
            ("source id", &self.source_id),
            ("read range", &self.read_range),
            ("title prefix", &self.title_prefix),
            ("canonical region name", &self.canonical_region_name),
            ("target cells", &self.target_cells),
        ];
        for (label, value) in required {
            if value.trim().is_empty() {
                return Err(ApiError::ConfigError(format!("{} cannot be empty", label)));
            }
        }
        batch::validate_params(self.batch_size, self.last_page_fudge)?;
        if self.concurrency == 0 {
            return Err(ApiError::ConfigError("Concurrency must be at least 1".to_string()));
        }
        self.columns.validate()
    }

    pub fn document_title(&self, number: usize) -> String {
        document_title(&self.title_prefix, &self.date, number)
    }

    pub fn title_prefix(&self) -> String {
        title_prefix_for_date(&self.title_prefix, &self.date)
    }

    /// Range the batch columns are written to, after region normalization.
    pub fn target_range(&self) -> String {
        a1_range(&self.canonical_region_name, &self.target_cells)
    }
}

/// A batch scheduled for this run.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedBatch {
    pub batch: BatchDescriptor,
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationPlan {
    pub total_records: usize,
    /// Batches in the full partition, including ones not selected this run.
    pub batch_count: usize,
    pub batches: Vec<PlannedBatch>,
}

impl GenerationPlan {
    /// Partition `total_records` and keep the batches in `only` (1-based), or all.
    pub fn build(
        config: &GenerationConfig,
        total_records: usize,
        only: Option<&[usize]>,
    ) -> Result<Self, ApiError> {
        let all = batch::partition(total_records, config.batch_size, config.last_page_fudge)?;
        let batch_count = all.len();
        if let Some(only) = only {
            if let Some(missing) = only.iter().find(|n| **n == 0 || **n > batch_count) {
                return Err(ApiError::ConfigError(format!(
                    "Batch {} does not exist; this run has {} batch(es)",
                    missing, batch_count
                )));
            }
        }
        let batches = all
            .into_iter()
            .filter(|b| only.map_or(true, |only| only.contains(&b.number())))
            .map(|batch| PlannedBatch {
                title: config.document_title(batch.number()),
                batch,
            })
            .collect();
        Ok(Self {
            total_records,
            batch_count,
            batches,
        })
    }
}

/// A batch whose sheet was created and filled.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSuccess {
    pub index: usize,
    pub title: String,
    pub document_id: String,
    pub rows: usize,
}

/// Outcome of a generation run. Partial success is reported, not discarded.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub total_records: usize,
    pub batch_count: usize,
    pub dry_run: bool,
    pub planned: Vec<PlannedBatch>,
    pub succeeded: Vec<BatchSuccess>,
    pub failed: Vec<BatchFailure>,
    /// 1-based numbers of batches never dispatched after a fatal error.
    pub cancelled: Vec<usize>,
}

impl GenerationReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.cancelled.is_empty()
    }

    /// Every failure joined into one error, or `None` when all batches succeeded.
    pub fn combined_error(&self) -> Option<ApiError> {
        if self.is_success() {
            return None;
        }
        Some(ApiError::BatchesFailed {
            errors: BatchErrors {
                failures: self.failed.clone(),
                cancelled: self.cancelled.len(),
            },
            total: self.planned.len(),
        })
    }

    /// 1-based numbers to pass to `--only-batch` to retry what did not finish.
    pub fn retry_numbers(&self) -> Vec<usize> {
        let mut numbers: Vec<usize> = self
            .failed
            .iter()
            .map(BatchFailure::number)
            .chain(self.cancelled.iter().copied())
            .collect();
        numbers.sort_unstable();
        numbers
    }
}
