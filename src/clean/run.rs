//! Cleanup entry point: resolve, confirm, delete concurrently, report.

use crate::clean::selector::CleanSelector;
use crate::error::{ApiError, BatchErrors, BatchFailure, WorkflowStep};
use crate::remote::{DriveFile, SheetsService};
use crate::scheduler::{fan_out, UnitOutcome};
use serde::Serialize;
use tracing::{info, warn};

/// Asks whether the matched documents may be deleted.
pub trait Confirmer {
    fn confirm(&self, matches: &[DriveFile]) -> Result<bool, ApiError>;
}

/// Confirms without asking (`--yes`).
pub struct AssumeYes;

impl Confirmer for AssumeYes {
    fn confirm(&self, _matches: &[DriveFile]) -> Result<bool, ApiError> {
        Ok(true)
    }
}

#[derive(Debug, Clone)]
pub struct CleanRequest {
    pub selector: CleanSelector,
    /// List matches only; never delete.
    pub dry_run: bool,
    pub concurrency: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanOutcome {
    NothingMatched,
    DryRun,
    Declined,
    Deleted,
}

#[derive(Debug, Clone, Serialize)]
pub struct CleanReport {
    pub query: String,
    pub matched: Vec<DriveFile>,
    pub outcome: CleanOutcome,
    pub deleted: Vec<DriveFile>,
    pub failed: Vec<BatchFailure>,
    pub cancelled: Vec<DriveFile>,
}

impl CleanReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.cancelled.is_empty()
    }

    pub fn combined_error(&self) -> Option<ApiError> {
        if self.is_success() {
            return None;
        }
        Some(ApiError::DeletionsFailed {
            errors: BatchErrors {
                failures: self.failed.clone(),
                cancelled: self.cancelled.len(),
            },
            total: self.matched.len(),
        })
    }
}

/// Delete every document the selector resolves to, after confirmation.
///
/// A dry run or a declined confirmation performs zero deletions but still
/// reports what would have been deleted.
pub async fn run_clean(
    service: &dyn SheetsService,
    request: &CleanRequest,
    confirmer: &dyn Confirmer,
) -> Result<CleanReport, ApiError> {
    request.selector.validate()?;
    if request.concurrency == 0 {
        return Err(ApiError::ConfigError("Concurrency must be at least 1".to_string()));
    }

    let matched = request.selector.resolve(service).await?;
    let mut report = CleanReport {
        query: request.selector.query(),
        matched,
        outcome: CleanOutcome::NothingMatched,
        deleted: Vec::new(),
        failed: Vec::new(),
        cancelled: Vec::new(),
    };

    if report.matched.is_empty() {
        return Ok(report);
    }
    if request.dry_run {
        report.outcome = CleanOutcome::DryRun;
        return Ok(report);
    }
    if !confirmer.confirm(&report.matched)? {
        info!(matches = report.matched.len(), "Deletion declined");
        report.outcome = CleanOutcome::Declined;
        return Ok(report);
    }

    info!(matches = report.matched.len(), "Deleting spreadsheets");
    let outcomes = fan_out(report.matched.clone(), request.concurrency, |index, file| async move {
        service
            .delete_document(&file.document_id)
            .await
            .map(|()| file.clone())
            .map_err(|e| BatchFailure::new(index, file.name.as_str(), WorkflowStep::Delete, &e))
    })
    .await?;

    report.outcome = CleanOutcome::Deleted;
    for (file, outcome) in report.matched.iter().zip(outcomes) {
        match outcome {
            UnitOutcome::Completed(deleted) => report.deleted.push(deleted),
            UnitOutcome::Failed(failure) => {
                warn!(document_id = %file.document_id, cause = %failure.cause, "Deletion failed");
                report.failed.push(failure);
            }
            UnitOutcome::Cancelled => report.cancelled.push(file.clone()),
        }
    }
    Ok(report)
}
