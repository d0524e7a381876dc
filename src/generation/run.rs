//! Single generate entry point: read, filter, shuffle, partition, fan out, report.
//! Stages run strictly in that order; the CLI and tests call only `run_generate`.

use crate::error::ApiError;
use crate::generation::executor::WorkUnitExecutor;
use crate::generation::plan::{GenerationConfig, GenerationPlan, GenerationReport};
use crate::records::{extract_pairs, RecordPairs};
use crate::remote::SheetsService;
use crate::scheduler::{fan_out, UnitOutcome};
use tracing::{info, warn};

/// Per-invocation options that are not part of the generation configuration.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    /// 1-based batch numbers to run; `None` runs every batch.
    pub only_batches: Option<Vec<usize>>,
    /// Plan and report without creating any sheets.
    pub dry_run: bool,
}

/// Read the source rows and return the (possibly shuffled) record pairs.
pub async fn gather_records(
    service: &dyn SheetsService,
    config: &GenerationConfig,
) -> Result<RecordPairs, ApiError> {
    info!(source_id = %config.source_id, range = %config.read_range, "Gathering source data");
    let rows = service
        .read_rows(&config.source_id, &config.read_range)
        .await?;
    info!(rows = rows.len(), "Read rows from source sheet");
    let pairs = extract_pairs(&rows, &config.columns);
    pairs.shuffled(config.shuffle)
}

/// Generate one filled sheet per batch and report every outcome.
///
/// Batch failures do not abort the run; they are collected into the report.
/// Only configuration and source-read errors are returned as `Err`.
pub async fn run_generate(
    service: &dyn SheetsService,
    config: &GenerationConfig,
    request: &GenerateRequest,
) -> Result<GenerationReport, ApiError> {
    config.validate()?;
    if request.only_batches.is_some() && !config.shuffle.is_reproducible() {
        warn!(
            "Re-running selected batches with an unseeded shuffle assigns different rows to them"
        );
    }

    let records = gather_records(service, config).await?;
    let plan = GenerationPlan::build(config, records.len(), request.only_batches.as_deref())?;
    info!(
        n = plan.total_records,
        batches = plan.batch_count,
        selected = plan.batches.len(),
        batch_size = config.batch_size,
        "Generating and filling spreadsheets"
    );

    let mut report = GenerationReport {
        total_records: plan.total_records,
        batch_count: plan.batch_count,
        dry_run: request.dry_run,
        planned: plan.batches.clone(),
        succeeded: Vec::new(),
        failed: Vec::new(),
        cancelled: Vec::new(),
    };
    if request.dry_run || plan.batches.is_empty() {
        return Ok(report);
    }

    let executor = WorkUnitExecutor::new(service, config, &records);
    let outcomes = fan_out(plan.batches, config.concurrency, |_, planned| {
        let executor = &executor;
        async move { executor.execute(&planned).await }
    })
    .await?;

    for (planned, outcome) in report.planned.iter().zip(outcomes) {
        match outcome {
            UnitOutcome::Completed(success) => report.succeeded.push(success),
            UnitOutcome::Failed(failure) => {
                warn!(batch = failure.number(), cause = %failure.cause, "Batch failed");
                report.failed.push(failure);
            }
            UnitOutcome::Cancelled => report.cancelled.push(planned.batch.number()),
        }
    }

    info!(
        succeeded = report.succeeded.len(),
        failed = report.failed.len(),
        cancelled = report.cancelled.len(),
        "Generation finished"
    );
    Ok(report)
}
