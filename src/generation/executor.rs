//! Work-unit executor: provisions and fills the sheet for one batch.
//! Owns the create / copy-template / write sequence; fan-out lives in the scheduler.

use crate::error::{ApiError, BatchFailure, WorkflowStep};
use crate::generation::plan::{BatchSuccess, GenerationConfig, PlannedBatch};
use crate::records::RecordPairs;
use crate::remote::{Region, RegionId, SheetsService};
use tracing::{debug, info};

/// Runs the three-step remote workflow for a single batch.
pub struct WorkUnitExecutor<'a> {
    service: &'a dyn SheetsService,
    config: &'a GenerationConfig,
    records: &'a RecordPairs,
}

impl<'a> WorkUnitExecutor<'a> {
    pub fn new(
        service: &'a dyn SheetsService,
        config: &'a GenerationConfig,
        records: &'a RecordPairs,
    ) -> Self {
        Self {
            service,
            config,
            records,
        }
    }

    /// Create, template, and fill the sheet for `planned`. Failures stay local to this batch.
    pub async fn execute(&self, planned: &PlannedBatch) -> Result<BatchSuccess, BatchFailure> {
        let index = planned.batch.index;
        let title = planned.title.as_str();
        let fail = |step: WorkflowStep, err: ApiError| BatchFailure::new(index, title, step, &err);

        info!(batch = planned.batch.number(), title, "Creating empty spreadsheet");
        let document = self
            .service
            .create_document(title)
            .await
            .map_err(|e| fail(WorkflowStep::CreateDocument, e))?;
        let document_id = document.document_id.as_str();

        let (default_region, copied_region) = self
            .copy_template(document_id)
            .await
            .map_err(|e| fail(WorkflowStep::CopyTemplate, e))?;

        self.service
            .normalize_regions(
                document_id,
                default_region,
                copied_region,
                &self.config.canonical_region_name,
            )
            .await
            .map_err(|e| fail(WorkflowStep::NormalizeRegions, e))?;

        let [names, numbers] = self
            .records
            .columns(planned.batch.range())
            .map_err(|e| fail(WorkflowStep::WriteRange, e))?;
        let target = self.config.target_range();
        debug!(
            batch = planned.batch.number(),
            rows = names.len(),
            target = %target,
            "Writing batch rows"
        );
        let confirmation = self
            .service
            .write_range(document_id, &target, &[names, numbers])
            .await
            .map_err(|e| fail(WorkflowStep::WriteRange, e))?;
        debug!(
            batch = planned.batch.number(),
            updated_range = %confirmation.updated_range,
            updated_cells = confirmation.updated_cells,
            "Batch rows written"
        );

        Ok(BatchSuccess {
            index,
            title: planned.title.clone(),
            document_id: document.document_id.clone(),
            rows: names.len(),
        })
    }

    /// Copy the template in and return `(default_region, copied_region)`.
    ///
    /// Region state is fetched from the service before and after the copy; a
    /// response captured before a mutation is never used to validate it.
    async fn copy_template(&self, document_id: &str) -> Result<(RegionId, RegionId), ApiError> {
        let before = self.service.list_regions(document_id).await?;
        let default_region = match before.as_slice() {
            [only] => only.region_id,
            regions => {
                return Err(ApiError::StructuralInvariant(format!(
                    "New spreadsheet {} should have exactly one sheet, found {}",
                    document_id,
                    regions.len()
                )))
            }
        };

        let copied_region = self
            .service
            .copy_template_into(
                &self.config.source_id,
                self.config.template_region_id,
                document_id,
            )
            .await?;

        let after = self.service.list_regions(document_id).await?;
        if !has_exactly(&after, &[default_region, copied_region]) {
            return Err(ApiError::StructuralInvariant(format!(
                "Spreadsheet {} should hold the default and copied sheets after copy, found {:?}",
                document_id,
                after.iter().map(|r| r.region_id).collect::<Vec<_>>()
            )));
        }
        Ok((default_region, copied_region))
    }
}

fn has_exactly(regions: &[Region], expected: &[RegionId]) -> bool {
    regions.len() == expected.len()
        && expected
            .iter()
            .all(|id| regions.iter().any(|r| r.region_id == *id))
}
