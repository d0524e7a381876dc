//! Sheet generation: plan, per-batch executor, and the run entry point.

pub mod executor;
pub mod plan;
pub mod run;

pub use executor::WorkUnitExecutor;
pub use plan::{
    a1_range, document_title, title_prefix_for_date, BatchSuccess, GenerationConfig,
    GenerationPlan, GenerationReport, GenerationSettings, PlannedBatch,
};
pub use run::{gather_records, run_generate, GenerateRequest};
