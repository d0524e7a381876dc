//! Error types for turnout sheet generation and cleanup.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Remote workflow step that a batch failure occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    CreateDocument,
    CopyTemplate,
    NormalizeRegions,
    WriteRange,
    Delete,
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowStep::CreateDocument => "create document",
            WorkflowStep::CopyTemplate => "copy template",
            WorkflowStep::NormalizeRegions => "normalize regions",
            WorkflowStep::WriteRange => "write range",
            WorkflowStep::Delete => "delete document",
        };
        f.write_str(name)
    }
}

/// One failed unit of work, tagged with the batch (or document) it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    /// 0-based unit index.
    pub index: usize,
    /// Spreadsheet title (generate) or document id (clean).
    pub label: String,
    pub step: WorkflowStep,
    pub cause: String,
    #[serde(skip)]
    pub fatal: bool,
}

impl BatchFailure {
    pub fn new(index: usize, label: impl Into<String>, step: WorkflowStep, err: &ApiError) -> Self {
        Self {
            index,
            label: label.into(),
            step,
            cause: err.to_string(),
            fatal: err.is_fatal(),
        }
    }

    /// 1-based number as shown to users.
    pub fn number(&self) -> usize {
        self.index + 1
    }
}

impl fmt::Display for BatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.step == WorkflowStep::Delete {
            return write!(f, "deleting {} failed: {}", self.label, self.cause);
        }
        write!(
            f,
            "batch {} ({}) failed at {}: {}",
            self.number(),
            self.label,
            self.step,
            self.cause
        )
    }
}

/// Every failure from one fan-out, joined into a single error value.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchErrors {
    pub failures: Vec<BatchFailure>,
    pub cancelled: usize,
}

impl fmt::Display for BatchErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for failure in &self.failures {
            if !first {
                writeln!(f)?;
            }
            write!(f, "{}", failure)?;
            first = false;
        }
        if self.cancelled > 0 {
            if !first {
                writeln!(f)?;
            }
            write!(f, "{} unit(s) cancelled before dispatch", self.cancelled)?;
        }
        Ok(())
    }
}

impl std::error::Error for BatchErrors {}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Remote request failed: {0}")]
    RemoteRequestFailed(String),

    #[error("Remote authentication failed: {0}")]
    RemoteAuthFailed(String),

    #[error("Remote rate limit exceeded: {0}")]
    RemoteRateLimit(String),

    #[error("Remote resource not found: {0}")]
    RemoteNotFound(String),

    #[error("Unexpected remote response: {0}")]
    RemoteResponse(String),

    #[error("Structural invariant violated: {0}")]
    StructuralInvariant(String),

    #[error("{} of {} batch(es) did not complete:\n{errors}", .errors.failures.len() + .errors.cancelled, .total)]
    BatchesFailed { errors: BatchErrors, total: usize },

    #[error("{} of {} deletion(s) did not complete:\n{errors}", .errors.failures.len() + .errors.cancelled, .total)]
    DeletionsFailed { errors: BatchErrors, total: usize },

    #[error("Failed to render output: {0}")]
    Serialization(String),
}

impl ApiError {
    /// Conditions after which no new remote work should be dispatched.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ApiError::RemoteAuthFailed(_))
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Serialization(err.to_string())
    }
}
