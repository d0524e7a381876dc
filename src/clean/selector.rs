//! Clean selectors: turn CLI inputs into a file query and the documents it matches.

use crate::error::ApiError;
use crate::generation::title_prefix_for_date;
use crate::remote::google::quote_query_literal;
use crate::remote::{DriveFile, SheetsService};
use serde::Serialize;
use tracing::info;

/// How the sheets to delete are chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum CleanSelector {
    /// Raw file query, passed through unchanged.
    Query(String),
    /// Sheets whose name contains this text.
    NameContains(String),
    /// Sheets generated for this date (uses the configured title prefix).
    DatePrefix { title_prefix: String, date: String },
}

impl CleanSelector {
    /// Pick exactly one selector from the CLI inputs.
    pub fn from_parts(
        query: Option<String>,
        name_contains: Option<String>,
        date: Option<String>,
        title_prefix: &str,
    ) -> Result<Self, ApiError> {
        let provided = [query.is_some(), name_contains.is_some(), date.is_some()]
            .iter()
            .filter(|p| **p)
            .count();
        if provided != 1 {
            return Err(ApiError::ConfigError(
                "Specify exactly one of --date, --name-contains, or --query".to_string(),
            ));
        }
        let selector = if let Some(q) = query {
            CleanSelector::Query(q)
        } else if let Some(part) = name_contains {
            CleanSelector::NameContains(part)
        } else {
            CleanSelector::DatePrefix {
                title_prefix: title_prefix.to_string(),
                date: date.unwrap_or_default(),
            }
        };
        selector.validate()?;
        Ok(selector)
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        let value = match self {
            CleanSelector::Query(q) => q,
            CleanSelector::NameContains(part) => part,
            CleanSelector::DatePrefix { date, .. } => date,
        };
        if value.trim().is_empty() {
            return Err(ApiError::ConfigError(
                "Clean selector cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// The file query this selector resolves through.
    pub fn query(&self) -> String {
        match self {
            CleanSelector::Query(q) => q.clone(),
            CleanSelector::NameContains(part) => {
                format!("name contains {}", quote_query_literal(part))
            }
            CleanSelector::DatePrefix { title_prefix, date } => format!(
                "name contains {}",
                quote_query_literal(&title_prefix_for_date(title_prefix, date))
            ),
        }
    }

    /// Drive's `contains` matches anywhere in the name; date selection wants a true prefix.
    fn keep(&self, file: &DriveFile) -> bool {
        match self {
            CleanSelector::DatePrefix { title_prefix, date } => file
                .name
                .starts_with(&title_prefix_for_date(title_prefix, date)),
            _ => true,
        }
    }

    /// Resolve the selector to the matching documents.
    pub async fn resolve(&self, service: &dyn SheetsService) -> Result<Vec<DriveFile>, ApiError> {
        let query = self.query();
        let mut files: Vec<DriveFile> = service
            .find_documents(&query)
            .await?
            .into_iter()
            .filter(|f| self.keep(f))
            .collect();
        sort_unique(&mut files);
        info!(query = %query, matches = files.len(), "Resolved clean selector");
        Ok(files)
    }
}

/// Order by name and drop repeated ids. Files sharing a name stay grouped by id.
fn sort_unique(files: &mut Vec<DriveFile>) {
    files.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| a.document_id.cmp(&b.document_id))
    });
    files.dedup_by(|a, b| a.document_id == b.document_id);
}
