//! Spreadsheet Service Abstraction
//!
//! Every remote call the generator and cleaner make goes through
//! [`SheetsService`]. The HTTP implementation lives in [`google`]; tests supply
//! in-memory doubles. A service value is built once per run and passed to each
//! component that needs it.

use crate::error::ApiError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod google;

pub use google::{GoogleSheetsClient, RemoteConfig};

/// Identifier of a region (sheet tab) inside a document.
pub type RegionId = i64;

/// A freshly created destination document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentHandle {
    pub document_id: String,
    pub title: String,
}

/// One region of a document as it exists remotely right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub region_id: RegionId,
    pub title: String,
}

/// A document returned by a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveFile {
    pub name: String,
    pub document_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteConfirmation {
    pub updated_range: String,
    pub updated_cells: usize,
}

/// Remote spreadsheet and file operations.
#[async_trait]
pub trait SheetsService: Send + Sync {
    /// Read `range` from `source_id` as rows of cell text.
    async fn read_rows(&self, source_id: &str, range: &str) -> Result<Vec<Vec<String>>, ApiError>;

    /// Create an empty document titled `title`.
    async fn create_document(&self, title: &str) -> Result<DocumentHandle, ApiError>;

    /// Current regions of `document_id`, fetched from the service.
    async fn list_regions(&self, document_id: &str) -> Result<Vec<Region>, ApiError>;

    /// Copy region `template_region_id` of `source_id` into `destination_id`.
    async fn copy_template_into(
        &self,
        source_id: &str,
        template_region_id: RegionId,
        destination_id: &str,
    ) -> Result<RegionId, ApiError>;

    /// Drop `obsolete_region_id` and rename `new_region_id` to `canonical_name`.
    async fn normalize_regions(
        &self,
        destination_id: &str,
        obsolete_region_id: RegionId,
        new_region_id: RegionId,
        canonical_name: &str,
    ) -> Result<(), ApiError>;

    /// Write `columns` (column-major) into `range_spec`.
    async fn write_range(
        &self,
        document_id: &str,
        range_spec: &str,
        columns: &[&[String]],
    ) -> Result<WriteConfirmation, ApiError>;

    /// Spreadsheets matching a file query.
    async fn find_documents(&self, query: &str) -> Result<Vec<DriveFile>, ApiError>;

    async fn delete_document(&self, document_id: &str) -> Result<(), ApiError>;
}
