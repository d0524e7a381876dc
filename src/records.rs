//! Record pairs: the (name, phone) columns pulled out of source rows.

use crate::batch::{shuffle_together, ShuffleMode};
use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::debug;

/// Literal cell value that marks a row for inclusion.
pub const INCLUDE_FLAG: &str = "TRUE";

/// Where the relevant values live inside each source row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    #[serde(default = "default_include_idx")]
    pub include_idx: usize,
    #[serde(default = "default_name_idx")]
    pub name_idx: usize,
    #[serde(default = "default_phone_idx")]
    pub phone_idx: usize,
    /// Rows of any other width are skipped.
    #[serde(default = "default_row_width")]
    pub row_width: usize,
}

fn default_include_idx() -> usize {
    0
}

fn default_name_idx() -> usize {
    1
}

fn default_phone_idx() -> usize {
    3
}

fn default_row_width() -> usize {
    4
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            include_idx: default_include_idx(),
            name_idx: default_name_idx(),
            phone_idx: default_phone_idx(),
            row_width: default_row_width(),
        }
    }
}

impl ColumnMapping {
    pub fn validate(&self) -> Result<(), ApiError> {
        for (label, idx) in [
            ("include", self.include_idx),
            ("name", self.name_idx),
            ("phone", self.phone_idx),
        ] {
            if idx >= self.row_width {
                return Err(ApiError::ConfigError(format!(
                    "{} column index {} is outside the expected row width {}",
                    label, idx, self.row_width
                )));
            }
        }
        Ok(())
    }
}

/// Co-indexed names and numbers: `names[i]` always belongs to `numbers[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPairs {
    names: Vec<String>,
    numbers: Vec<String>,
}

impl RecordPairs {
    pub fn from_pairs<I, N, P>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, P)>,
        N: Into<String>,
        P: Into<String>,
    {
        let (names, numbers) = pairs
            .into_iter()
            .map(|(n, p)| (n.into(), p.into()))
            .unzip();
        Self { names, numbers }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn numbers(&self) -> &[String] {
        &self.numbers
    }

    /// The two columns for `range`, name column first.
    pub fn columns(&self, range: Range<usize>) -> Result<[&[String]; 2], ApiError> {
        if range.end > self.len() || range.start > range.end {
            return Err(ApiError::Precondition(format!(
                "Range {:?} is outside {} records",
                range,
                self.len()
            )));
        }
        Ok([&self.names[range.clone()], &self.numbers[range]])
    }

    /// Shuffle both columns with one permutation; no-op when `mode` is `Off`.
    pub fn shuffled(self, mode: ShuffleMode) -> Result<Self, ApiError> {
        let Some(mut rng) = mode.rng() else {
            return Ok(self);
        };
        let mut columns = shuffle_together(vec![self.names, self.numbers], &mut rng)?;
        let numbers = columns.pop().unwrap_or_default();
        let names = columns.pop().unwrap_or_default();
        Ok(Self { names, numbers })
    }
}

/// Extract the name/phone pair from a single row, if the row qualifies.
pub fn extract_pair<'a>(
    row: &'a [String],
    mapping: &ColumnMapping,
) -> Option<(&'a str, &'a str)> {
    if row.len() != mapping.row_width || row.get(mapping.include_idx)? != INCLUDE_FLAG {
        return None;
    }
    Some((row.get(mapping.name_idx)?.as_str(), row.get(mapping.phone_idx)?.as_str()))
}

/// Keep the rows with the expected width and a set include flag.
pub fn extract_pairs(rows: &[Vec<String>], mapping: &ColumnMapping) -> RecordPairs {
    let pairs = RecordPairs::from_pairs(rows.iter().filter_map(|row| extract_pair(row, mapping)));
    debug!(
        rows = rows.len(),
        kept = pairs.len(),
        skipped = rows.len() - pairs.len(),
        "Filtered source rows"
    );
    pairs
}
