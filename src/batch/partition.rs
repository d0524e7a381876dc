//! Batch partitioning: split `n` records into fixed-size batches where a short
//! remainder of at most `fudge` rows is folded into the final batch.

use crate::error::ApiError;
use serde::Serialize;
use std::ops::Range;

/// One batch's slice of the record sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchDescriptor {
    pub index: usize,
    pub offset: usize,
    pub length: usize,
}

impl BatchDescriptor {
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.length
    }

    /// 1-based batch number used in titles.
    pub fn number(&self) -> usize {
        self.index + 1
    }
}

/// Reject batch parameters the fold rule is not defined for.
pub fn validate_params(size: usize, fudge: usize) -> Result<(), ApiError> {
    if size == 0 {
        return Err(ApiError::ConfigError("Batch size must be at least 1".to_string()));
    }
    if fudge >= size {
        return Err(ApiError::ConfigError(format!(
            "Last page fudge factor ({}) must be smaller than batch size ({})",
            fudge, size
        )));
    }
    Ok(())
}

/// Whether the trailing remainder joins the final full batch.
fn folds_remainder(n: usize, size: usize, fudge: usize) -> bool {
    n >= size && n % size <= fudge
}

/// Number of batches for `n` records. Callers validate `size` first.
pub fn batch_count(n: usize, size: usize, fudge: usize) -> usize {
    if n == 0 {
        return 0;
    }
    if folds_remainder(n, size, fudge) {
        n / size
    } else {
        n / size + 1
    }
}

/// `(offset, length)` owned by batch `index`.
pub fn range_for(
    index: usize,
    n: usize,
    size: usize,
    fudge: usize,
    is_last: bool,
) -> (usize, usize) {
    let offset = index * size;
    if !is_last {
        return (offset, size);
    }
    let remainder = n % size;
    if folds_remainder(n, size, fudge) {
        (offset, size + remainder)
    } else {
        (offset, remainder)
    }
}

/// Every batch for `n` records, in order. Descriptors tile `[0, n)` exactly.
pub fn partition(
    n: usize,
    size: usize,
    fudge: usize,
) -> Result<Vec<BatchDescriptor>, ApiError> {
    validate_params(size, fudge)?;
    let count = batch_count(n, size, fudge);
    let batches = (0..count)
        .map(|index| {
            let (offset, length) = range_for(index, n, size, fudge, index + 1 == count);
            BatchDescriptor {
                index,
                offset,
                length,
            }
        })
        .collect();
    Ok(batches)
}
