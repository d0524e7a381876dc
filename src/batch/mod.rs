//! Batching: partition record pairs into batches and shuffle them beforehand.

pub mod partition;
pub mod shuffle;

pub use partition::{batch_count, partition, range_for, validate_params, BatchDescriptor};
pub use shuffle::{shuffle_together, ShuffleMode};
