//! Turnout: Batched Call-Sheet Generation
//!
//! Reads a turnout list from a source spreadsheet, filters and shuffles the
//! selected records, splits them into fixed-size batches, and provisions one
//! filled call sheet per batch with bounded concurrency. A companion cleanup
//! operation finds previously generated sheets and deletes them.

pub mod batch;
pub mod clean;
pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod logging;
pub mod records;
pub mod remote;
pub mod scheduler;
