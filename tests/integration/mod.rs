//! Integration tests for turnout sheet generation and cleanup

mod clean_pipeline;
mod cli_route;
mod generate_pipeline;
mod partition_properties;
