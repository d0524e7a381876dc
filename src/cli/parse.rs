//! CLI parse: clap types for turnout. No behavior; definitions only.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Turnout CLI - split a turnout list into batched call sheets
#[derive(Parser)]
#[command(name = "turnout")]
#[command(about = "Generate batched turnout call sheets from a source spreadsheet")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory searched for config/config.toml
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, default_value = "false")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate turnout sheets in batches from the source sheet
    Generate(GenerateArgs),
    /// Remove a set of generated turnout sheets
    Clean(CleanArgs),
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Date used in created spreadsheet titles
    #[arg(short = 'd', long)]
    pub date: String,

    /// ID of the source spreadsheet
    #[arg(short = 's', long = "source")]
    pub source: Option<String>,

    /// ID of the template sheet inside the source spreadsheet
    #[arg(short = 't', long = "template-sheet")]
    pub template_sheet: Option<i64>,

    /// A1-style range read from the source spreadsheet
    #[arg(short = 'r', long = "read-range")]
    pub read_range: Option<String>,

    /// Relative index of the "do turnout" flag column
    #[arg(long = "do-turnout-idx")]
    pub do_turnout_idx: Option<usize>,

    /// Relative index of the first name column
    #[arg(long = "first-name-idx")]
    pub first_name_idx: Option<usize>,

    /// Relative index of the phone number column
    #[arg(long = "phone-idx")]
    pub phone_idx: Option<usize>,

    /// Number of records per batch
    #[arg(long = "batch-size")]
    pub batch_size: Option<usize>,

    /// Maximum number of leftover records appended to the last batch
    #[arg(long = "last-page-fudge")]
    pub last_page_fudge: Option<usize>,

    /// Maximum spreadsheets provisioned at once
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Title prefix for generated spreadsheets
    #[arg(long = "title-prefix")]
    pub title_prefix: Option<String>,

    /// Keep source order instead of shuffling records
    #[arg(long = "no-shuffle", conflicts_with = "seed")]
    pub no_shuffle: bool,

    /// Shuffle with a fixed seed so batches are reproducible
    #[arg(long)]
    pub seed: Option<u64>,

    /// Only run these 1-based batch numbers (repeat or comma-separate)
    #[arg(long = "only-batch", value_delimiter = ',')]
    pub only_batch: Vec<usize>,

    /// Print the plan without creating spreadsheets
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Output format (text or json)
    #[arg(long, default_value = "text")]
    pub format: String,
}

#[derive(Args, Debug, Clone)]
pub struct CleanArgs {
    /// Delete spreadsheets generated for this date
    #[arg(short = 'd', long)]
    pub date: Option<String>,

    /// Delete spreadsheets whose name contains this text
    #[arg(long = "name-contains")]
    pub name_contains: Option<String>,

    /// Delete spreadsheets matching a raw file query
    #[arg(short = 'q', long)]
    pub query: Option<String>,

    /// Title prefix used with --date
    #[arg(long = "title-prefix")]
    pub title_prefix: Option<String>,

    /// Only print matching files; do not delete
    #[arg(short = 't', long = "test", alias = "dry-run")]
    pub test: bool,

    /// Delete without asking for confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Maximum deletions in flight at once
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Output format (text or json)
    #[arg(long, default_value = "text")]
    pub format: String,
}
