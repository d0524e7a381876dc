//! CLI domain: parse, route, output, and presentation only.
//! No domain orchestration; the route table dispatches to generation and cleanup.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{CleanArgs, Cli, Commands, GenerateArgs};
pub use presentation::{
    format_clean_report_json, format_clean_report_text, format_deletion_prompt,
    format_generation_report_json, format_generation_report_text, format_match_list,
};
pub use route::{CommandOutput, DialoguerConfirmer, RunContext};
