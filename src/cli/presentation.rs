//! CLI presentation: text and json formatters for generation and cleanup reports.

use crate::clean::{CleanOutcome, CleanReport};
use crate::error::ApiError;
use crate::generation::GenerationReport;
use crate::remote::DriveFile;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use std::collections::HashMap;

fn to_pretty_json(value: &serde_json::Value) -> Result<String, ApiError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn join_numbers(numbers: &[usize]) -> String {
    numbers
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

pub fn format_generation_report_text(report: &GenerationReport) -> String {
    let mut out = format!(
        "{} record(s) in {} batch(es)",
        report.total_records, report.batch_count
    );
    if report.planned.len() != report.batch_count {
        out.push_str(&format!(", {} selected", report.planned.len()));
    }
    if report.planned.is_empty() {
        out.push_str("\nNo spreadsheets to generate.");
        return out;
    }

    let succeeded: HashMap<usize, &str> = report
        .succeeded
        .iter()
        .map(|s| (s.index, s.document_id.as_str()))
        .collect();
    let failed: HashMap<usize, String> = report
        .failed
        .iter()
        .map(|f| (f.index, format!("failed at {}", f.step)))
        .collect();

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Batch", "Title", "Rows", "Status", "Spreadsheet"]);
    for planned in &report.planned {
        let index = planned.batch.index;
        let (status, document) = if report.dry_run {
            ("planned".to_string(), String::new())
        } else if let Some(id) = succeeded.get(&index) {
            ("created".to_string(), id.to_string())
        } else if let Some(reason) = failed.get(&index) {
            (reason.clone(), String::new())
        } else {
            ("cancelled".to_string(), String::new())
        };
        table.add_row(vec![
            planned.batch.number().to_string(),
            planned.title.clone(),
            planned.batch.length.to_string(),
            status,
            document,
        ]);
    }
    out.push('\n');
    out.push_str(&table.to_string());

    if report.dry_run {
        out.push_str("\nDry run: no spreadsheets were created.");
        return out;
    }

    out.push_str(&format!(
        "\n{} {} of {} spreadsheets:",
        "Successfully generated".green(),
        report.succeeded.len(),
        report.planned.len()
    ));
    for success in &report.succeeded {
        out.push_str(&format!("\n  {}", success.title));
    }
    if !report.failed.is_empty() {
        out.push_str(&format!("\n{} ({}):", "Failed".red(), report.failed.len()));
        for failure in &report.failed {
            out.push_str(&format!("\n  - {}", failure));
        }
    }
    if !report.cancelled.is_empty() {
        out.push_str(&format!(
            "\n{}: batch(es) {} were not started after a fatal error",
            "Cancelled".yellow(),
            join_numbers(&report.cancelled)
        ));
    }
    let retry = report.retry_numbers();
    if !retry.is_empty() {
        out.push_str(&format!("\nRetry with: --only-batch {}", join_numbers(&retry)));
    }
    out
}

pub fn format_generation_report_json(report: &GenerationReport) -> Result<String, ApiError> {
    let value = serde_json::json!({
        "total_records": report.total_records,
        "batch_count": report.batch_count,
        "dry_run": report.dry_run,
        "planned": report.planned,
        "succeeded": report.succeeded,
        "failed": report.failed,
        "cancelled": report.cancelled,
        "retry_batches": report.retry_numbers(),
        "success": report.is_success(),
    });
    to_pretty_json(&value)
}

/// Every matched spreadsheet by name and id.
pub fn format_match_list(matches: &[DriveFile]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Name", "Spreadsheet"]);
    for file in matches {
        table.add_row(vec![file.name.clone(), file.document_id.clone()]);
    }
    format!("Found {} match(es):\n{}", matches.len(), table)
}

pub fn format_deletion_prompt(matches: &[DriveFile]) -> String {
    format!("Delete these {} spreadsheet(s)?", matches.len())
}

pub fn format_clean_report_text(report: &CleanReport) -> String {
    if report.matched.is_empty() {
        return format!("No spreadsheets matched: {}", report.query);
    }

    let mut out = format_match_list(&report.matched);

    match report.outcome {
        CleanOutcome::NothingMatched => {}
        CleanOutcome::DryRun => out.push_str("\nTest mode: nothing was deleted."),
        CleanOutcome::Declined => out.push_str("\nNot deleting."),
        CleanOutcome::Deleted => {
            out.push_str(&format!(
                "\n{} {} of {} spreadsheets",
                "Deleted".green(),
                report.deleted.len(),
                report.matched.len()
            ));
            for failure in &report.failed {
                out.push_str(&format!("\n  - {}", failure.to_string().red()));
            }
            if !report.cancelled.is_empty() {
                out.push_str(&format!(
                    "\n{} {} deletion(s) after a fatal error",
                    "Skipped".yellow(),
                    report.cancelled.len()
                ));
            }
        }
    }
    out
}

pub fn format_clean_report_json(report: &CleanReport) -> Result<String, ApiError> {
    let value = serde_json::to_value(report)?;
    to_pretty_json(&value)
}
