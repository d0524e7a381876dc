//! Route-table tests: parsed CLI commands executed against the fake service

use super::test_utils::{FakeSheets, SOURCE_ID, TEMPLATE_REGION};
use clap::Parser;
use parking_lot::Mutex;
use turnout::batch::ShuffleMode;
use turnout::clean::{AssumeYes, Confirmer};
use turnout::cli::{Cli, Commands, RunContext};
use turnout::config::TurnoutConfig;
use turnout::error::ApiError;
use turnout::remote::DriveFile;

#[derive(Default)]
struct Refuse {
    asked: Mutex<Vec<DriveFile>>,
}

impl Confirmer for Refuse {
    fn confirm(&self, matches: &[DriveFile]) -> Result<bool, ApiError> {
        self.asked.lock().extend_from_slice(matches);
        Ok(false)
    }
}

fn command(args: &[&str]) -> Commands {
    let mut argv = vec!["turnout"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap().command
}

fn context() -> RunContext {
    let mut config = TurnoutConfig::default();
    config.generate.source_id = SOURCE_ID.to_string();
    config.generate.template_region_id = Some(TEMPLATE_REGION);
    RunContext::from_config(config)
}

#[test]
fn test_flags_override_configured_settings() {
    let ctx = context();
    let Commands::Generate(args) = command(&[
        "generate",
        "-d",
        "01/21/2025",
        "--batch-size",
        "12",
        "--last-page-fudge",
        "5",
        "--phone-idx",
        "2",
        "--seed",
        "9",
    ]) else {
        panic!("expected generate");
    };

    let config = ctx.generation_config(&args).unwrap();
    assert_eq!(config.batch_size, 12);
    assert_eq!(config.last_page_fudge, 5);
    assert_eq!(config.columns.phone_idx, 2);
    assert_eq!(config.shuffle, ShuffleMode::Seeded(9));
    assert_eq!(config.source_id, SOURCE_ID);
}

#[test]
fn test_fudge_at_batch_size_is_a_config_error() {
    let ctx = context();
    let Commands::Generate(args) = command(&[
        "generate",
        "-d",
        "01/21/2025",
        "--batch-size",
        "3",
        "--last-page-fudge",
        "3",
    ]) else {
        panic!("expected generate");
    };
    assert!(matches!(
        ctx.generation_config(&args),
        Err(ApiError::ConfigError(_))
    ));
}

#[tokio::test]
async fn test_generate_renders_report_and_flags_failures() {
    let ctx = context();
    let service = FakeSheets::with_records(30).failing_write(3);
    let cmd = command(&["generate", "-d", "01/21/2025", "--no-shuffle"]);

    let output = ctx
        .execute_with_service(&cmd, &service, &AssumeYes)
        .await
        .unwrap();

    assert!(output.rendered.contains("2 of 3 spreadsheets"));
    assert!(output.rendered.contains("Retry with: --only-batch 3"));
    assert!(matches!(output.failure, Some(ApiError::BatchesFailed { .. })));
}

#[tokio::test]
async fn test_generate_json_output_parses() {
    let ctx = context();
    let service = FakeSheets::with_records(24);
    let cmd = command(&["generate", "-d", "01/21/2025", "--dry-run", "--format", "json"]);

    let output = ctx
        .execute_with_service(&cmd, &service, &AssumeYes)
        .await
        .unwrap();

    let value: serde_json::Value = serde_json::from_str(&output.rendered).unwrap();
    assert_eq!(value["batch_count"], 3);
    assert_eq!(value["dry_run"], true);
    assert!(output.failure.is_none());
    assert!(service.created_titles().is_empty());
}

#[tokio::test]
async fn test_clean_test_mode_deletes_nothing() {
    let ctx = context();
    let service = FakeSheets::default();
    service.add_document("IC Turnout - 01/21/2025 - Group 1");
    let cmd = command(&["clean", "-d", "01/21/2025", "-t", "--yes"]);

    let output = ctx
        .execute_with_service(&cmd, &service, &AssumeYes)
        .await
        .unwrap();

    assert!(output.rendered.contains("Found 1 match(es)"));
    assert!(output.rendered.contains("Test mode"));
    assert!(service.deleted().is_empty());
}

#[tokio::test]
async fn test_clean_requires_one_selector() {
    let ctx = context();
    let service = FakeSheets::default();
    let cmd = command(&["clean", "--yes"]);

    let result = ctx.execute_with_service(&cmd, &service, &AssumeYes).await;
    assert!(matches!(result, Err(ApiError::ConfigError(_))));
}

#[tokio::test]
async fn test_unknown_format_is_rejected() {
    let ctx = context();
    let service = FakeSheets::with_records(5);
    let cmd = command(&["generate", "-d", "01/21/2025", "--format", "yaml"]);

    let result = ctx.execute_with_service(&cmd, &service, &AssumeYes).await;
    assert!(matches!(result, Err(ApiError::ConfigError(_))));
    assert!(service.created_titles().is_empty());
}

#[tokio::test]
async fn test_clean_without_yes_asks_with_every_match() {
    let ctx = context();
    let service = FakeSheets::default();
    let first = service.add_document("IC Turnout - 01/21/2025 - Group 1");
    let second = service.add_document("IC Turnout - 01/21/2025 - Group 2");
    let refuse = Refuse::default();
    let cmd = command(&["clean", "-d", "01/21/2025"]);

    let output = ctx
        .execute_with_service(&cmd, &service, &refuse)
        .await
        .unwrap();

    let asked = refuse.asked.lock().clone();
    let ids: Vec<&str> = asked.iter().map(|f| f.document_id.as_str()).collect();
    assert_eq!(ids, vec![first.as_str(), second.as_str()]);
    assert_eq!(asked[0].name, "IC Turnout - 01/21/2025 - Group 1");
    assert!(output.rendered.contains("Not deleting."));
    assert!(service.deleted().is_empty());
}
