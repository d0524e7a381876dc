//! Cleanup runs against the in-memory sheet service

use super::test_utils::FakeSheets;
use parking_lot::Mutex;
use turnout::clean::{run_clean, AssumeYes, CleanOutcome, CleanRequest, CleanSelector, Confirmer};
use turnout::error::ApiError;
use turnout::remote::DriveFile;

/// Records what it was asked to approve, then declines.
#[derive(Default)]
struct Decline {
    shown: Mutex<Option<Vec<DriveFile>>>,
}

impl Confirmer for Decline {
    fn confirm(&self, matches: &[DriveFile]) -> Result<bool, ApiError> {
        *self.shown.lock() = Some(matches.to_vec());
        Ok(false)
    }
}

fn by_date(date: &str) -> CleanSelector {
    CleanSelector::DatePrefix {
        title_prefix: "IC Turnout".to_string(),
        date: date.to_string(),
    }
}

fn seeded() -> (FakeSheets, Vec<String>) {
    let service = FakeSheets::default();
    let ids = (1..=3)
        .map(|g| service.add_document(&format!("IC Turnout - 01/21/2025 - Group {}", g)))
        .collect();
    service.add_document("IC Turnout - 01/28/2025 - Group 1");
    service.add_document("Copy of IC Turnout - 01/21/2025 - Group 1");
    (service, ids)
}

#[tokio::test]
async fn test_date_selector_deletes_only_that_run() {
    let (service, mut ids) = seeded();
    let request = CleanRequest {
        selector: by_date("01/21/2025"),
        dry_run: false,
        concurrency: 2,
    };

    let report = run_clean(&service, &request, &AssumeYes).await.unwrap();

    assert_eq!(report.outcome, CleanOutcome::Deleted);
    assert_eq!(report.matched.len(), 3);
    assert!(report.is_success());
    let mut deleted = service.deleted();
    deleted.sort();
    ids.sort();
    assert_eq!(deleted, ids);
    assert_eq!(service.documents().len(), 2);
    assert_eq!(
        service.queries(),
        vec!["name contains 'IC Turnout - 01/21/2025'".to_string()]
    );
}

#[tokio::test]
async fn test_dry_run_lists_without_deleting() {
    let (service, _) = seeded();
    let request = CleanRequest {
        selector: by_date("01/21/2025"),
        dry_run: true,
        concurrency: 2,
    };

    let report = run_clean(&service, &request, &AssumeYes).await.unwrap();

    assert_eq!(report.outcome, CleanOutcome::DryRun);
    assert_eq!(report.matched.len(), 3);
    assert!(service.deleted().is_empty());
}

#[tokio::test]
async fn test_declined_confirmation_deletes_nothing() {
    let (service, _) = seeded();
    let confirmer = Decline::default();
    let request = CleanRequest {
        selector: CleanSelector::NameContains("Group 1".to_string()),
        dry_run: false,
        concurrency: 2,
    };

    let report = run_clean(&service, &request, &confirmer).await.unwrap();

    assert_eq!(report.outcome, CleanOutcome::Declined);
    assert_eq!(confirmer.shown.lock().as_ref().map(Vec::len), Some(3));
    assert!(service.deleted().is_empty());
}

#[tokio::test]
async fn test_nothing_matched_skips_confirmation() {
    let (service, _) = seeded();
    let confirmer = Decline::default();
    let request = CleanRequest {
        selector: by_date("02/01/2025"),
        dry_run: false,
        concurrency: 2,
    };

    let report = run_clean(&service, &request, &confirmer).await.unwrap();

    assert_eq!(report.outcome, CleanOutcome::NothingMatched);
    assert!(confirmer.shown.lock().is_none());
    assert!(report.combined_error().is_none());
}

#[tokio::test]
async fn test_failed_deletions_are_aggregated() {
    let (service, ids) = seeded();
    let service = service.failing_delete(&ids[1]).delayed(2);
    let request = CleanRequest {
        selector: by_date("01/21/2025"),
        dry_run: false,
        concurrency: 3,
    };

    let report = run_clean(&service, &request, &AssumeYes).await.unwrap();

    assert_eq!(report.deleted.len(), 2);
    assert_eq!(report.failed.len(), 1);
    let error = report.combined_error().unwrap();
    let message = error.to_string();
    assert!(matches!(error, ApiError::DeletionsFailed { .. }));
    assert!(message.contains("1 of 3 deletion(s) did not complete"));
    assert!(message.contains("deleting IC Turnout - 01/21/2025 - Group 2 failed"));
}

#[tokio::test]
async fn test_zero_concurrency_is_rejected() {
    let (service, _) = seeded();
    let request = CleanRequest {
        selector: by_date("01/21/2025"),
        dry_run: false,
        concurrency: 0,
    };

    let result = run_clean(&service, &request, &AssumeYes).await;
    assert!(matches!(result, Err(ApiError::ConfigError(_))));
    assert!(service.deleted().is_empty());
}

#[tokio::test]
async fn test_confirmation_sees_every_name_and_id() {
    let (service, ids) = seeded();
    let confirmer = Decline::default();
    let request = CleanRequest {
        selector: by_date("01/21/2025"),
        dry_run: false,
        concurrency: 2,
    };

    run_clean(&service, &request, &confirmer).await.unwrap();

    let shown = confirmer.shown.lock().clone().unwrap();
    let mut shown_ids: Vec<String> = shown.iter().map(|f| f.document_id.clone()).collect();
    shown_ids.sort();
    let mut expected = ids;
    expected.sort();
    assert_eq!(shown_ids, expected);
    for file in &shown {
        let title = &service.documents()[&file.document_id].title;
        assert_eq!(&file.name, title);
    }
}
