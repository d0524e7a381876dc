//! End-to-end generation runs against the in-memory sheet service

use super::test_utils::{FakeSheets, SOURCE_ID, TEMPLATE_REGION};
use std::collections::BTreeMap;
use turnout::batch::ShuffleMode;
use turnout::error::{ApiError, WorkflowStep};
use turnout::generation::{run_generate, GenerateRequest, GenerationConfig, GenerationSettings};

const DATE: &str = "01/21/2025";

fn config_with(batch_size: usize, concurrency: usize, shuffle: ShuffleMode) -> GenerationConfig {
    GenerationConfig::from_settings(
        GenerationSettings {
            source_id: SOURCE_ID.to_string(),
            template_region_id: Some(TEMPLATE_REGION),
            batch_size,
            concurrency,
            shuffle,
            ..GenerationSettings::default()
        },
        DATE,
    )
    .unwrap()
}

fn title(group: usize) -> String {
    format!("IC Turnout - {} - Group {}", DATE, group)
}

fn written_lengths(service: &FakeSheets) -> BTreeMap<String, usize> {
    service
        .documents_by_title()
        .into_iter()
        .map(|(title, doc)| (title, doc.written.first().map_or(0, Vec::len)))
        .collect()
}

#[tokio::test]
async fn test_remainder_within_fudge_joins_last_sheet() {
    let service = FakeSheets::with_records(23);
    let config = config_with(10, 4, ShuffleMode::Off);

    let report = run_generate(&service, &config, &GenerateRequest::default())
        .await
        .unwrap();

    assert!(report.is_success());
    assert_eq!(report.total_records, 23);
    assert_eq!(report.succeeded.len(), 2);
    let lengths = written_lengths(&service);
    assert_eq!(lengths.get(&title(1)), Some(&10));
    assert_eq!(lengths.get(&title(2)), Some(&13));
}

#[tokio::test]
async fn test_larger_remainder_gets_its_own_sheet() {
    let service = FakeSheets::with_records(24);
    let config = config_with(10, 4, ShuffleMode::Off);

    let report = run_generate(&service, &config, &GenerateRequest::default())
        .await
        .unwrap();

    assert_eq!(report.batch_count, 3);
    let lengths = written_lengths(&service);
    assert_eq!(
        lengths.values().copied().collect::<Vec<_>>(),
        vec![10, 10, 4]
    );
}

#[tokio::test]
async fn test_each_sheet_gets_its_slice_with_pairs_aligned() {
    let service = FakeSheets::with_records(23);
    let config = config_with(10, 2, ShuffleMode::Off);

    run_generate(&service, &config, &GenerateRequest::default())
        .await
        .unwrap();

    let docs = service.documents_by_title();
    let first = &docs[&title(1)];
    let expected: Vec<String> = (0..10).map(|i| format!("name{}", i)).collect();
    assert_eq!(first.written[0], expected);
    let second = &docs[&title(2)];
    assert_eq!(second.written[0][0], "name10");
    assert_eq!(second.written[1][12], "phone22");

    for doc in docs.values() {
        assert_eq!(doc.regions.len(), 1, "default sheet should be removed");
        assert_eq!(doc.regions[0].title, "Sheet1");
        assert!(doc.regions[0].region_id > 0, "copied template should remain");
    }
}

#[tokio::test]
async fn test_shuffled_run_keeps_every_record_exactly_once() {
    let service = FakeSheets::with_records(57).delayed(3);
    let config = config_with(10, 3, ShuffleMode::System);

    let report = run_generate(&service, &config, &GenerateRequest::default())
        .await
        .unwrap();
    assert!(report.is_success());

    let mut pairs: Vec<(String, String)> = service
        .documents()
        .into_values()
        .flat_map(|doc| {
            doc.written[0]
                .clone()
                .into_iter()
                .zip(doc.written[1].clone())
                .collect::<Vec<_>>()
        })
        .collect();
    pairs.sort();
    let mut expected: Vec<(String, String)> = (0..57)
        .map(|i| (format!("name{}", i), format!("phone{}", i)))
        .collect();
    expected.sort();
    assert_eq!(pairs, expected);
}

#[tokio::test]
async fn test_seeded_shuffle_is_reproducible() {
    let config = config_with(10, 4, ShuffleMode::Seeded(7));

    let first = FakeSheets::with_records(30);
    run_generate(&first, &config, &GenerateRequest::default())
        .await
        .unwrap();
    let second = FakeSheets::with_records(30);
    run_generate(&second, &config, &GenerateRequest::default())
        .await
        .unwrap();

    let written = |service: &FakeSheets| {
        service
            .documents_by_title()
            .into_iter()
            .map(|(title, doc)| (title, doc.written))
            .collect::<Vec<_>>()
    };
    assert_eq!(written(&first), written(&second));
}

#[tokio::test]
async fn test_empty_source_creates_nothing() {
    let service = FakeSheets::with_records(0);
    let config = config_with(10, 4, ShuffleMode::System);

    let report = run_generate(&service, &config, &GenerateRequest::default())
        .await
        .unwrap();

    assert_eq!(report.batch_count, 0);
    assert!(report.planned.is_empty());
    assert!(report.is_success());
    assert!(service.created_titles().is_empty());
}

#[tokio::test]
async fn test_fewer_records_than_batch_size_make_one_sheet() {
    let service = FakeSheets::with_records(2);
    let config = config_with(10, 4, ShuffleMode::Off);

    let report = run_generate(&service, &config, &GenerateRequest::default())
        .await
        .unwrap();

    assert_eq!(report.batch_count, 1);
    assert_eq!(written_lengths(&service).get(&title(1)), Some(&2));
}

#[tokio::test]
async fn test_one_failing_batch_does_not_hide_the_others() {
    let service = FakeSheets::with_records(50).failing_write(2).delayed(2);
    let config = config_with(10, 3, ShuffleMode::System);

    let report = run_generate(&service, &config, &GenerateRequest::default())
        .await
        .unwrap();

    assert_eq!(report.batch_count, 5);
    assert_eq!(report.succeeded.len(), 4);
    assert_eq!(report.failed.len(), 1);
    assert!(report.cancelled.is_empty());
    let failure = &report.failed[0];
    assert_eq!(failure.number(), 2);
    assert_eq!(failure.step, WorkflowStep::WriteRange);
    assert_eq!(report.retry_numbers(), vec![2]);

    let error = report.combined_error().unwrap();
    let message = error.to_string();
    assert!(matches!(error, ApiError::BatchesFailed { .. }));
    assert!(message.contains("1 of 5 batch(es) did not complete"));
    assert!(message.contains(&format!("batch 2 ({})", title(2))));
    assert!(!message.contains("batch 1 ("));
}

#[tokio::test]
async fn test_every_batch_reports_exactly_once_under_random_delays() {
    let service = FakeSheets::with_records(120).delayed(5);
    let config = config_with(10, 3, ShuffleMode::System);

    let report = run_generate(&service, &config, &GenerateRequest::default())
        .await
        .unwrap();

    assert_eq!(report.batch_count, 12);
    assert_eq!(
        report.succeeded.len() + report.failed.len() + report.cancelled.len(),
        12
    );
    let mut indices: Vec<usize> = report.succeeded.iter().map(|s| s.index).collect();
    indices.sort_unstable();
    assert_eq!(indices, (0..12).collect::<Vec<_>>());
    assert!(service.peak_in_flight() <= 3);
    assert_eq!(service.created_titles().len(), 12);
}

#[tokio::test]
async fn test_auth_failure_stops_undispatched_batches() {
    let service = FakeSheets::with_records(50).failing_auth(2);
    let config = config_with(10, 1, ShuffleMode::Off);

    let report = run_generate(&service, &config, &GenerateRequest::default())
        .await
        .unwrap();

    assert_eq!(report.succeeded.len(), 1);
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].fatal);
    assert_eq!(report.cancelled, vec![3, 4, 5]);
    assert_eq!(service.created_titles(), vec![title(1)]);
    assert_eq!(report.retry_numbers(), vec![2, 3, 4, 5]);
}

#[tokio::test]
async fn test_only_selected_batches_are_generated() {
    let service = FakeSheets::with_records(50);
    let config = config_with(10, 4, ShuffleMode::Seeded(3));
    let request = GenerateRequest {
        only_batches: Some(vec![2, 5]),
        dry_run: false,
    };

    let report = run_generate(&service, &config, &request).await.unwrap();

    assert_eq!(report.batch_count, 5);
    let mut created = service.created_titles();
    created.sort();
    assert_eq!(created, vec![title(2), title(5)]);
    assert!(report.is_success());
}

#[tokio::test]
async fn test_unknown_batch_number_is_rejected() {
    let service = FakeSheets::with_records(20);
    let config = config_with(10, 4, ShuffleMode::Off);
    let request = GenerateRequest {
        only_batches: Some(vec![9]),
        dry_run: false,
    };

    let result = run_generate(&service, &config, &request).await;
    assert!(matches!(result, Err(ApiError::ConfigError(_))));
    assert!(service.created_titles().is_empty());
}

#[tokio::test]
async fn test_dry_run_plans_without_creating() {
    let service = FakeSheets::with_records(24);
    let config = config_with(10, 4, ShuffleMode::System);
    let request = GenerateRequest {
        only_batches: None,
        dry_run: true,
    };

    let report = run_generate(&service, &config, &request).await.unwrap();

    assert!(report.dry_run);
    assert_eq!(report.planned.len(), 3);
    assert_eq!(report.planned[2].batch.length, 4);
    assert!(service.created_titles().is_empty());
}

#[tokio::test]
async fn test_wrong_template_fails_every_batch_at_copy() {
    let service = FakeSheets::with_records(20);
    let config = GenerationConfig::from_settings(
        GenerationSettings {
            source_id: SOURCE_ID.to_string(),
            template_region_id: Some(1),
            shuffle: ShuffleMode::Off,
            ..GenerationSettings::default()
        },
        DATE,
    )
    .unwrap();

    let report = run_generate(&service, &config, &GenerateRequest::default())
        .await
        .unwrap();

    assert!(report.succeeded.is_empty());
    assert_eq!(report.failed.len(), 2);
    assert!(report
        .failed
        .iter()
        .all(|f| f.step == WorkflowStep::CopyTemplate));
}

#[tokio::test]
async fn test_unreadable_source_is_an_error() {
    let service = FakeSheets::with_records(20);
    let config = GenerationConfig::from_settings(
        GenerationSettings {
            source_id: "missing".to_string(),
            template_region_id: Some(TEMPLATE_REGION),
            ..GenerationSettings::default()
        },
        DATE,
    )
    .unwrap();

    let result = run_generate(&service, &config, &GenerateRequest::default()).await;
    assert!(matches!(result, Err(ApiError::RemoteNotFound(_))));
}
