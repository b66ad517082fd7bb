// エラーハンドリングの統合テスト
use crate::fixtures::{
    instant_config, instant_factory, PanickingOrderFactory, PanickingReporter,
};
use anyhow::Result;
use pizza_delivery::{
    core::{ErrorSeverity, PipelineError},
    engine::PipelineEngine,
    DefaultPipelineConfig, RecordingPipelineReporter, Stage,
};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test(start_paused = true)]
async fn test_producer_panic_is_reported_and_shutdown_completes() {
    let reporter = RecordingPipelineReporter::new();
    let engine = PipelineEngine::new(
        instant_config(),
        reporter.clone(),
        PanickingOrderFactory::new(instant_factory(), 3),
    );

    let summary = engine.run().await.unwrap();

    assert_eq!(summary.orders_produced, 2);
    assert_eq!(summary.orders_delivered, 2);
    assert!(summary.is_balanced());

    assert_eq!(summary.failed_workers.len(), 1);
    let failure = &summary.failed_workers[0];
    assert_eq!(failure.stage, Stage::Intake);
    assert!(failure.message.contains("oven exploded on order 3"));
    assert_eq!(reporter.failure_count(), 1);
    assert!(reporter.all_stops_precede_queue_close());
}

#[tokio::test(start_paused = true)]
async fn test_delivery_panic_does_not_hang_upstream() {
    let recorder = RecordingPipelineReporter::new();
    let reporter = PanickingReporter::new(recorder.clone(), Stage::Delivery, 2);
    let config = instant_config().with_order_limit(Some(5));
    let engine = PipelineEngine::new(config, reporter, instant_factory());

    let summary = engine.run().await.unwrap();

    assert_eq!(summary.orders_produced, 5);
    assert_eq!(summary.orders_delivered, 1);
    assert!(summary.orders_lost >= 1);
    assert_eq!(
        summary.orders_produced,
        summary.orders_delivered + summary.orders_discarded + summary.orders_lost
    );

    let delivery_failure = summary
        .failed_workers
        .iter()
        .find(|f| f.stage == Stage::Delivery)
        .expect("delivery worker failure should be recorded");
    assert!(delivery_failure.message.contains("panicked"));
    assert!(delivery_failure.message.contains("driver crashed on order 2"));

    // 配達員がいなくなった後、配達キューが満杯の調理ワーカーは待ち続けずに諦める
    let preparation_failure = summary
        .failed_workers
        .iter()
        .find(|f| f.stage == Stage::Preparation)
        .expect("preparation worker should give up");
    assert!(preparation_failure.message.contains("下流ステージが停止しています"));

    assert!(recorder.all_stops_precede_queue_close());
}

#[tokio::test]
async fn test_invalid_configuration_starts_nothing() {
    let reporter = RecordingPipelineReporter::new();
    let config = DefaultPipelineConfig::default().with_preparation_workers(0);
    let engine = PipelineEngine::new(config, reporter.clone(), instant_factory());

    let error = engine.run().await.unwrap_err();

    assert!(matches!(error, PipelineError::ConfigurationError { .. }));
    assert_eq!(error.severity(), ErrorSeverity::High);
    assert!(!error.is_recoverable());
    assert!(reporter.events().is_empty());
}

#[tokio::test]
async fn test_inverted_delivery_range_rejected() {
    let config = DefaultPipelineConfig::default()
        .with_delivery_time_range(Duration::from_secs(3), Duration::from_secs(1));
    let engine = PipelineEngine::new(config, RecordingPipelineReporter::new(), instant_factory());

    let error = engine.run().await.unwrap_err();
    assert!(error.to_string().contains("配達時間の範囲が不正です"));
}

#[test]
fn test_config_file_errors() -> Result<()> {
    let temp_dir = TempDir::new()?;

    let wrong_type = temp_dir.path().join("wrong_type.json");
    fs::write(&wrong_type, r#"{ "preparation_workers": "three" }"#)?;
    let error = DefaultPipelineConfig::from_json_file(&wrong_type).unwrap_err();
    assert!(matches!(error, PipelineError::ConfigFileError { .. }));
    assert!(error.to_string().contains("wrong_type.json"));

    let missing = temp_dir.path().join("missing.json");
    let error = DefaultPipelineConfig::from_json_file(&missing).unwrap_err();
    assert!(matches!(error, PipelineError::ConfigFileError { .. }));
    Ok(())
}
