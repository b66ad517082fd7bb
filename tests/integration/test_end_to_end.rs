// パイプライン全体の統合テスト
use crate::fixtures::{instant_config, instant_factory, varied_factory};
use pizza_delivery::{
    engine::PipelineEngine, services::PipelineEvent, PipelineConfig, RecordingPipelineReporter,
    Stage,
};
use std::collections::HashSet;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_three_orders_through_single_workers() {
    let reporter = RecordingPipelineReporter::new();
    let config = instant_config().with_order_limit(Some(3));
    let engine = PipelineEngine::new(config, reporter.clone(), instant_factory());

    let summary = engine.run().await.unwrap();

    assert_eq!(summary.orders_produced, 3);
    assert_eq!(summary.orders_delivered, 3);
    assert_eq!(summary.orders_discarded, 0);
    assert_eq!(reporter.batch_summaries().len(), 1);
    assert_eq!(reporter.batch_summaries()[0].count, 3);
}

#[tokio::test(start_paused = true)]
async fn test_run_duration_covering_three_ticks() {
    let reporter = RecordingPipelineReporter::new();
    // 10ms間隔の注文は 10, 20, 30ms に発生し、35ms で停止する
    let config = instant_config().with_run_duration(Some(Duration::from_millis(35)));
    assert_eq!(config.order_limit(), None);
    let engine = PipelineEngine::new(config, reporter.clone(), instant_factory());

    let summary = engine.run().await.unwrap();

    assert_eq!(summary.orders_produced, 3);
    assert_eq!(summary.orders_delivered, 3);
    assert_eq!(summary.orders_discarded, 0);
    assert_eq!(reporter.placed_ids(), vec![1, 2, 3]);
    assert_eq!(reporter.batch_summaries().len(), 1);
    assert_eq!(reporter.batch_summaries()[0].count, 3);
}

#[tokio::test(start_paused = true)]
async fn test_every_order_delivered_exactly_once() {
    let reporter = RecordingPipelineReporter::new();
    let config = instant_config()
        .with_preparation_workers(3)
        .with_delivery_workers(4)
        .with_queue_capacity(5)
        .with_preparation_time(Duration::from_millis(30))
        .with_order_limit(Some(50))
        .with_run_duration(Some(Duration::from_secs(5)));
    let engine = PipelineEngine::new(config, reporter.clone(), varied_factory());

    let summary = engine.run().await.unwrap();

    assert_eq!(summary.orders_produced, 50);
    assert_eq!(summary.orders_delivered, 50);
    assert!(summary.is_balanced());
    assert_eq!(summary.orders_lost, 0);

    let delivered = reporter.accepted_ids(Stage::Delivery);
    let unique: HashSet<u64> = delivered.iter().copied().collect();
    assert_eq!(delivered.len(), 50);
    assert_eq!(unique, (1..=50).collect::<HashSet<u64>>());

    // 配達時間の合計は注文列から決まる: 10周 × (0+10+20+30+40)ms
    assert_eq!(summary.total_delivery_time_ms, 1000);
    assert!((summary.average_delivery_time_ms - 20.0).abs() < f64::EPSILON);
}

#[tokio::test(start_paused = true)]
async fn test_single_worker_stages_preserve_fifo_order() {
    let reporter = RecordingPipelineReporter::new();
    let config = instant_config()
        .with_queue_capacity(4)
        .with_preparation_time(Duration::from_millis(25))
        .with_order_limit(Some(12))
        .with_run_duration(Some(Duration::from_secs(2)));
    let engine = PipelineEngine::new(config, reporter.clone(), varied_factory());

    let summary = engine.run().await.unwrap();
    let expected: Vec<u64> = (1..=summary.orders_produced as u64).collect();

    assert_eq!(summary.orders_produced, 12);
    assert_eq!(reporter.placed_ids(), expected);
    assert_eq!(reporter.accepted_ids(Stage::Preparation), expected);
    assert_eq!(reporter.accepted_ids(Stage::Delivery), expected);
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_drains_prepared_orders() {
    let reporter = RecordingPipelineReporter::new();
    let config = instant_config()
        .with_preparation_workers(2)
        .with_delivery_workers(2)
        .with_queue_capacity(10)
        .with_preparation_time(Duration::from_millis(100))
        .with_run_duration(Some(Duration::from_millis(500)));
    let engine = PipelineEngine::new(config, reporter.clone(), varied_factory());

    let summary = engine.run().await.unwrap();

    // 調理を終えた注文は全て配達される。受付キューの残りだけが破棄になる
    assert!(summary.orders_prepared > 0);
    assert_eq!(summary.orders_prepared, summary.orders_delivered);
    assert!(summary.orders_discarded > 0);
    assert!(summary.is_balanced());

    let closed = reporter.closed_queues();
    assert_eq!(closed[1], ("delivery".to_string(), 0));
}

#[tokio::test(start_paused = true)]
async fn test_worker_reports_cover_all_workers() {
    let reporter = RecordingPipelineReporter::new();
    let config = instant_config()
        .with_preparation_workers(3)
        .with_delivery_workers(4)
        .with_order_limit(Some(6));
    let engine = PipelineEngine::new(config, reporter.clone(), instant_factory());

    let summary = engine.run().await.unwrap();

    let preparation: Vec<_> = summary
        .workers
        .iter()
        .filter(|w| w.stage == Stage::Preparation)
        .collect();
    let delivery: Vec<_> = summary
        .workers
        .iter()
        .filter(|w| w.stage == Stage::Delivery)
        .collect();

    assert_eq!(preparation.len(), 3);
    assert_eq!(delivery.len(), 4);
    assert_eq!(preparation.iter().map(|w| w.processed).sum::<usize>(), 6);
    assert_eq!(delivery.iter().map(|w| w.processed).sum::<usize>(), 6);

    let started = reporter.count_of(|e| matches!(e, PipelineEvent::WorkerStarted { .. }));
    assert_eq!(started, 7);
}

#[tokio::test(start_paused = true)]
async fn test_batch_summaries_follow_batch_size() {
    let reporter = RecordingPipelineReporter::new();
    let config = instant_config().with_batch_size(2).with_order_limit(Some(7));
    let engine = PipelineEngine::new(config, reporter.clone(), varied_factory());
    assert_eq!(engine.config().batch_size(), 2);

    let summary = engine.run().await.unwrap();

    // 1人の配達員が7件を配達 → 2件ごとに3回、端数1件はサマリーなし
    assert_eq!(summary.orders_delivered, 7);
    let batches = reporter.batch_summaries();
    assert_eq!(batches.len(), 3);
    assert!(batches.iter().all(|b| b.count == 2 && b.worker_id == 0));
}
