// エンジン層 - 並行処理とオーケストレーション
// キュー・ワーカープール・停止シグナルを組み合わせて注文パイプラインを構成

pub mod api;
pub mod cancellation;
pub mod consumer;
pub mod counters;
mod pipeline;
pub mod pipeline_engine;
pub mod producer;
pub mod queue;
pub mod stages;

// 公開API - 主要エンジンクラス
pub use api::{
    create_default_pipeline_engine, create_pipeline_engine, create_quiet_pipeline_engine,
    run_until_ctrl_c,
};
pub use cancellation::{CancellationController, ShutdownHandle};
pub use consumer::{DrainPolicy, PoolOutcome, StageHandler, WorkerPool};
pub use counters::PipelineCounters;
pub use pipeline::{OrderPipeline, DELIVERY_QUEUE, INTAKE_QUEUE};
pub use pipeline_engine::PipelineEngine;
pub use producer::{spawn_producer, ProducerSettings};
pub use queue::{BoundedQueue, Dequeued, EnqueueOutcome, QueueSender, QueueState};
pub use stages::{DeliveryHandler, PreparationHandler};
