// イベント記録用の報告実装
// テストでイベント順序や件数を検証するために使う

use crate::core::{
    BatchSummary, Order, PipelineReporter, PipelineSummary, ProducerReport, Stage, WorkerReport,
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};

/// 記録されたライフサイクルイベント
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    WorkerStarted { stage: Stage, worker_id: usize },
    OrderPlaced { order_id: u64 },
    OrderAccepted { stage: Stage, worker_id: usize, order_id: u64 },
    BatchSummary(BatchSummary),
    WorkerStopped(WorkerReport),
    WorkerFailed { stage: Stage, worker_id: usize, error: String },
    ProducerStopped(ProducerReport),
    CancellationRaised,
    QueueClosed { queue: String, discarded: usize },
    ShutdownComplete(PipelineSummary),
}

/// 全イベントを到着順に記録する
///
/// クローンは同じ記録を共有するので、エンジンへ渡した後も検証に使える。
#[derive(Debug, Default, Clone)]
pub struct RecordingPipelineReporter {
    events: Arc<Mutex<Vec<PipelineEvent>>>,
}

impl RecordingPipelineReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: PipelineEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    /// 記録済みイベントのスナップショット
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn batch_summaries(&self) -> Vec<BatchSummary> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                PipelineEvent::BatchSummary(summary) => Some(summary),
                _ => None,
            })
            .collect()
    }

    pub fn failure_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, PipelineEvent::WorkerFailed { .. }))
            .count()
    }

    pub fn placed_ids(&self) -> Vec<u64> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                PipelineEvent::OrderPlaced { order_id } => Some(order_id),
                _ => None,
            })
            .collect()
    }

    /// 指定ステージで受け取られた注文IDを到着順に返す
    pub fn accepted_ids(&self, stage: Stage) -> Vec<u64> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                PipelineEvent::OrderAccepted {
                    stage: accepted_stage,
                    order_id,
                    ..
                } if accepted_stage == stage => Some(order_id),
                _ => None,
            })
            .collect()
    }

    pub fn closed_queues(&self) -> Vec<(String, usize)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                PipelineEvent::QueueClosed { queue, discarded } => Some((queue, discarded)),
                _ => None,
            })
            .collect()
    }

    /// Producerと全ワーカーの終了イベントが、最初のキューcloseより前にあるか
    pub fn all_stops_precede_queue_close(&self) -> bool {
        let events = self.events();
        let first_close = events
            .iter()
            .position(|event| matches!(event, PipelineEvent::QueueClosed { .. }));
        let last_stop = events.iter().rposition(|event| {
            matches!(
                event,
                PipelineEvent::WorkerStopped(_)
                    | PipelineEvent::WorkerFailed { .. }
                    | PipelineEvent::ProducerStopped(_)
            )
        });

        match (last_stop, first_close) {
            (Some(stop), Some(close)) => stop < close,
            (None, _) => true,
            (Some(_), None) => false,
        }
    }

    pub fn count_of(&self, predicate: impl Fn(&PipelineEvent) -> bool) -> usize {
        self.events().iter().filter(|event| predicate(event)).count()
    }
}

#[async_trait]
impl PipelineReporter for RecordingPipelineReporter {
    async fn report_worker_started(&self, stage: Stage, worker_id: usize) {
        self.push(PipelineEvent::WorkerStarted { stage, worker_id });
    }

    async fn report_order_placed(&self, order: &Order) {
        self.push(PipelineEvent::OrderPlaced {
            order_id: order.id(),
        });
    }

    async fn report_order_accepted(&self, stage: Stage, worker_id: usize, order: &Order) {
        self.push(PipelineEvent::OrderAccepted {
            stage,
            worker_id,
            order_id: order.id(),
        });
    }

    async fn report_batch_summary(&self, summary: &BatchSummary) {
        self.push(PipelineEvent::BatchSummary(*summary));
    }

    async fn report_worker_stopped(&self, report: &WorkerReport) {
        self.push(PipelineEvent::WorkerStopped(report.clone()));
    }

    async fn report_worker_failed(&self, stage: Stage, worker_id: usize, error: &str) {
        self.push(PipelineEvent::WorkerFailed {
            stage,
            worker_id,
            error: error.to_string(),
        });
    }

    async fn report_producer_stopped(&self, report: &ProducerReport) {
        self.push(PipelineEvent::ProducerStopped(*report));
    }

    async fn report_cancellation_raised(&self) {
        self.push(PipelineEvent::CancellationRaised);
    }

    async fn report_queue_closed(&self, queue: &str, discarded: usize) {
        self.push(PipelineEvent::QueueClosed {
            queue: queue.to_string(),
            discarded,
        });
    }

    async fn report_shutdown_complete(&self, summary: &PipelineSummary) {
        self.push(PipelineEvent::ShutdownComplete(summary.clone()));
    }
}
