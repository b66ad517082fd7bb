// 進行状況監視の具象実装

use crate::core::{
    BatchSummary, Order, PipelineReporter, PipelineSummary, ProducerReport, Stage, WorkerReport,
};
use async_trait::async_trait;

/// tracingへイベントを流す報告実装
///
/// 出力先とフォーマットは `tracing_subscriber` 側で決まる。
/// 注文単位のイベントはdebug、ライフサイクルはinfoで出す。
#[derive(Debug, Default, Clone)]
pub struct TracingPipelineReporter;

impl TracingPipelineReporter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PipelineReporter for TracingPipelineReporter {
    async fn report_worker_started(&self, stage: Stage, worker_id: usize) {
        tracing::info!(%stage, worker_id, "Worker #{worker_id} is ready ({stage})");
    }

    async fn report_order_placed(&self, order: &Order) {
        tracing::debug!(
            order_id = order.id(),
            kind = %order.kind(),
            "Order #{} placed: {} pizza",
            order.id(),
            order.kind()
        );
    }

    async fn report_order_accepted(&self, stage: Stage, worker_id: usize, order: &Order) {
        match stage {
            Stage::Delivery => tracing::info!(
                worker_id,
                order_id = order.id(),
                "Driver #{worker_id} is delivering a {} pizza",
                order.kind()
            ),
            _ => tracing::info!(
                worker_id,
                order_id = order.id(),
                "Cook #{worker_id} is preparing a {} pizza",
                order.kind()
            ),
        }
    }

    async fn report_batch_summary(&self, summary: &BatchSummary) {
        tracing::info!(
            worker_id = summary.worker_id,
            count = summary.count,
            total_ms = summary.total_ms,
            "Driver #{} delivered {} pizzas in {}ms",
            summary.worker_id,
            summary.count,
            summary.total_ms
        );
    }

    async fn report_worker_stopped(&self, report: &WorkerReport) {
        tracing::info!(
            stage = %report.stage,
            worker_id = report.worker_id,
            processed = report.processed,
            busy_ms = report.busy_ms,
            "worker stopped"
        );
    }

    async fn report_worker_failed(&self, stage: Stage, worker_id: usize, error: &str) {
        tracing::error!(%stage, worker_id, error, "worker failed");
    }

    async fn report_producer_stopped(&self, report: &ProducerReport) {
        tracing::info!(produced = report.produced, "producer stopped");
    }

    async fn report_cancellation_raised(&self) {
        tracing::info!("Restaurant is closing");
    }

    async fn report_queue_closed(&self, queue: &str, discarded: usize) {
        if discarded > 0 {
            tracing::warn!(queue, discarded, "queue closed with pending orders");
        } else {
            tracing::debug!(queue, "queue closed");
        }
    }

    async fn report_shutdown_complete(&self, summary: &PipelineSummary) {
        tracing::info!(
            produced = summary.orders_produced,
            delivered = summary.orders_delivered,
            discarded = summary.orders_discarded,
            "All done!"
        );
    }
}

/// 何もしない報告実装（テスト・ベンチマーク用）
#[derive(Debug, Default, Clone)]
pub struct NoOpPipelineReporter;

impl NoOpPipelineReporter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PipelineReporter for NoOpPipelineReporter {
    async fn report_worker_started(&self, _stage: Stage, _worker_id: usize) {
        // 何もしない
    }

    async fn report_order_placed(&self, _order: &Order) {
        // 何もしない
    }

    async fn report_order_accepted(&self, _stage: Stage, _worker_id: usize, _order: &Order) {
        // 何もしない
    }

    async fn report_batch_summary(&self, _summary: &BatchSummary) {
        // 何もしない
    }

    async fn report_worker_stopped(&self, _report: &WorkerReport) {
        // 何もしない
    }

    async fn report_worker_failed(&self, _stage: Stage, _worker_id: usize, _error: &str) {
        // 何もしない
    }

    async fn report_producer_stopped(&self, _report: &ProducerReport) {
        // 何もしない
    }

    async fn report_cancellation_raised(&self) {
        // 何もしない
    }

    async fn report_queue_closed(&self, _queue: &str, _discarded: usize) {
        // 何もしない
    }

    async fn report_shutdown_complete(&self, _summary: &PipelineSummary) {
        // 何もしない
    }
}
