// 障害注入用の実装

use async_trait::async_trait;
use pizza_delivery::core::{
    BatchSummary, Order, OrderFactory, PipelineReporter, PipelineSummary, ProducerReport, Stage,
    WorkerReport,
};
use pizza_delivery::{RecordingPipelineReporter, ScriptedOrderFactory};

/// 指定IDの注文を作ろうとするとパニックする
pub struct PanickingOrderFactory {
    inner: ScriptedOrderFactory,
    panic_on: u64,
}

impl PanickingOrderFactory {
    pub fn new(inner: ScriptedOrderFactory, panic_on: u64) -> Self {
        Self { inner, panic_on }
    }
}

impl OrderFactory for PanickingOrderFactory {
    fn create_order(&self, id: u64) -> Order {
        if id == self.panic_on {
            panic!("oven exploded on order {id}");
        }
        self.inner.create_order(id)
    }
}

/// 指定ステージで指定IDの注文を受け取ったワーカーをパニックさせる
///
/// それ以外のイベントは記録用レポーターへ流す。
#[derive(Clone)]
pub struct PanickingReporter {
    pub recorder: RecordingPipelineReporter,
    stage: Stage,
    order_id: u64,
}

impl PanickingReporter {
    pub fn new(recorder: RecordingPipelineReporter, stage: Stage, order_id: u64) -> Self {
        Self {
            recorder,
            stage,
            order_id,
        }
    }
}

#[async_trait]
impl PipelineReporter for PanickingReporter {
    async fn report_worker_started(&self, stage: Stage, worker_id: usize) {
        self.recorder.report_worker_started(stage, worker_id).await
    }

    async fn report_order_placed(&self, order: &Order) {
        self.recorder.report_order_placed(order).await
    }

    async fn report_order_accepted(&self, stage: Stage, worker_id: usize, order: &Order) {
        self.recorder
            .report_order_accepted(stage, worker_id, order)
            .await;
        if stage == self.stage && order.id() == self.order_id {
            panic!("driver crashed on order {}", order.id());
        }
    }

    async fn report_batch_summary(&self, summary: &BatchSummary) {
        self.recorder.report_batch_summary(summary).await
    }

    async fn report_worker_stopped(&self, report: &WorkerReport) {
        self.recorder.report_worker_stopped(report).await
    }

    async fn report_worker_failed(&self, stage: Stage, worker_id: usize, error: &str) {
        self.recorder
            .report_worker_failed(stage, worker_id, error)
            .await
    }

    async fn report_producer_stopped(&self, report: &ProducerReport) {
        self.recorder.report_producer_stopped(report).await
    }

    async fn report_cancellation_raised(&self) {
        self.recorder.report_cancellation_raised().await
    }

    async fn report_queue_closed(&self, queue: &str, discarded: usize) {
        self.recorder.report_queue_closed(queue, discarded).await
    }

    async fn report_shutdown_complete(&self, summary: &PipelineSummary) {
        self.recorder.report_shutdown_complete(summary).await
    }
}
