// ステージ別ハンドラ - 調理と配達

use super::consumer::StageHandler;
use super::counters::PipelineCounters;
use super::queue::QueueSender;
use crate::core::{duration_to_millis, BatchSummary, Order, PipelineError, PipelineReporter, PipelineResult, Stage};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// 調理ステージ: 固定時間待ってから配達キューへ転送する
pub struct PreparationHandler {
    output: QueueSender<Order>,
    preparation_time: Duration,
    downstream_stopped: CancellationToken,
    counters: Arc<PipelineCounters>,
}

impl PreparationHandler {
    pub fn new(
        output: QueueSender<Order>,
        preparation_time: Duration,
        downstream_stopped: CancellationToken,
        counters: Arc<PipelineCounters>,
    ) -> Self {
        Self {
            output,
            preparation_time,
            downstream_stopped,
            counters,
        }
    }
}

#[async_trait]
impl StageHandler for PreparationHandler {
    async fn handle(&mut self, worker_id: usize, order: Order) -> PipelineResult<Duration> {
        tokio::time::sleep(self.preparation_time).await;
        let order_id = order.id();

        // 転送はキャンセルでは中断しない。配達ワーカーはキューが
        // sealされるまで取り出し続けるので、必ず空きができる。
        // 配達ワーカーが全滅している場合だけ諦める。
        tokio::select! {
            biased;
            sent = self.output.enqueue(order) => sent?,
            _ = self.downstream_stopped.cancelled() => {
                return Err(PipelineError::downstream_stopped(Stage::Delivery));
            }
        }

        self.counters.record_prepared();
        tracing::trace!(worker_id, order_id, "order forwarded to delivery");
        Ok(self.preparation_time)
    }
}

/// 配達ステージ: 注文ごとの配達時間を待ち、batch_sizeごとにサマリーを出す
pub struct DeliveryHandler<R> {
    batch_size: usize,
    batch_count: usize,
    batch_time: Duration,
    reporter: Arc<R>,
    counters: Arc<PipelineCounters>,
}

impl<R> DeliveryHandler<R>
where
    R: PipelineReporter + 'static,
{
    pub fn new(batch_size: usize, reporter: Arc<R>, counters: Arc<PipelineCounters>) -> Self {
        Self {
            batch_size,
            batch_count: 0,
            batch_time: Duration::ZERO,
            reporter,
            counters,
        }
    }
}

#[async_trait]
impl<R> StageHandler for DeliveryHandler<R>
where
    R: PipelineReporter + 'static,
{
    async fn handle(&mut self, worker_id: usize, order: Order) -> PipelineResult<Duration> {
        let delivery_time = order.delivery_time();
        tokio::time::sleep(delivery_time).await;

        self.counters.record_delivered(delivery_time);
        self.batch_count += 1;
        self.batch_time += delivery_time;

        if self.batch_count == self.batch_size {
            let summary = BatchSummary {
                worker_id,
                count: self.batch_count,
                total_ms: duration_to_millis(self.batch_time),
            };
            self.reporter.report_batch_summary(&summary).await;
            self.batch_count = 0;
            self.batch_time = Duration::ZERO;
        }

        Ok(delivery_time)
    }
}
