// Producer - 一定間隔で注文を生成して受付キューへ投入

use super::cancellation::CancellationController;
use super::counters::PipelineCounters;
use super::queue::{EnqueueOutcome, QueueSender};
use crate::core::{Order, OrderFactory, PipelineReporter, PipelineResult, ProducerReport};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Producerの起動パラメータ
pub struct ProducerSettings {
    pub tick_interval: Duration,
    pub order_limit: Option<usize>,
}

/// Producer: tickごとに「注文を1件投入する」か「終了する」かのどちらか一方を選ぶ
///
/// 満杯のキューで待っている間もキャンセルを観測し、その注文は投入せずに終了する。
pub fn spawn_producer<F, R>(
    intake: QueueSender<Order>,
    factory: Arc<F>,
    reporter: Arc<R>,
    counters: Arc<PipelineCounters>,
    cancellation: CancellationController,
    settings: ProducerSettings,
) -> tokio::task::JoinHandle<PipelineResult<ProducerReport>>
where
    F: OrderFactory + 'static,
    R: PipelineReporter + 'static,
{
    tokio::spawn(async move {
        let period = settings.tick_interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut report = ProducerReport::default();
        let mut next_id = 1u64;

        loop {
            if settings
                .order_limit
                .is_some_and(|limit| report.produced >= limit)
            {
                tracing::debug!(produced = report.produced, "order limit reached");
                break;
            }

            tokio::select! {
                biased;
                _ = cancellation.cancelled() => break,
                _ = ticker.tick() => {
                    let order = factory.create_order(next_id);
                    next_id += 1;
                    reporter.report_order_placed(&order).await;

                    match intake.enqueue_until(order, &cancellation).await? {
                        EnqueueOutcome::Enqueued => {
                            report.produced += 1;
                            counters.record_produced();
                        }
                        EnqueueOutcome::Cancelled(order) => {
                            tracing::debug!(order_id = order.id(), "order dropped by cancellation");
                            break;
                        }
                    }
                }
            }
        }

        // 送信ハンドルを返却してから完了を報告
        drop(intake);
        reporter.report_producer_stopped(&report).await;
        Ok(report)
    })
}
