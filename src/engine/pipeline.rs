// Pipeline - Producer → 調理プール → 配達プール のオーケストレーション
// 起動、停止シグナル、順序付きシャットダウン、統計集計を担当

use super::cancellation::CancellationController;
use super::consumer::{DrainPolicy, PoolOutcome, WorkerPool};
use super::counters::PipelineCounters;
use super::producer::{spawn_producer, ProducerSettings};
use super::queue::BoundedQueue;
use super::stages::{DeliveryHandler, PreparationHandler};
use crate::core::{
    duration_to_millis, Order, OrderFactory, PipelineConfig, PipelineError, PipelineReporter,
    PipelineResult, PipelineSummary, ProducerReport, Stage, WorkerFailure,
};
use std::sync::Arc;
use std::time::Instant;

pub const INTAKE_QUEUE: &str = "intake";
pub const DELIVERY_QUEUE: &str = "delivery";

/// 注文パイプライン
pub struct OrderPipeline<F, R> {
    factory: Arc<F>,
    reporter: Arc<R>,
}

impl<F, R> OrderPipeline<F, R>
where
    F: OrderFactory + 'static,
    R: PipelineReporter + 'static,
{
    pub fn new(factory: Arc<F>, reporter: Arc<R>) -> Self {
        Self { factory, reporter }
    }

    /// パイプラインを1回実行する
    ///
    /// シャットダウン順序:
    /// 1. 停止シグナル発火
    /// 2. Producer join → intake seal
    /// 3. 調理ワーカー join → delivery seal
    /// 4. 配達ワーカー join（残りを配達し切る）
    /// 5. intake close → delivery close
    pub async fn execute<C>(
        &self,
        config: &C,
        cancellation: CancellationController,
    ) -> PipelineResult<PipelineSummary>
    where
        C: PipelineConfig + ?Sized,
    {
        let start_time = Instant::now();
        let counters = Arc::new(PipelineCounters::new());

        let intake = Arc::new(BoundedQueue::<Order>::new(
            INTAKE_QUEUE,
            config.intake_capacity(),
        )?);
        let delivery = Arc::new(BoundedQueue::<Order>::new(
            DELIVERY_QUEUE,
            config.delivery_capacity(),
        )?);

        // 下流から起動する
        let delivery_pool = WorkerPool::spawn(
            Stage::Delivery,
            config.delivery_workers(),
            Arc::clone(&delivery),
            cancellation.clone(),
            DrainPolicy::DrainUntilExhausted,
            Arc::clone(&self.reporter),
            |_| {
                DeliveryHandler::new(
                    config.batch_size(),
                    Arc::clone(&self.reporter),
                    Arc::clone(&counters),
                )
            },
        );

        let forward = delivery.sender()?;
        let downstream_stopped = delivery_pool.stopped_token();
        let preparation_pool = WorkerPool::spawn(
            Stage::Preparation,
            config.preparation_workers(),
            Arc::clone(&intake),
            cancellation.clone(),
            DrainPolicy::StopOnCancel,
            Arc::clone(&self.reporter),
            |_| {
                PreparationHandler::new(
                    forward.clone(),
                    config.preparation_time(),
                    downstream_stopped.clone(),
                    Arc::clone(&counters),
                )
            },
        );
        // 送信ハンドルは調理ワーカーだけが持つ
        drop(forward);

        let producer = spawn_producer(
            intake.sender()?,
            Arc::clone(&self.factory),
            Arc::clone(&self.reporter),
            Arc::clone(&counters),
            cancellation.clone(),
            ProducerSettings {
                tick_interval: config.tick_interval(),
                order_limit: config.order_limit(),
            },
        );

        tracing::info!(
            preparation_workers = config.preparation_workers(),
            delivery_workers = config.delivery_workers(),
            "pipeline started"
        );

        match config.run_duration() {
            Some(run_duration) => {
                tokio::select! {
                    _ = tokio::time::sleep(run_duration) => {}
                    _ = cancellation.cancelled() => {}
                }
            }
            None => cancellation.cancelled().await,
        }

        cancellation.raise();
        tracing::info!("cancellation raised, shutting down");
        self.reporter.report_cancellation_raised().await;

        let mut failures: Vec<WorkerFailure> = Vec::new();
        let mut violation: Option<PipelineError> = None;

        // Producer
        let producer_report = match producer.await {
            Ok(Ok(report)) => report,
            Ok(Err(error)) => {
                let message = error.to_string();
                if error.is_contract_violation() {
                    violation.get_or_insert(error);
                }
                self.record_producer_failure(&mut failures, message).await;
                ProducerReport::default()
            }
            Err(join_error) => {
                let message = PipelineError::task(join_error).to_string();
                self.record_producer_failure(&mut failures, message).await;
                ProducerReport::default()
            }
        };
        intake.seal();
        tracing::debug!(produced = producer_report.produced, "producer joined");

        // 調理ワーカー
        let preparation = preparation_pool.join(self.reporter.as_ref()).await;
        delivery.seal();
        tracing::debug!("preparation workers joined");

        // 配達ワーカー
        let deliveries = delivery_pool.join(self.reporter.as_ref()).await;
        tracing::debug!("delivery workers joined");

        let mut workers = Vec::new();
        for outcome in [preparation, deliveries] {
            let PoolOutcome {
                reports,
                failures: pool_failures,
                violation: pool_violation,
            } = outcome;
            workers.extend(reports);
            failures.extend(pool_failures);
            if let Some(error) = pool_violation {
                violation.get_or_insert(error);
            }
        }

        // 全てのjoinが終わってからキューを閉じる
        let mut discarded = 0;
        for queue in [&intake, &delivery] {
            match queue.close() {
                Ok(count) => {
                    tracing::debug!(queue = queue.name(), discarded = count, "queue closed");
                    self.reporter.report_queue_closed(queue.name(), count).await;
                    discarded += count;
                }
                Err(error) => {
                    tracing::error!(queue = queue.name(), error = %error, "failed to close queue");
                    violation.get_or_insert(error);
                }
            }
        }

        let delivered = counters.delivered();
        let total_delivery_time_ms = counters.delivery_time_ms();
        let summary = PipelineSummary {
            orders_produced: counters.produced(),
            orders_prepared: counters.prepared(),
            orders_delivered: delivered,
            orders_discarded: discarded,
            orders_lost: counters
                .produced()
                .saturating_sub(delivered + discarded),
            failed_workers: failures,
            total_delivery_time_ms,
            average_delivery_time_ms: if delivered > 0 {
                total_delivery_time_ms as f64 / delivered as f64
            } else {
                0.0
            },
            elapsed_ms: duration_to_millis(start_time.elapsed()),
            workers,
        };

        tracing::info!(
            produced = summary.orders_produced,
            delivered = summary.orders_delivered,
            discarded = summary.orders_discarded,
            "shutdown complete"
        );
        self.reporter.report_shutdown_complete(&summary).await;

        match violation {
            Some(error) => Err(error),
            None => Ok(summary),
        }
    }

    async fn record_producer_failure(&self, failures: &mut Vec<WorkerFailure>, message: String) {
        tracing::warn!(error = %message, "producer failed");
        self.reporter
            .report_worker_failed(Stage::Intake, 0, &message)
            .await;
        failures.push(WorkerFailure {
            stage: Stage::Intake,
            worker_id: 0,
            message,
        });
    }
}
