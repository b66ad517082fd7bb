// Consumer - 固定サイズのワーカープール
// 各ワーカーは入力キューと停止シグナルを同時に待ち、先に準備できた方を処理する

use super::cancellation::CancellationController;
use super::queue::{BoundedQueue, Dequeued};
use crate::core::{
    Order, PipelineError, PipelineReporter, PipelineResult, Stage, WorkerFailure, WorkerReport,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// ステージ固有の処理
///
/// ワーカーごとに1インスタンス作られるため、ワーカー単位の状態を持てる。
#[async_trait]
pub trait StageHandler: Send + 'static {
    /// 注文を1件処理し、シミュレートした作業時間を返す
    async fn handle(&mut self, worker_id: usize, order: Order) -> PipelineResult<Duration>;
}

/// 停止シグナルを観測したときの振る舞い
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainPolicy {
    /// 処理中の注文がなければ即座に終了
    StopOnCancel,
    /// 入力キューが Exhausted になるまで取り出し続ける
    DrainUntilExhausted,
}

/// join結果の集計
#[derive(Debug, Default)]
pub struct PoolOutcome {
    pub reports: Vec<WorkerReport>,
    pub failures: Vec<WorkerFailure>,
    /// 最初に観測した契約違反
    pub violation: Option<PipelineError>,
}

/// 生存ワーカー数を数えるドロップガード
///
/// パニックで巻き戻った場合もDropが走るので、最後のワーカーが
/// 消えた時点で必ず `stopped` が発火する。
struct LiveWorkerGuard {
    live: Arc<AtomicUsize>,
    stopped: CancellationToken,
}

impl Drop for LiveWorkerGuard {
    fn drop(&mut self) {
        if self.live.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.stopped.cancel();
        }
    }
}

/// 固定サイズのワーカープール
pub struct WorkerPool {
    stage: Stage,
    handles: Vec<(usize, JoinHandle<PipelineResult<WorkerReport>>)>,
    stopped: CancellationToken,
}

impl WorkerPool {
    /// ワーカーを起動
    ///
    /// `make_handler` はワーカーIDごとに1回呼ばれる。
    pub fn spawn<H, R, M>(
        stage: Stage,
        worker_count: usize,
        input: Arc<BoundedQueue<Order>>,
        cancellation: CancellationController,
        policy: DrainPolicy,
        reporter: Arc<R>,
        mut make_handler: M,
    ) -> Self
    where
        H: StageHandler,
        R: PipelineReporter + 'static,
        M: FnMut(usize) -> H,
    {
        let stopped = CancellationToken::new();
        let live = Arc::new(AtomicUsize::new(worker_count));
        if worker_count == 0 {
            stopped.cancel();
        }

        let mut handles = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let guard = LiveWorkerGuard {
                live: Arc::clone(&live),
                stopped: stopped.clone(),
            };
            let handle = tokio::spawn(run_worker(
                stage,
                worker_id,
                Arc::clone(&input),
                cancellation.clone(),
                policy,
                make_handler(worker_id),
                Arc::clone(&reporter),
                guard,
            ));
            handles.push((worker_id, handle));
        }

        Self {
            stage,
            handles,
            stopped,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// 全ワーカーが終了（正常・異常問わず）すると発火するトークン
    pub fn stopped_token(&self) -> CancellationToken {
        self.stopped.clone()
    }

    /// 全ワーカーの終了を待つ
    ///
    /// パニックやエラーで終了したワーカーも必ず集計されるため、
    /// このjoinは全ワーカーが終われば必ず完了する。
    pub async fn join<R>(self, reporter: &R) -> PoolOutcome
    where
        R: PipelineReporter + ?Sized,
    {
        let mut outcome = PoolOutcome::default();

        for (worker_id, handle) in self.handles {
            let error = match handle.await {
                Ok(Ok(report)) => {
                    outcome.reports.push(report);
                    continue;
                }
                Ok(Err(error)) => {
                    let message = error.to_string();
                    if error.is_contract_violation() && outcome.violation.is_none() {
                        outcome.violation = Some(error);
                    }
                    message
                }
                Err(join_error) => PipelineError::task(join_error).to_string(),
            };

            tracing::warn!(stage = %self.stage, worker_id, error = %error, "worker failed");
            reporter
                .report_worker_failed(self.stage, worker_id, &error)
                .await;
            outcome.failures.push(WorkerFailure {
                stage: self.stage,
                worker_id,
                message: error,
            });
        }

        outcome
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_worker<H, R>(
    stage: Stage,
    worker_id: usize,
    input: Arc<BoundedQueue<Order>>,
    cancellation: CancellationController,
    policy: DrainPolicy,
    mut handler: H,
    reporter: Arc<R>,
    _guard: LiveWorkerGuard,
) -> PipelineResult<WorkerReport>
where
    H: StageHandler,
    R: PipelineReporter + 'static,
{
    tracing::debug!(%stage, worker_id, "worker started");
    reporter.report_worker_started(stage, worker_id).await;

    let mut report = WorkerReport::new(stage, worker_id);
    let mut draining = false;

    loop {
        let next = if draining {
            input.dequeue().await?
        } else {
            tokio::select! {
                biased;
                _ = cancellation.cancelled() => match policy {
                    DrainPolicy::StopOnCancel => break,
                    DrainPolicy::DrainUntilExhausted => {
                        tracing::debug!(%stage, worker_id, "draining remaining orders");
                        draining = true;
                        continue;
                    }
                },
                next = input.dequeue() => next?,
            }
        };

        let order = match next {
            Dequeued::Item(order) => order,
            Dequeued::Exhausted => break,
        };

        // 取り出した注文はキャンセルに関係なく最後まで処理する
        reporter
            .report_order_accepted(stage, worker_id, &order)
            .await;
        let busy = handler.handle(worker_id, order).await?;
        report.record(busy);
    }

    tracing::debug!(%stage, worker_id, processed = report.processed, "worker stopped");
    reporter.report_worker_stopped(&report).await;
    Ok(report)
}
