// パイプラインのトレイト定義
// 設定・観測・注文生成の抽象化インターフェース

use super::types::{BatchSummary, Order, PipelineSummary, ProducerReport, Stage, WorkerReport};
use async_trait::async_trait;
use mockall::automock;
use std::time::Duration;

/// パイプラインの設定を抽象化するトレイト
#[automock]
pub trait PipelineConfig: Send + Sync {
    /// 調理ワーカー数
    fn preparation_workers(&self) -> usize;

    /// 配達ワーカー数
    fn delivery_workers(&self) -> usize;

    /// 受付キューの容量
    fn intake_capacity(&self) -> usize;

    /// 配達キューの容量
    fn delivery_capacity(&self) -> usize;

    /// Producerの注文間隔
    fn tick_interval(&self) -> Duration;

    /// 1注文あたりの調理時間（固定）
    fn preparation_time(&self) -> Duration;

    /// 配達時間の下限
    fn min_delivery_time(&self) -> Duration;

    /// 配達時間の上限（この値を含まない）
    fn max_delivery_time(&self) -> Duration;

    /// キャンセルまでの実行時間。Noneなら外部からの停止を待つ
    fn run_duration(&self) -> Option<Duration>;

    /// 配達サマリーを出す件数
    fn batch_size(&self) -> usize;

    /// Producerが生成する注文数の上限
    fn order_limit(&self) -> Option<usize>;
}

// PipelineConfig for Box<dyn PipelineConfig>
impl PipelineConfig for Box<dyn PipelineConfig> {
    fn preparation_workers(&self) -> usize {
        self.as_ref().preparation_workers()
    }

    fn delivery_workers(&self) -> usize {
        self.as_ref().delivery_workers()
    }

    fn intake_capacity(&self) -> usize {
        self.as_ref().intake_capacity()
    }

    fn delivery_capacity(&self) -> usize {
        self.as_ref().delivery_capacity()
    }

    fn tick_interval(&self) -> Duration {
        self.as_ref().tick_interval()
    }

    fn preparation_time(&self) -> Duration {
        self.as_ref().preparation_time()
    }

    fn min_delivery_time(&self) -> Duration {
        self.as_ref().min_delivery_time()
    }

    fn max_delivery_time(&self) -> Duration {
        self.as_ref().max_delivery_time()
    }

    fn run_duration(&self) -> Option<Duration> {
        self.as_ref().run_duration()
    }

    fn batch_size(&self) -> usize {
        self.as_ref().batch_size()
    }

    fn order_limit(&self) -> Option<usize> {
        self.as_ref().order_limit()
    }
}

/// ライフサイクルイベントの報告先（観測シンク）
///
/// コアは出力形式を持たず、全てのイベントをこのトレイトへ渡す。
#[automock]
#[async_trait]
pub trait PipelineReporter: Send + Sync {
    /// ワーカー起動
    async fn report_worker_started(&self, stage: Stage, worker_id: usize);

    /// Producerが注文を受付キューへ投入した
    async fn report_order_placed(&self, order: &Order);

    /// ワーカーが注文を受け取った
    async fn report_order_accepted(&self, stage: Stage, worker_id: usize, order: &Order);

    /// 配達バッチのサマリー
    async fn report_batch_summary(&self, summary: &BatchSummary);

    /// ワーカー正常終了
    async fn report_worker_stopped(&self, report: &WorkerReport);

    /// ワーカー異常終了
    async fn report_worker_failed(&self, stage: Stage, worker_id: usize, error: &str);

    /// Producer終了
    async fn report_producer_stopped(&self, report: &ProducerReport);

    /// キャンセル発火
    async fn report_cancellation_raised(&self);

    /// キューのclose
    async fn report_queue_closed(&self, queue: &str, discarded: usize);

    /// シャットダウン完了
    async fn report_shutdown_complete(&self, summary: &PipelineSummary);
}

// PipelineReporter for Box<dyn PipelineReporter>
#[async_trait]
impl PipelineReporter for Box<dyn PipelineReporter> {
    async fn report_worker_started(&self, stage: Stage, worker_id: usize) {
        self.as_ref().report_worker_started(stage, worker_id).await
    }

    async fn report_order_placed(&self, order: &Order) {
        self.as_ref().report_order_placed(order).await
    }

    async fn report_order_accepted(&self, stage: Stage, worker_id: usize, order: &Order) {
        self.as_ref()
            .report_order_accepted(stage, worker_id, order)
            .await
    }

    async fn report_batch_summary(&self, summary: &BatchSummary) {
        self.as_ref().report_batch_summary(summary).await
    }

    async fn report_worker_stopped(&self, report: &WorkerReport) {
        self.as_ref().report_worker_stopped(report).await
    }

    async fn report_worker_failed(&self, stage: Stage, worker_id: usize, error: &str) {
        self.as_ref()
            .report_worker_failed(stage, worker_id, error)
            .await
    }

    async fn report_producer_stopped(&self, report: &ProducerReport) {
        self.as_ref().report_producer_stopped(report).await
    }

    async fn report_cancellation_raised(&self) {
        self.as_ref().report_cancellation_raised().await
    }

    async fn report_queue_closed(&self, queue: &str, discarded: usize) {
        self.as_ref().report_queue_closed(queue, discarded).await
    }

    async fn report_shutdown_complete(&self, summary: &PipelineSummary) {
        self.as_ref().report_shutdown_complete(summary).await
    }
}

/// 注文の生成を抽象化するトレイト
///
/// テストでは決定的な実装に差し替える。
#[automock]
pub trait OrderFactory: Send + Sync {
    /// 指定IDの注文を作成
    fn create_order(&self, id: u64) -> Order;
}

impl OrderFactory for Box<dyn OrderFactory> {
    fn create_order(&self, id: u64) -> Order {
        self.as_ref().create_order(id)
    }
}
