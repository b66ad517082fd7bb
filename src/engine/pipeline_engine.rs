// PipelineEngine - 依存性注入によるパイプライン実行エンジン
// 設定・レポーター・注文生成をコンストラクタで受け取り、1回の実行を管理する

use super::cancellation::{CancellationController, ShutdownHandle};
use super::pipeline::OrderPipeline;
use crate::core::{
    OrderFactory, PipelineConfig, PipelineError, PipelineReporter, PipelineResult,
    PipelineSummary,
};
use std::sync::Arc;
use std::time::Duration;

/// 注文パイプラインの実行エンジン
///
/// 停止シグナルはエンジンごとに1つ。`shutdown_handle()` で取り出したハンドルは
/// `run()` の前後どちらで使っても安全で、何度呼んでも結果は変わらない。
pub struct PipelineEngine<C, R, F> {
    config: Arc<C>,
    reporter: Arc<R>,
    factory: Arc<F>,
    cancellation: CancellationController,
}

impl<C, R, F> PipelineEngine<C, R, F>
where
    C: PipelineConfig,
    R: PipelineReporter + 'static,
    F: OrderFactory + 'static,
{
    /// 全ての依存関係をコンストラクタで注入する
    pub fn new(config: C, reporter: R, factory: F) -> Self {
        Self {
            config: Arc::new(config),
            reporter: Arc::new(reporter),
            factory: Arc::new(factory),
            cancellation: CancellationController::new(),
        }
    }

    /// 外部から停止を要求するためのハンドル
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.cancellation.shutdown_handle()
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// パイプラインを起動し、シャットダウン完了まで待つ
    pub async fn run(self) -> PipelineResult<PipelineSummary> {
        self.validate()?;

        let pipeline = OrderPipeline::new(Arc::clone(&self.factory), Arc::clone(&self.reporter));
        pipeline
            .execute(self.config.as_ref(), self.cancellation.clone())
            .await
    }

    fn validate(&self) -> PipelineResult<()> {
        let config = self.config.as_ref();

        if config.preparation_workers() == 0 {
            return Err(PipelineError::configuration(
                "調理ワーカー数は1以上である必要があります",
            ));
        }

        if config.delivery_workers() == 0 {
            return Err(PipelineError::configuration(
                "配達ワーカー数は1以上である必要があります",
            ));
        }

        if config.intake_capacity() == 0 || config.delivery_capacity() == 0 {
            return Err(PipelineError::configuration(
                "キュー容量は1以上である必要があります",
            ));
        }

        if config.batch_size() == 0 {
            return Err(PipelineError::configuration(
                "バッチサイズは1以上である必要があります",
            ));
        }

        if config.tick_interval() == Duration::ZERO {
            return Err(PipelineError::configuration(
                "注文間隔は0より大きい必要があります",
            ));
        }

        if config.min_delivery_time() > config.max_delivery_time() {
            return Err(PipelineError::configuration(format!(
                "配達時間の範囲が不正です: {:?} > {:?}",
                config.min_delivery_time(),
                config.max_delivery_time()
            )));
        }

        Ok(())
    }
}
