// 高レベル公開API
// PipelineEngineを簡単に使用できるようにするための便利な関数

use super::PipelineEngine;
use crate::{
    core::{OrderFactory, PipelineConfig, PipelineReporter, PipelineResult, PipelineSummary},
    services::{
        DefaultPipelineConfig, NoOpPipelineReporter, RandomOrderFactory, TracingPipelineReporter,
    },
};

/// PipelineEngine作成のヘルパー関数
///
/// デフォルト設定での簡単なエンジン作成
pub fn create_default_pipeline_engine(
) -> PipelineEngine<DefaultPipelineConfig, TracingPipelineReporter, RandomOrderFactory> {
    create_pipeline_engine(DefaultPipelineConfig::default())
}

/// 指定した設定でエンジンを作成（tracingへ出力）
pub fn create_pipeline_engine<C>(
    config: C,
) -> PipelineEngine<C, TracingPipelineReporter, RandomOrderFactory>
where
    C: PipelineConfig,
{
    let factory = RandomOrderFactory::from_config(&config);
    PipelineEngine::new(config, TracingPipelineReporter::new(), factory)
}

/// PipelineEngine作成のヘルパー関数（静音版）
///
/// テストやベンチマーク用
pub fn create_quiet_pipeline_engine<C>(
    config: C,
) -> PipelineEngine<C, NoOpPipelineReporter, RandomOrderFactory>
where
    C: PipelineConfig,
{
    let factory = RandomOrderFactory::from_config(&config);
    PipelineEngine::new(config, NoOpPipelineReporter::new(), factory)
}

/// Ctrl-Cを受けたら停止シグナルを発火し、シャットダウン完了まで待つ
///
/// `run_duration` が設定されていれば、Ctrl-Cより先にそちらで停止することもある。
pub async fn run_until_ctrl_c<C, R, F>(
    engine: PipelineEngine<C, R, F>,
) -> PipelineResult<PipelineSummary>
where
    C: PipelineConfig,
    R: PipelineReporter + 'static,
    F: OrderFactory + 'static,
{
    let handle = engine.shutdown_handle();
    let signal_task = tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                if handle.cancel() {
                    tracing::info!("Ctrl-C received, stopping pipeline");
                }
            }
            Err(e) => tracing::warn!(error = %e, "failed to listen for Ctrl-C"),
        }
    });

    let result = engine.run().await;
    signal_task.abort();
    result
}
