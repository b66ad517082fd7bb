// サービス層 - 機能別の具象実装
// 設定、監視、注文生成はそれぞれコアのトレイトを実装する

pub mod config;
pub mod monitoring;
pub mod orders;

// 公開API - 各サービスの主要機能を明示的にエクスポート
pub use config::DefaultPipelineConfig;
pub use monitoring::{
    NoOpPipelineReporter, PipelineEvent, RecordingPipelineReporter, TracingPipelineReporter,
};
pub use orders::{RandomOrderFactory, ScriptedOrderFactory};
