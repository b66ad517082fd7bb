// 進行状況の監視
// ライフサイクルイベントの出力、テスト用のイベント記録

pub mod implementations;
pub mod recording;

// 公開API
pub use implementations::{NoOpPipelineReporter, TracingPipelineReporter};
pub use recording::{PipelineEvent, RecordingPipelineReporter};
