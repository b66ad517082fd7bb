// 設定管理
// デフォルト値、ビルダー、JSONファイルからの読み込み

pub mod implementations;

pub use implementations::DefaultPipelineConfig;
