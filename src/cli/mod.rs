// CLI層 - コマンドライン引数とサブコマンドの実行
// 引数から設定を組み立て、エンジンを起動して結果を出力する

pub mod args;
pub mod commands;

pub use args::*;
pub use commands::*;
