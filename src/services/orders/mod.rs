// 注文生成
// 本番用のランダム生成と、テスト用の決定的な生成

pub mod implementations;

pub use implementations::{RandomOrderFactory, ScriptedOrderFactory};
