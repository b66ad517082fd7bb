// テストユーティリティ
// 決定的な設定と、障害を注入するための実装

pub mod faults;

pub use faults::*;

use pizza_delivery::{DefaultPipelineConfig, PizzaKind, ScriptedOrderFactory};
use std::time::Duration;

/// 全ての処理時間がゼロの最小構成
pub fn instant_config() -> DefaultPipelineConfig {
    DefaultPipelineConfig::default()
        .with_preparation_workers(1)
        .with_delivery_workers(1)
        .with_queue_capacity(1)
        .with_tick_interval(Duration::from_millis(10))
        .with_preparation_time(Duration::ZERO)
        .with_delivery_time_range(Duration::ZERO, Duration::ZERO)
        .with_run_duration(Some(Duration::from_secs(1)))
}

/// 配達時間が 0, 10, 20, 30, 40ms を繰り返す注文列
pub fn varied_factory() -> ScriptedOrderFactory {
    ScriptedOrderFactory::new(
        (0..5u64)
            .map(|i| (PizzaKind::ALL[i as usize % 4], Duration::from_millis(i * 10)))
            .collect(),
    )
}

pub fn instant_factory() -> ScriptedOrderFactory {
    ScriptedOrderFactory::uniform(PizzaKind::Cheese, Duration::ZERO)
}
