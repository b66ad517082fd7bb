// 注文生成の具象実装

use crate::core::{duration_to_millis, Order, OrderFactory, PipelineConfig, PizzaKind};
use rand::{rng, Rng};
use std::time::Duration;

/// ピザの種類と配達時間をランダムに決める
///
/// 配達時間は `[min, max)` から一様に選ぶ。`min == max` ならその値に固定。
#[derive(Debug, Clone)]
pub struct RandomOrderFactory {
    min_delivery_ms: u64,
    max_delivery_ms: u64,
}

impl RandomOrderFactory {
    pub fn new(min_delivery_time: Duration, max_delivery_time: Duration) -> Self {
        Self {
            min_delivery_ms: duration_to_millis(min_delivery_time),
            max_delivery_ms: duration_to_millis(max_delivery_time),
        }
    }

    pub fn from_config<C: PipelineConfig + ?Sized>(config: &C) -> Self {
        Self::new(config.min_delivery_time(), config.max_delivery_time())
    }
}

impl OrderFactory for RandomOrderFactory {
    fn create_order(&self, id: u64) -> Order {
        let mut rng = rng();
        let kind = PizzaKind::ALL[rng.random_range(0..PizzaKind::ALL.len())];
        let delivery_ms = if self.min_delivery_ms < self.max_delivery_ms {
            rng.random_range(self.min_delivery_ms..self.max_delivery_ms)
        } else {
            self.min_delivery_ms
        };

        Order::new(id, kind, Duration::from_millis(delivery_ms))
    }
}

/// 決められた (種類, 配達時間) の列を順番に繰り返す
///
/// ID 1 が先頭要素に対応する。
#[derive(Debug, Clone)]
pub struct ScriptedOrderFactory {
    script: Vec<(PizzaKind, Duration)>,
}

impl ScriptedOrderFactory {
    /// 空の列は `(Cheese, 0)` 1件として扱う
    pub fn new(script: Vec<(PizzaKind, Duration)>) -> Self {
        let script = if script.is_empty() {
            vec![(PizzaKind::Cheese, Duration::ZERO)]
        } else {
            script
        };
        Self { script }
    }

    /// 全ての注文が同じ種類・同じ配達時間
    pub fn uniform(kind: PizzaKind, delivery_time: Duration) -> Self {
        Self::new(vec![(kind, delivery_time)])
    }
}

impl OrderFactory for ScriptedOrderFactory {
    fn create_order(&self, id: u64) -> Order {
        let index = (id.saturating_sub(1) as usize) % self.script.len();
        let (kind, delivery_time) = self.script[index];
        Order::new(id, kind, delivery_time)
    }
}
