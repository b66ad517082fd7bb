// パイプラインで扱うデータ型定義

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// ミリ秒へ変換（u64に収まらない値は u64::MAX に丸める）
pub fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// ピザの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PizzaKind {
    Pepperoni,
    Cheese,
    Veggie,
    Hawaiian,
}

impl PizzaKind {
    /// 全種類（ランダム選択用）
    pub const ALL: [PizzaKind; 4] = [
        PizzaKind::Pepperoni,
        PizzaKind::Cheese,
        PizzaKind::Veggie,
        PizzaKind::Hawaiian,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pepperoni => "Pepperoni",
            Self::Cheese => "Cheese",
            Self::Veggie => "Veggie",
            Self::Hawaiian => "Hawaiian",
        }
    }
}

impl fmt::Display for PizzaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 注文 - パイプラインを流れる作業単位
///
/// 作成後は変更されない。Cloneを実装しないため、
/// Producer → intakeキュー → 調理ワーカー → 配達キュー → 配達ワーカー
/// の順に所有権がムーブで移動し、同時に二つのワーカーが保持することはない。
#[derive(Debug, PartialEq, Eq)]
pub struct Order {
    id: u64,
    kind: PizzaKind,
    delivery_time: Duration,
}

impl Order {
    pub fn new(id: u64, kind: PizzaKind, delivery_time: Duration) -> Self {
        Self {
            id,
            kind,
            delivery_time,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> PizzaKind {
        self.kind
    }

    /// 配達ステージでシミュレートする所要時間
    pub fn delivery_time(&self) -> Duration {
        self.delivery_time
    }
}

/// パイプラインのステージ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// 注文受付（Producer）
    Intake,
    Preparation,
    Delivery,
}

impl Stage {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Intake => "intake",
            Self::Preparation => "preparation",
            Self::Delivery => "delivery",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ワーカー単位の統計
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerReport {
    pub stage: Stage,
    pub worker_id: usize,
    pub processed: usize,
    pub busy_ms: u64,
}

impl WorkerReport {
    pub fn new(stage: Stage, worker_id: usize) -> Self {
        Self {
            stage,
            worker_id,
            processed: 0,
            busy_ms: 0,
        }
    }

    /// 1件の処理完了を記録
    pub fn record(&mut self, busy: Duration) {
        self.processed += 1;
        self.busy_ms = self.busy_ms.saturating_add(duration_to_millis(busy));
    }
}

/// Producerの統計
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProducerReport {
    pub produced: usize,
}

/// 配達ワーカーがbatch_sizeごとに出すサマリー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub worker_id: usize,
    pub count: usize,
    pub total_ms: u64,
}

/// 異常終了したワーカーの記録
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerFailure {
    pub stage: Stage,
    pub worker_id: usize,
    pub message: String,
}

/// 実行全体のサマリー
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub orders_produced: usize,
    pub orders_prepared: usize,
    pub orders_delivered: usize,
    /// close時にキューに残っていた注文
    pub orders_discarded: usize,
    /// ワーカー異常終了で失われた注文
    pub orders_lost: usize,
    pub failed_workers: Vec<WorkerFailure>,
    pub total_delivery_time_ms: u64,
    pub average_delivery_time_ms: f64,
    pub elapsed_ms: u64,
    pub workers: Vec<WorkerReport>,
}

impl PipelineSummary {
    /// 全ての注文が配達済みか破棄として計上されているか
    pub fn is_balanced(&self) -> bool {
        self.orders_produced == self.orders_delivered + self.orders_discarded
    }
}
