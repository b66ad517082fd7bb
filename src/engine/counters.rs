// 共有カウンター - 各ステージの完了件数
// ワーカーが異常終了しても、それまでの件数は失われない

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use crate::core::duration_to_millis;
use std::time::Duration;

#[derive(Debug, Default)]
pub struct PipelineCounters {
    produced: AtomicUsize,
    prepared: AtomicUsize,
    delivered: AtomicUsize,
    delivery_time_ms: AtomicU64,
}

impl PipelineCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_produced(&self) {
        self.produced.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_prepared(&self) {
        self.prepared.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delivered(&self, delivery_time: Duration) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
        self.delivery_time_ms
            .fetch_add(duration_to_millis(delivery_time), Ordering::Relaxed);
    }

    pub fn produced(&self) -> usize {
        self.produced.load(Ordering::Relaxed)
    }

    pub fn prepared(&self) -> usize {
        self.prepared.load(Ordering::Relaxed)
    }

    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn delivery_time_ms(&self) -> u64 {
        self.delivery_time_ms.load(Ordering::Relaxed)
    }
}
