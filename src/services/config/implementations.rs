// 設定管理の具象実装

use crate::core::{duration_to_millis, PipelineConfig, PipelineError, PipelineResult};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// デフォルト設定実装
///
/// JSONファイルから読み込める。時間はミリ秒で表現し、
/// ファイルに無い項目はデフォルト値になる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultPipelineConfig {
    preparation_workers: usize,
    delivery_workers: usize,
    intake_capacity: usize,
    delivery_capacity: usize,
    tick_interval_ms: u64,
    preparation_time_ms: u64,
    min_delivery_time_ms: u64,
    max_delivery_time_ms: u64,
    run_duration_ms: Option<u64>,
    batch_size: usize,
    order_limit: Option<usize>,
}

impl DefaultPipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// JSONファイルから設定を読み込む
    pub fn from_json_file(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("設定ファイルを読み込めません: {display}"))
            .map_err(|e| PipelineError::config_file(&display, e))?;

        serde_json::from_str(&content)
            .context("設定ファイルのJSONが不正です")
            .map_err(|e| PipelineError::config_file(&display, e))
    }

    pub fn with_preparation_workers(mut self, workers: usize) -> Self {
        self.preparation_workers = workers;
        self
    }

    pub fn with_delivery_workers(mut self, workers: usize) -> Self {
        self.delivery_workers = workers;
        self
    }

    /// 受付キューと配達キューの両方に同じ容量を設定
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.intake_capacity = capacity;
        self.delivery_capacity = capacity;
        self
    }

    pub fn with_intake_capacity(mut self, capacity: usize) -> Self {
        self.intake_capacity = capacity;
        self
    }

    pub fn with_delivery_capacity(mut self, capacity: usize) -> Self {
        self.delivery_capacity = capacity;
        self
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval_ms = duration_to_millis(interval);
        self
    }

    pub fn with_preparation_time(mut self, preparation_time: Duration) -> Self {
        self.preparation_time_ms = duration_to_millis(preparation_time);
        self
    }

    /// 配達時間の範囲 [min, max)
    pub fn with_delivery_time_range(mut self, min: Duration, max: Duration) -> Self {
        self.min_delivery_time_ms = duration_to_millis(min);
        self.max_delivery_time_ms = duration_to_millis(max);
        self
    }

    pub fn with_run_duration(mut self, run_duration: Option<Duration>) -> Self {
        self.run_duration_ms = run_duration.map(duration_to_millis);
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_order_limit(mut self, order_limit: Option<usize>) -> Self {
        self.order_limit = order_limit;
        self
    }
}

impl Default for DefaultPipelineConfig {
    fn default() -> Self {
        Self {
            preparation_workers: 3,
            delivery_workers: 4,
            intake_capacity: 100,
            delivery_capacity: 100,
            tick_interval_ms: 1_000,
            preparation_time_ms: 3_000,
            min_delivery_time_ms: 0,
            max_delivery_time_ms: 5_000,
            run_duration_ms: Some(20_000),
            batch_size: 3,
            order_limit: None,
        }
    }
}

impl PipelineConfig for DefaultPipelineConfig {
    fn preparation_workers(&self) -> usize {
        self.preparation_workers
    }

    fn delivery_workers(&self) -> usize {
        self.delivery_workers
    }

    fn intake_capacity(&self) -> usize {
        self.intake_capacity
    }

    fn delivery_capacity(&self) -> usize {
        self.delivery_capacity
    }

    fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    fn preparation_time(&self) -> Duration {
        Duration::from_millis(self.preparation_time_ms)
    }

    fn min_delivery_time(&self) -> Duration {
        Duration::from_millis(self.min_delivery_time_ms)
    }

    fn max_delivery_time(&self) -> Duration {
        Duration::from_millis(self.max_delivery_time_ms)
    }

    fn run_duration(&self) -> Option<Duration> {
        self.run_duration_ms.map(Duration::from_millis)
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn order_limit(&self) -> Option<usize> {
        self.order_limit
    }
}
