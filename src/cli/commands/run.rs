use crate::cli::RunArgs;
use crate::core::{PipelineConfig, PipelineReporter, PipelineSummary};
use crate::engine::{run_until_ctrl_c, PipelineEngine};
use crate::services::{
    DefaultPipelineConfig, NoOpPipelineReporter, RandomOrderFactory, TracingPipelineReporter,
};
use anyhow::{Context, Result};
use std::time::Duration;

/// Build the effective configuration: defaults, then the config file, then flags
pub fn build_config(args: &RunArgs) -> Result<DefaultPipelineConfig> {
    let mut config = match &args.config {
        Some(path) => DefaultPipelineConfig::from_json_file(path)?,
        None => DefaultPipelineConfig::default(),
    };

    if let Some(cooks) = args.cooks {
        config = config.with_preparation_workers(cooks);
    }
    if let Some(drivers) = args.drivers {
        config = config.with_delivery_workers(drivers);
    }
    if let Some(capacity) = args.capacity {
        config = config.with_queue_capacity(capacity);
    }
    if let Some(tick_ms) = args.tick_ms {
        config = config.with_tick_interval(Duration::from_millis(tick_ms));
    }
    if let Some(prep_ms) = args.prep_ms {
        config = config.with_preparation_time(Duration::from_millis(prep_ms));
    }
    if args.min_delivery_ms.is_some() || args.max_delivery_ms.is_some() {
        let min = args
            .min_delivery_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| config.min_delivery_time());
        let max = args
            .max_delivery_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| config.max_delivery_time());
        config = config.with_delivery_time_range(min, max);
    }
    if let Some(secs) = args.duration_secs {
        config = config.with_run_duration(Some(Duration::from_secs(secs)));
    }
    if args.until_ctrl_c {
        config = config.with_run_duration(None);
    }
    if let Some(batch_size) = args.batch_size {
        config = config.with_batch_size(batch_size);
    }
    if args.max_orders.is_some() {
        config = config.with_order_limit(args.max_orders);
    }

    Ok(config)
}

/// Execute the run command and return the final summary
pub async fn execute_run(args: RunArgs) -> Result<PipelineSummary> {
    let config = build_config(&args)?;

    let reporter: Box<dyn PipelineReporter> = if args.quiet {
        Box::new(NoOpPipelineReporter::new())
    } else {
        Box::new(TracingPipelineReporter::new())
    };
    let factory = RandomOrderFactory::from_config(&config);

    if !args.json {
        print_settings(&config);
    }

    let engine = PipelineEngine::new(config, reporter, factory);
    let summary = run_until_ctrl_c(engine)
        .await
        .context("パイプライン実行エラー")?;

    if args.json {
        println!("{}", summary_to_json(&summary)?);
    } else {
        print_summary(&summary);
    }

    Ok(summary)
}

fn print_settings(config: &DefaultPipelineConfig) {
    println!("🍕 Pizza delivery pipeline");
    println!("⚙️  設定:");
    println!("   - 調理ワーカー数: {}", config.preparation_workers());
    println!("   - 配達ワーカー数: {}", config.delivery_workers());
    println!(
        "   - キュー容量: {} / {}",
        config.intake_capacity(),
        config.delivery_capacity()
    );
    match config.run_duration() {
        Some(duration) => println!("   - 実行時間: {:.1}秒", duration.as_secs_f64()),
        None => println!("   - 実行時間: Ctrl-Cまで"),
    }
}

fn print_summary(summary: &PipelineSummary) {
    println!("\n✅ 営業終了!");
    println!("📊 結果:");
    println!("   - 受付: {}", summary.orders_produced);
    println!("   - 調理済: {}", summary.orders_prepared);
    println!("   - 配達済: {}", summary.orders_delivered);
    println!("   - 破棄: {}", summary.orders_discarded);
    println!(
        "   - 平均配達時間: {:.1}ms",
        summary.average_delivery_time_ms
    );
    println!("   - 総実行時間: {}ms", summary.elapsed_ms);

    if summary.orders_lost > 0 {
        println!("⚠️  {}件の注文が失われました", summary.orders_lost);
    }
    for failure in &summary.failed_workers {
        eprintln!(
            "❌ {} worker #{} failed: {}",
            failure.stage, failure.worker_id, failure.message
        );
    }
}

/// Serialize the summary with a completion timestamp
pub fn summary_to_json(summary: &PipelineSummary) -> Result<String> {
    let document = serde_json::json!({
        "completed_at": chrono::Utc::now().to_rfc3339(),
        "summary": summary,
    });
    Ok(serde_json::to_string_pretty(&document)?)
}
