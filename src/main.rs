use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use delivery_mrp::{load_config, logging, Dataset, DeliveryPlanner, DeliveryReport, PlanningConfig};

/// 訂單交期評估與產能瓶頸分析
#[derive(Parser)]
#[command(name = "delivery-mrp", version, about = "訂單交期評估與產能瓶頸分析")]
struct Cli {
    /// 資料集 JSON（orders / bom / capacity）
    #[arg(long)]
    dataset: PathBuf,

    /// 計劃參數 JSON，未提供的欄位使用預設值
    #[arg(long)]
    config: Option<PathBuf>,

    /// 報表輸出路徑，省略時輸出到標準輸出
    #[arg(long)]
    output: Option<PathBuf>,

    /// 報表列出的瓶頸物料數量
    #[arg(long)]
    top: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("載入計劃參數失敗: {}", path.display()))?,
        None => PlanningConfig::default(),
    };
    if let Some(top) = cli.top {
        config.top_bottleneck_count = top;
    }

    let dataset = Dataset::load(&cli.dataset)
        .with_context(|| format!("載入資料集失敗: {}", cli.dataset.display()))?;

    let report = DeliveryPlanner::new(config)
        .run(&dataset)
        .context("交期評估失敗")?;

    log_key_alerts(&report);

    let json = serde_json::to_string_pretty(&report).context("報表序列化失敗")?;
    match &cli.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("寫入報表失敗: {}", path.display()))?;
            tracing::info!("報表已輸出到 {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}

fn log_key_alerts(report: &DeliveryReport) {
    let plan = &report.plan;
    let summary = &plan.delivery_summary;

    tracing::info!(
        "運行 {}：訂單 {} 筆，按時交付率 {}%，紅色預警 {} 筆，黃色預警 {} 筆",
        report.metadata.run_id,
        summary.order_count,
        summary.on_time_rate_pct,
        summary.red_count,
        summary.yellow_count
    );

    for verdict in &plan.alerts.red {
        tracing::warn!(
            "紅色預警：訂單 {} 延期 {} 天，瓶頸物料 {}",
            verdict.order_id,
            verdict.delay_days,
            verdict.bottleneck_material.as_deref().unwrap_or("未知")
        );
    }

    for record in &plan.top_bottlenecks {
        tracing::info!(
            "瓶頸物料 {}（{:?}）：延期 {} 天，影響程度 {}",
            record.material_code,
            record.classification,
            record.delay_days,
            record.impact_score
        );
    }
}
