//! # Delivery MRP
//!
//! 訂單交期評估：多層 BOM 展開、有限產能排產、關鍵路徑交付判定
//! 與產能瓶頸分析。
//!
//! ```no_run
//! use delivery_mrp::{Dataset, DeliveryPlanner, PlanningConfig};
//!
//! let dataset = Dataset::load("data/sample_dataset.json").unwrap();
//! let report = DeliveryPlanner::new(PlanningConfig::default())
//!     .run(&dataset)
//!     .unwrap();
//! println!("按時交付率 {}%", report.plan.delivery_summary.on_time_rate_pct);
//! ```

pub mod dataset;
pub mod logging;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use dataset::{load_config, Dataset, DatasetError};
pub use mrp_analysis::{
    delayed_orders, top_bottlenecks, BottleneckDetector, DeliveryAlerts, DeliveryAnalyzer,
    DeliverySummary,
};
pub use mrp_calc::{BomGraph, MrpCalculator, MrpWarning, RequirementSummary};
pub use mrp_core::{
    AlertLevel, BomEdge, BottleneckClass, BottleneckRecord, CapacityRecommendation,
    CapacityRecord, CapacityTable, CustomerOrder, DeliveryVerdict, DuplicateCapacity,
    MaterialRequirement, MrpError, PlanningConfig, ScheduleResult, ScheduleStatus, WorkCalendar,
};
pub use mrp_schedule::{CapacityScheduler, ScheduleSummary};

/// 一次交期評估的計算結果
///
/// 相同輸入必定得到相同結果。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryPlan {
    /// 排產開工日期（所有訂單中最早的開工日）
    pub schedule_start_date: Option<NaiveDate>,

    pub requirements: Vec<MaterialRequirement>,
    pub requirement_summary: RequirementSummary,

    pub schedules: Vec<ScheduleResult>,
    pub schedule_summary: ScheduleSummary,

    pub verdicts: Vec<DeliveryVerdict>,
    pub delivery_summary: DeliverySummary,

    /// 延期訂單（按延期天數由大到小）
    pub delayed_orders: Vec<DeliveryVerdict>,
    pub alerts: DeliveryAlerts,

    /// 瓶頸物料（按影響程度由大到小）
    pub bottlenecks: Vec<BottleneckRecord>,
    pub top_bottlenecks: Vec<BottleneckRecord>,
    pub recommendations: Vec<CapacityRecommendation>,

    /// 產能資料去重時捨棄的記錄
    pub duplicate_capacity: Vec<DuplicateCapacity>,
    pub warnings: Vec<MrpWarning>,
}

/// 報表後設資料
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub order_count: usize,
    pub bom_edge_count: usize,
    pub capacity_record_count: usize,
}

/// 交期評估報表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryReport {
    pub metadata: ReportMetadata,
    pub plan: DeliveryPlan,
}

/// 交期評估流程
pub struct DeliveryPlanner {
    config: PlanningConfig,
}

impl DeliveryPlanner {
    pub fn new(config: PlanningConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlanningConfig {
        &self.config
    }

    /// 執行評估並附上後設資料
    pub fn run(&self, dataset: &Dataset) -> mrp_core::Result<DeliveryReport> {
        let plan = self.plan(dataset)?;
        Ok(DeliveryReport {
            metadata: ReportMetadata {
                run_id: Uuid::new_v4(),
                generated_at: Utc::now(),
                order_count: dataset.orders.len(),
                bom_edge_count: dataset.bom.len(),
                capacity_record_count: dataset.capacity.len(),
            },
            plan,
        })
    }

    /// 完整計算流程
    ///
    /// 驗證 → 產能去重 → BOM 循環檢查與展開 → 排產 → 交付分析 → 瓶頸檢測。
    /// 結構性錯誤（配置、資料、BOM 循環）在任何計算之前返回。
    pub fn plan(&self, dataset: &Dataset) -> mrp_core::Result<DeliveryPlan> {
        let config = &self.config;
        config.validate()?;
        mrp_core::validate_dataset(config, &dataset.orders, &dataset.bom, &dataset.capacity)?;

        let (capacity, duplicate_capacity) = CapacityTable::from_records(&dataset.capacity);
        let graph: BomGraph = dataset.bom.iter().cloned().collect();

        let mrp = MrpCalculator::new(&graph, config).calculate(&dataset.orders)?;

        let schedule_start_date = mrp_core::earliest_start_date(&dataset.orders);
        let schedules = match schedule_start_date {
            Some(start) => {
                CapacityScheduler::new(&capacity, config).schedule(&mrp.requirements, start)?
            }
            None => Vec::new(),
        };

        let verdicts = DeliveryAnalyzer::new(&graph, &schedules, config).analyze(&dataset.orders);

        let detector = BottleneckDetector::new(config);
        let bottlenecks = detector.detect(&schedules);
        let recommendations = detector.recommendations(&schedules);

        let plan = DeliveryPlan {
            schedule_start_date,
            requirement_summary: mrp.summary(),
            schedule_summary: ScheduleSummary::from_results(&schedules),
            delivery_summary: DeliverySummary::from_verdicts(&verdicts),
            delayed_orders: delayed_orders(&verdicts).into_iter().cloned().collect(),
            alerts: DeliveryAlerts::from_verdicts(&verdicts),
            top_bottlenecks: top_bottlenecks(&bottlenecks, config.top_bottleneck_count).to_vec(),
            requirements: mrp.requirements,
            schedules,
            verdicts,
            bottlenecks,
            recommendations,
            duplicate_capacity,
            warnings: mrp.warnings,
        };

        tracing::info!(
            "交期評估完成：訂單 {} 筆，按時 {} 筆，瓶頸物料 {} 個",
            plan.delivery_summary.order_count,
            plan.delivery_summary.on_time_count,
            plan.bottlenecks.len()
        );

        Ok(plan)
    }
}
