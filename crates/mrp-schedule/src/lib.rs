//! # MRP Schedule
//!
//! 有限產能排產：依物料日產能逐日模擬，推算完成日期與延期

pub mod scheduler;

use mrp_core::ScheduleResult;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// Re-export 主要類型
pub use scheduler::CapacityScheduler;

/// 排產彙總統計
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    /// 物料總數
    pub material_count: usize,

    /// 正常物料數
    pub normal_count: usize,

    /// 延期物料數（含無產能資料）
    pub delayed_count: usize,

    /// 延期率（%）
    pub delay_rate_pct: Decimal,

    /// 延期物料的延期天數合計
    pub total_delay_days: i64,

    /// 平均產能利用率（%，僅計入利用率大於 0 的物料）
    pub avg_utilization_pct: Decimal,
}

impl ScheduleSummary {
    pub fn from_results(results: &[ScheduleResult]) -> Self {
        let material_count = results.len();
        if material_count == 0 {
            return Self::default();
        }

        let delayed: Vec<_> = results.iter().filter(|r| r.is_delayed).collect();
        let delayed_count = delayed.len();
        let total_delay_days = delayed.iter().map(|r| r.delay_days).sum();

        let utilized: Vec<Decimal> = results
            .iter()
            .map(|r| r.avg_utilization)
            .filter(|u| *u > Decimal::ZERO)
            .collect();
        let avg_utilization_pct = if utilized.is_empty() {
            Decimal::ZERO
        } else {
            let sum: Decimal = utilized.iter().copied().sum();
            (sum / Decimal::from(utilized.len()) * Decimal::ONE_HUNDRED).round_dp(2)
        };

        Self {
            material_count,
            normal_count: material_count - delayed_count,
            delayed_count,
            delay_rate_pct: (Decimal::from(delayed_count) / Decimal::from(material_count)
                * Decimal::ONE_HUNDRED)
                .round_dp(2),
            total_delay_days,
            avg_utilization_pct,
        }
    }
}
