//! 瓶頸檢測與產能缺口

use mrp_core::{
    BottleneckClass, BottleneckRecord, CapacityGap, CapacityRecommendation, PlanningConfig,
    ScheduleResult,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// 瓶頸檢測器
pub struct BottleneckDetector<'a> {
    config: &'a PlanningConfig,
}

impl<'a> BottleneckDetector<'a> {
    pub fn new(config: &'a PlanningConfig) -> Self {
        Self { config }
    }

    /// 瓶頸分類
    pub fn classify(&self, schedule: &ScheduleResult) -> BottleneckClass {
        if schedule.is_delayed {
            BottleneckClass::InsufficientCapacity
        } else if schedule.avg_utilization >= self.config.utilization_threshold {
            BottleneckClass::CapacityTight
        } else {
            BottleneckClass::Normal
        }
    }

    /// 影響程度 = 延期天數 × 10 + 平均利用率 × 100
    pub fn impact_score(schedule: &ScheduleResult) -> Decimal {
        (Decimal::from(schedule.delay_days) * Decimal::TEN
            + schedule.avg_utilization * Decimal::ONE_HUNDRED)
            .round_dp(2)
    }

    /// 產能缺口（僅延期且有產能資料的物料）
    pub fn capacity_gap(schedule: &ScheduleResult) -> Option<CapacityGap> {
        if !schedule.is_delayed || schedule.daily_capacity == 0 {
            return None;
        }

        let capacity = Decimal::from(schedule.daily_capacity);
        let gap_quantity = Decimal::from(schedule.delay_days) * capacity;
        let gap_rate = if schedule.total_requirement > Decimal::ZERO {
            (gap_quantity / schedule.total_requirement).round_dp(4)
        } else {
            Decimal::ZERO
        };
        let increase = capacity_increase(gap_quantity, schedule.delay_days);

        Some(CapacityGap {
            gap_quantity,
            gap_rate,
            recommended_daily_capacity: (capacity + increase).trunc().to_u64().unwrap_or(0),
        })
    }

    /// 檢測瓶頸物料
    ///
    /// 正常物料不列入；按影響程度由大到小排序，相同時保留排產順序。
    pub fn detect(&self, schedules: &[ScheduleResult]) -> Vec<BottleneckRecord> {
        let mut records: Vec<BottleneckRecord> = schedules
            .iter()
            .filter_map(|schedule| {
                let classification = self.classify(schedule);
                if classification == BottleneckClass::Normal {
                    return None;
                }
                Some(BottleneckRecord {
                    material_code: schedule.material_code.clone(),
                    classification,
                    daily_capacity: schedule.daily_capacity,
                    total_requirement: schedule.total_requirement,
                    avg_utilization: schedule.avg_utilization,
                    delay_days: schedule.delay_days,
                    impact_score: Self::impact_score(schedule),
                    capacity_gap: Self::capacity_gap(schedule),
                })
            })
            .collect();

        records.sort_by(|a, b| b.impact_score.cmp(&a.impact_score));

        tracing::info!("完成瓶頸匯總，發現 {} 個瓶頸物料", records.len());
        records
    }

    /// 產能提升建議
    ///
    /// 按缺口數量由大到小排序。
    pub fn recommendations(&self, schedules: &[ScheduleResult]) -> Vec<CapacityRecommendation> {
        let mut gaps: Vec<(&ScheduleResult, CapacityGap)> = schedules
            .iter()
            .filter_map(|s| Self::capacity_gap(s).map(|gap| (s, gap)))
            .collect();
        gaps.sort_by(|a, b| b.1.gap_quantity.cmp(&a.1.gap_quantity));

        gaps.into_iter()
            .map(|(schedule, gap)| {
                let capacity = Decimal::from(schedule.daily_capacity);
                let increase = capacity_increase(gap.gap_quantity, schedule.delay_days);

                CapacityRecommendation {
                    material_code: schedule.material_code.clone(),
                    current_daily_capacity: schedule.daily_capacity,
                    recommended_daily_capacity: gap.recommended_daily_capacity,
                    capacity_increase: increase.trunc().to_u64().unwrap_or(0),
                    increase_rate_pct: (increase / capacity * Decimal::ONE_HUNDRED).round_dp(2),
                    eliminated_delay_days: schedule.delay_days,
                }
            })
            .collect()
    }
}

/// 消除延期所需的日產能增量；延期天數為 0 時為 0
fn capacity_increase(gap_quantity: Decimal, delay_days: i64) -> Decimal {
    if delay_days > 0 {
        gap_quantity / Decimal::from(delay_days)
    } else {
        Decimal::ZERO
    }
}

/// 取影響程度最高的前 N 個瓶頸
pub fn top_bottlenecks(records: &[BottleneckRecord], n: usize) -> &[BottleneckRecord] {
    &records[..records.len().min(n)]
}
