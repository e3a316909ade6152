//! 有限產能排產
//!
//! 每個物料各自擁有一條產線，從統一的開工日起逐日模擬：
//! 工作日以日產能全力生產，直到累計產量達到總需求量為止。

use chrono::NaiveDate;
use mrp_core::validation::is_negligible;
use mrp_core::{
    CapacityTable, DailyProduction, MaterialRequirement, MrpError, PlanningConfig, ScheduleResult,
    ScheduleStatus,
};
use rayon::prelude::*;
use rust_decimal::Decimal;

/// 單一物料的生產模擬結果
struct ProductionRun {
    finish_date: NaiveDate,
    daily_detail: Vec<DailyProduction>,
}

/// 產能排產器
pub struct CapacityScheduler<'a> {
    /// 產能表（已去重）
    capacity: &'a CapacityTable,

    /// 計劃參數
    config: &'a PlanningConfig,
}

impl<'a> CapacityScheduler<'a> {
    /// 創建排產器
    pub fn new(capacity: &'a CapacityTable, config: &'a PlanningConfig) -> Self {
        Self { capacity, config }
    }

    /// 對所有物料需求排產
    ///
    /// 物料之間互不影響，並行計算後按輸入順序收集。
    pub fn schedule(
        &self,
        requirements: &[MaterialRequirement],
        start_date: NaiveDate,
    ) -> mrp_core::Result<Vec<ScheduleResult>> {
        self.config.calendar.validate()?;

        tracing::info!(
            "開始產能排產：物料 {} 個，開工日期 {}",
            requirements.len(),
            start_date
        );

        let results = requirements
            .par_iter()
            .map(|requirement| self.schedule_material(requirement, start_date))
            .collect::<mrp_core::Result<Vec<_>>>()?;

        let delayed = results.iter().filter(|r| r.is_delayed).count();
        tracing::info!(
            "完成產能排產，共 {} 個物料，延期 {} 個",
            results.len(),
            delayed
        );

        Ok(results)
    }

    /// 單一物料排產
    pub fn schedule_material(
        &self,
        requirement: &MaterialRequirement,
        start_date: NaiveDate,
    ) -> mrp_core::Result<ScheduleResult> {
        let material_code = &requirement.material_code;
        let total = requirement.total_quantity;
        let required_date = requirement.earliest_required_date;

        let daily_capacity = match self.capacity.daily_capacity(material_code) {
            Some(limit) if limit > 0 => limit,
            _ => {
                tracing::warn!("物料 {} 沒有產能資料，無法排產", material_code);
                return Ok(ScheduleResult::no_capacity(
                    material_code.clone(),
                    total,
                    start_date,
                    required_date,
                    self.config.unschedulable_delay_days,
                ));
            }
        };

        // 需求已滿足：開工當日即完成，不產生排產明細
        if total <= Decimal::ZERO || is_negligible(total, self.config.min_quantity) {
            tracing::debug!("物料 {} 需求量為 {}，無需生產", material_code, total);
            return Ok(ScheduleResult {
                material_code: material_code.clone(),
                total_requirement: total,
                daily_capacity,
                schedule_start_date: start_date,
                estimated_finish_date: Some(start_date),
                required_date,
                is_delayed: false,
                delay_days: 0,
                production_days: 0,
                avg_utilization: Decimal::ZERO,
                status: ScheduleStatus::Normal,
                daily_detail: Vec::new(),
            });
        }

        let run = self.simulate(material_code, total, daily_capacity, start_date)?;

        let is_delayed = run.finish_date > required_date;
        let delay_days = if is_delayed {
            (run.finish_date - required_date).num_days()
        } else {
            0
        };

        let production_days = run.daily_detail.len() as u32;
        let avg_utilization = average_utilization(&run.daily_detail);

        tracing::debug!(
            "物料 {} 排產完成：日產能 {}，生產 {} 天，完成日 {}，延期 {} 天",
            material_code,
            daily_capacity,
            production_days,
            run.finish_date,
            delay_days
        );

        Ok(ScheduleResult {
            material_code: material_code.clone(),
            total_requirement: total,
            daily_capacity,
            schedule_start_date: start_date,
            estimated_finish_date: Some(run.finish_date),
            required_date,
            is_delayed,
            delay_days,
            production_days,
            avg_utilization,
            status: if is_delayed {
                ScheduleStatus::Delayed
            } else {
                ScheduleStatus::Normal
            },
            daily_detail: run.daily_detail,
        })
    }

    /// 逐日模擬生產
    ///
    /// 呼叫端保證 `total > 0`、`daily_capacity > 0` 且日曆至少有一個工作日，
    /// 每個工作日剩餘需求嚴格遞減，因此迴圈必定結束。
    fn simulate(
        &self,
        material_code: &str,
        total: Decimal,
        daily_capacity: u32,
        start_date: NaiveDate,
    ) -> mrp_core::Result<ProductionRun> {
        let calendar = &self.config.calendar;
        let capacity = Decimal::from(daily_capacity);

        // 每天都開工也排不完時，不必逐日走到日期上限
        let days_needed = (total / capacity).ceil();
        let days_left = (NaiveDate::MAX - start_date).num_days();
        if days_needed > Decimal::from(days_left) {
            return Err(MrpError::InvalidDate(format!(
                "物料 {} 需 {} 個工作日，超出日期範圍",
                material_code, days_needed
            )));
        }

        let overflow = || MrpError::QuantityOverflow {
            material_code: material_code.to_string(),
        };

        let mut daily_detail = Vec::new();
        let mut cumulative = Decimal::ZERO;
        let mut current = start_date;

        loop {
            if calendar.is_working_day(current) {
                let planned = capacity.min(total.checked_sub(cumulative).ok_or_else(overflow)?);
                cumulative = cumulative.checked_add(planned).ok_or_else(overflow)?;
                let remaining = total.checked_sub(cumulative).ok_or_else(overflow)?;

                daily_detail.push(DailyProduction {
                    date: current,
                    planned_qty: planned,
                    cumulative_qty: cumulative,
                    remaining_qty: remaining,
                    utilization: (planned / capacity).round_dp(4),
                });

                if remaining <= Decimal::ZERO || is_negligible(remaining, self.config.min_quantity)
                {
                    return Ok(ProductionRun {
                        finish_date: current,
                        daily_detail,
                    });
                }
            }

            current = current
                .succ_opt()
                .ok_or_else(|| MrpError::InvalidDate(format!("排產日期溢出: {}", current)))?;
        }
    }
}

/// 每日利用率的算術平均（四位小數），沒有明細時為 0
fn average_utilization(daily_detail: &[DailyProduction]) -> Decimal {
    if daily_detail.is_empty() {
        return Decimal::ZERO;
    }
    let sum: Decimal = daily_detail.iter().map(|d| d.utilization).sum();
    (sum / Decimal::from(daily_detail.len())).round_dp(4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrp_core::{DemandDetail, WorkCalendar};
    use rstest::rstest;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn requirement(code: &str, qty: Decimal, required: NaiveDate) -> MaterialRequirement {
        MaterialRequirement::new(
            code.to_string(),
            1,
            2,
            DemandDetail {
                order_id: "SO-1".to_string(),
                quantity: qty,
                latest_required_date: required,
                parent_code: "P".to_string(),
            },
        )
    }

    fn capacity(code: &str, limit: u32) -> CapacityTable {
        let mut table = CapacityTable::new();
        table.insert(code, limit);
        table
    }

    #[test]
    fn test_single_day_production() {
        let table = capacity("C", 1000);
        let config = PlanningConfig::default();
        let scheduler = CapacityScheduler::new(&table, &config);

        // 2025-11-03 週一開工，11/13 前需完成
        let result = scheduler
            .schedule_material(&requirement("C", Decimal::from(1000), date(11, 13)), date(11, 3))
            .unwrap();

        assert_eq!(result.estimated_finish_date, Some(date(11, 3)));
        assert_eq!(result.production_days, 1);
        assert!(!result.is_delayed);
        assert_eq!(result.delay_days, 0);
        assert_eq!(result.avg_utilization, Decimal::ONE);
        assert_eq!(result.status, ScheduleStatus::Normal);
    }

    #[test]
    fn test_multi_day_production_skips_weekends() {
        let table = capacity("C", 100);
        let config = PlanningConfig::default();
        let scheduler = CapacityScheduler::new(&table, &config);

        // 週四開工，250 件需三個工作日：週四、週五、下週一
        let result = scheduler
            .schedule_material(&requirement("C", Decimal::from(250), date(11, 20)), date(11, 6))
            .unwrap();

        let dates: Vec<_> = result.daily_detail.iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![date(11, 6), date(11, 7), date(11, 10)]);
        assert_eq!(result.estimated_finish_date, Some(date(11, 10)));

        let last = &result.daily_detail[2];
        assert_eq!(last.planned_qty, Decimal::from(50));
        assert_eq!(last.cumulative_qty, Decimal::from(250));
        assert_eq!(last.remaining_qty, Decimal::ZERO);
        assert_eq!(last.utilization, Decimal::new(5, 1));

        // (1 + 1 + 0.5) / 3
        assert_eq!(result.avg_utilization, Decimal::new(8333, 4));
    }

    #[test]
    fn test_delay_counts_calendar_days() {
        let table = capacity("C", 100);
        let config = PlanningConfig::default();
        let scheduler = CapacityScheduler::new(&table, &config);

        // 1000 件需 10 個工作日：11/3 開工，11/14 完成；要求 11/7
        let result = scheduler
            .schedule_material(&requirement("C", Decimal::from(1000), date(11, 7)), date(11, 3))
            .unwrap();

        assert_eq!(result.production_days, 10);
        assert_eq!(result.estimated_finish_date, Some(date(11, 14)));
        assert!(result.is_delayed);
        assert_eq!(result.delay_days, 7);
        assert_eq!(result.status, ScheduleStatus::Delayed);
    }

    #[rstest]
    #[case(Decimal::ZERO)]
    #[case(Decimal::from(-5))]
    #[case(Decimal::new(1, 4))]
    fn test_satisfied_requirement_finishes_on_start_date(#[case] total: Decimal) {
        let table = capacity("C", 100);
        let config = PlanningConfig::default();
        let scheduler = CapacityScheduler::new(&table, &config);

        let result = scheduler
            .schedule_material(&requirement("C", total, date(11, 1)), date(11, 3))
            .unwrap();

        assert_eq!(result.production_days, 0);
        assert_eq!(result.estimated_finish_date, Some(date(11, 3)));
        assert_eq!(result.delay_days, 0);
        assert!(!result.is_delayed);
        assert!(result.daily_detail.is_empty());
    }

    #[rstest]
    #[case(CapacityTable::new())]
    #[case(capacity("C", 0))]
    fn test_missing_capacity_is_unschedulable(#[case] table: CapacityTable) {
        let config = PlanningConfig::default();
        let scheduler = CapacityScheduler::new(&table, &config);

        let result = scheduler
            .schedule_material(&requirement("C", Decimal::from(10), date(11, 7)), date(11, 3))
            .unwrap();

        assert_eq!(result.status, ScheduleStatus::NoCapacityData);
        assert_eq!(result.estimated_finish_date, None);
        assert_eq!(result.delay_days, 9999);
        assert!(result.is_delayed);
        assert_eq!(result.daily_capacity, 0);
        assert_eq!(result.avg_utilization, Decimal::ZERO);
    }

    #[test]
    fn test_schedule_keeps_input_order() {
        let mut table = CapacityTable::new();
        table.insert("A", 10);
        table.insert("C", 5);
        let config = PlanningConfig::default().with_calendar(WorkCalendar::new_24_7("24/7".into()));
        let scheduler = CapacityScheduler::new(&table, &config);

        let requirements = vec![
            requirement("C", Decimal::from(20), date(11, 5)),
            requirement("B", Decimal::from(20), date(11, 5)),
            requirement("A", Decimal::from(20), date(11, 5)),
        ];
        let results = scheduler.schedule(&requirements, date(11, 1)).unwrap();

        let codes: Vec<_> = results.iter().map(|r| r.material_code.as_str()).collect();
        assert_eq!(codes, vec!["C", "B", "A"]);
        assert_eq!(results[0].estimated_finish_date, Some(date(11, 4)));
        assert_eq!(results[1].status, ScheduleStatus::NoCapacityData);
        assert_eq!(results[2].estimated_finish_date, Some(date(11, 2)));
    }

    #[test]
    fn test_calendar_without_working_days_is_rejected() {
        let table = capacity("C", 10);
        let config = PlanningConfig::default()
            .with_calendar(WorkCalendar::default().with_working_days([false; 7]));
        let scheduler = CapacityScheduler::new(&table, &config);

        let err = scheduler
            .schedule(&[requirement("C", Decimal::from(10), date(11, 7))], date(11, 3))
            .unwrap_err();
        assert!(matches!(err, MrpError::InvalidCalendar(_)));
    }

    #[rstest]
    #[case(Decimal::MAX, 1)]
    #[case(Decimal::MAX, u32::MAX)]
    fn test_requirement_beyond_date_range_is_error(#[case] total: Decimal, #[case] limit: u32) {
        let table = capacity("C", limit);
        let config = PlanningConfig::default();
        let scheduler = CapacityScheduler::new(&table, &config);

        let err = scheduler
            .schedule_material(&requirement("C", total, date(11, 7)), date(11, 3))
            .unwrap_err();
        assert!(matches!(err, MrpError::InvalidDate(_)));
    }

    #[test]
    fn test_large_requirement_keeps_exact_totals() {
        let table = capacity("C", u32::MAX);
        let config = PlanningConfig::default().with_calendar(WorkCalendar::new_24_7("24/7".into()));
        let scheduler = CapacityScheduler::new(&table, &config);

        // 三天的量再加 0.5
        let total = Decimal::from(u32::MAX) * Decimal::from(3) + Decimal::new(5, 1);
        let result = scheduler
            .schedule_material(&requirement("C", total, date(11, 7)), date(11, 3))
            .unwrap();

        assert_eq!(result.production_days, 4);
        assert_eq!(result.estimated_finish_date, Some(date(11, 6)));
        let last = result.daily_detail.last().unwrap();
        assert_eq!(last.cumulative_qty, total);
        assert_eq!(last.remaining_qty, Decimal::ZERO);
        assert_eq!(last.planned_qty, Decimal::new(5, 1));
    }
}
