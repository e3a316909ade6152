//! 排產結果模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 物料排產狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScheduleStatus {
    /// 按時完成
    Normal,
    /// 延期
    Delayed,
    /// 無產能資料，無法排產
    NoCapacityData,
}

/// 單日排產明細
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyProduction {
    /// 生產日期
    pub date: NaiveDate,

    /// 計劃產量
    pub planned_qty: Decimal,

    /// 累計產量
    pub cumulative_qty: Decimal,

    /// 剩餘需求
    pub remaining_qty: Decimal,

    /// 產能利用率（四位小數）
    pub utilization: Decimal,
}

/// 單一物料的排產結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleResult {
    /// 物料編碼
    pub material_code: String,

    /// 總需求量
    pub total_requirement: Decimal,

    /// 日產能（無產能資料時為 0）
    pub daily_capacity: u32,

    /// 排產開工日期
    pub schedule_start_date: NaiveDate,

    /// 預計完成日期（None 表示無法排產）
    pub estimated_finish_date: Option<NaiveDate>,

    /// 要求完成日期
    pub required_date: NaiveDate,

    /// 是否延期
    pub is_delayed: bool,

    /// 延期天數（日曆天）
    pub delay_days: i64,

    /// 生產天數
    pub production_days: u32,

    /// 平均產能利用率
    pub avg_utilization: Decimal,

    /// 產能狀態
    pub status: ScheduleStatus,

    /// 排產明細
    pub daily_detail: Vec<DailyProduction>,
}

impl ScheduleResult {
    /// 創建無產能資料的排產結果
    pub fn no_capacity(
        material_code: String,
        total_requirement: Decimal,
        schedule_start_date: NaiveDate,
        required_date: NaiveDate,
        sentinel_delay_days: i64,
    ) -> Self {
        Self {
            material_code,
            total_requirement,
            daily_capacity: 0,
            schedule_start_date,
            estimated_finish_date: None,
            required_date,
            is_delayed: true,
            delay_days: sentinel_delay_days,
            production_days: 0,
            avg_utilization: Decimal::ZERO,
            status: ScheduleStatus::NoCapacityData,
            daily_detail: Vec::new(),
        }
    }

    /// 是否有預計完成日期
    pub fn is_schedulable(&self) -> bool {
        self.estimated_finish_date.is_some()
    }
}
