//! 計劃參數配置

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar::WorkCalendar;
use crate::{MrpError, Result};

/// 交期評估的全域參數
///
/// 每個計算元件在建構時取得一份不可變的配置，不存在全域狀態。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningConfig {
    /// 工作日曆（工作日與節假日）
    pub calendar: WorkCalendar,

    /// 紅色預警：延期天數 >= 此值
    pub red_threshold_days: i64,

    /// 黃色預警：延期天數 >= 此值
    pub yellow_threshold_days: i64,

    /// 產能緊張判定：平均產能利用率 >= 此值
    pub utilization_threshold: Decimal,

    /// BOM 最大層級深度
    pub max_bom_level: u32,

    /// 最小有效數量（避免浮點誤差造成的極小值）
    pub min_quantity: Decimal,

    /// 無法排產時使用的延期天數哨兵值
    pub unschedulable_delay_days: i64,

    /// 報表中列出的瓶頸物料數量
    pub top_bottleneck_count: usize,
}

impl PlanningConfig {
    /// 創建預設配置（週一到週五工作日）
    pub fn new() -> Self {
        Self {
            calendar: WorkCalendar::default(),
            red_threshold_days: 7,
            yellow_threshold_days: 1,
            utilization_threshold: Decimal::new(9, 1),
            max_bom_level: 10,
            min_quantity: Decimal::new(1, 3),
            unschedulable_delay_days: 9999,
            top_bottleneck_count: 10,
        }
    }

    /// 建構器模式：設置工作日曆
    pub fn with_calendar(mut self, calendar: WorkCalendar) -> Self {
        self.calendar = calendar;
        self
    }

    /// 建構器模式：設置預警閾值
    pub fn with_alert_thresholds(mut self, yellow_days: i64, red_days: i64) -> Self {
        self.yellow_threshold_days = yellow_days;
        self.red_threshold_days = red_days;
        self
    }

    /// 建構器模式：設置產能利用率閾值
    pub fn with_utilization_threshold(mut self, threshold: Decimal) -> Self {
        self.utilization_threshold = threshold;
        self
    }

    /// 建構器模式：設置 BOM 最大層級
    pub fn with_max_bom_level(mut self, level: u32) -> Self {
        self.max_bom_level = level;
        self
    }

    /// 建構器模式：設置最小有效數量
    pub fn with_min_quantity(mut self, min_quantity: Decimal) -> Self {
        self.min_quantity = min_quantity;
        self
    }

    /// 檢查配置是否可用
    pub fn validate(&self) -> Result<()> {
        self.calendar.validate()?;

        if self.yellow_threshold_days < 1 {
            return Err(MrpError::InvalidConfig(format!(
                "黃色預警閾值必須 >= 1，目前為 {}",
                self.yellow_threshold_days
            )));
        }

        if self.yellow_threshold_days > self.red_threshold_days {
            return Err(MrpError::InvalidConfig(format!(
                "黃色預警閾值 {} 大於紅色預警閾值 {}",
                self.yellow_threshold_days, self.red_threshold_days
            )));
        }

        if self.utilization_threshold <= Decimal::ZERO || self.utilization_threshold > Decimal::ONE
        {
            return Err(MrpError::InvalidConfig(format!(
                "產能利用率閾值必須介於 0 與 1 之間，目前為 {}",
                self.utilization_threshold
            )));
        }

        if self.max_bom_level == 0 {
            return Err(MrpError::InvalidConfig("BOM 最大層級必須 >= 1".to_string()));
        }

        if self.min_quantity < Decimal::ZERO {
            return Err(MrpError::InvalidConfig(format!(
                "最小有效數量不可為負，目前為 {}",
                self.min_quantity
            )));
        }

        Ok(())
    }
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self::new()
    }
}
