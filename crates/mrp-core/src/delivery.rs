//! 交付判定與瓶頸模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 訂單預警等級
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertLevel {
    /// 正常
    Normal,
    /// 黃色預警
    Yellow,
    /// 紅色預警
    Red,
    /// 無法排產
    Unschedulable,
}

/// 訂單交付判定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryVerdict {
    /// 訂單號
    pub order_id: String,

    /// 產品型號
    pub product_code: String,

    /// 要求交付日期
    pub due_date: NaiveDate,

    /// 預計完成日期（None 表示無法排產）
    pub estimated_finish_date: Option<NaiveDate>,

    /// 能否按時交付
    pub can_deliver: bool,

    /// 延期天數
    pub delay_days: i64,

    /// 瓶頸物料（關鍵路徑上最晚完成的物料）
    pub bottleneck_material: Option<String>,

    /// 預警等級
    pub alert_level: AlertLevel,

    /// 涉及物料數
    pub involved_material_count: usize,
}

impl DeliveryVerdict {
    pub fn is_late(&self) -> bool {
        !self.can_deliver
    }
}

/// 瓶頸分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BottleneckClass {
    /// 正常（不列入瓶頸清單）
    Normal,
    /// 產能緊張
    CapacityTight,
    /// 產能不足，已延期
    InsufficientCapacity,
}

/// 產能缺口
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityGap {
    /// 缺口數量 = 延期天數 × 日產能
    pub gap_quantity: Decimal,

    /// 缺口率 = 缺口數量 / 總需求量
    pub gap_rate: Decimal,

    /// 建議日產能（取整）
    pub recommended_daily_capacity: u64,
}

/// 瓶頸物料記錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BottleneckRecord {
    /// 物料編碼
    pub material_code: String,

    /// 瓶頸分類
    pub classification: BottleneckClass,

    /// 日產能
    pub daily_capacity: u32,

    /// 總需求量
    pub total_requirement: Decimal,

    /// 平均產能利用率
    pub avg_utilization: Decimal,

    /// 延期天數
    pub delay_days: i64,

    /// 影響程度（排序用）
    pub impact_score: Decimal,

    /// 產能缺口（僅延期物料）
    pub capacity_gap: Option<CapacityGap>,
}

/// 產能提升建議
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityRecommendation {
    pub material_code: String,

    /// 當前日產能
    pub current_daily_capacity: u32,

    /// 建議日產能
    pub recommended_daily_capacity: u64,

    /// 需提升產能
    pub capacity_increase: u64,

    /// 提升比例（%）
    pub increase_rate_pct: Decimal,

    /// 可消除的延期天數
    pub eliminated_delay_days: i64,
}
