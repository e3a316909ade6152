//! 客戶訂單模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

fn default_priority() -> u8 {
    5
}

/// 客戶訂單（獨立需求）
///
/// 載入後不可變；所有衍生結果每次計算都重新產生。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerOrder {
    /// 訂單號（唯一）
    pub order_id: String,

    /// 產品型號（BOM 頂層物料）
    pub product_code: String,

    /// 訂購數量
    pub quantity: Decimal,

    /// 生產開工日期
    pub start_date: NaiveDate,

    /// 要求交付日期
    pub due_date: NaiveDate,

    /// 優先級（1-10，預設 5）
    #[serde(default = "default_priority")]
    pub priority: u8,
}

impl CustomerOrder {
    /// 創建新的訂單
    pub fn new(
        order_id: String,
        product_code: String,
        quantity: Decimal,
        start_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            order_id,
            product_code,
            quantity,
            start_date,
            due_date,
            priority: default_priority(),
        }
    }

    /// 建構器模式：設置優先級
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority.min(10);
        self
    }
}

/// 所有訂單中最早的開工日期（排產起點）
pub fn earliest_start_date(orders: &[CustomerOrder]) -> Option<NaiveDate> {
    orders.iter().map(|o| o.start_date).min()
}
