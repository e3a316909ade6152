//! 輸入資料驗證
//!
//! 在任何計算開始前一次性檢查所有輸入，收集全部問題後一併回報。
//! 循環引用不在此處檢查，由 BOM 圖在展開前負責。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::bom::BomEdge;
use crate::capacity::CapacityRecord;
use crate::config::PlanningConfig;
use crate::order::CustomerOrder;
use crate::{MrpError, Result};

/// 資料來源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    Orders,
    Bom,
    Capacity,
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DatasetKind::Orders => "訂單資料",
            DatasetKind::Bom => "BOM資料",
            DatasetKind::Capacity => "產能資料",
        };
        f.write_str(name)
    }
}

/// 單一驗證問題
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub dataset: DatasetKind,

    /// 記錄索引（從 0 開始）
    pub row: usize,

    pub field: String,

    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} 第 {} 筆，欄位 '{}': {}",
            self.dataset, self.row, self.field, self.message
        )
    }
}

/// 資料驗證器
pub struct DatasetValidator<'a> {
    config: &'a PlanningConfig,
    issues: Vec<ValidationIssue>,
}

impl<'a> DatasetValidator<'a> {
    pub fn new(config: &'a PlanningConfig) -> Self {
        Self {
            config,
            issues: Vec::new(),
        }
    }

    /// 驗證全部輸入，有任何問題即返回 `MrpError::Validation`
    pub fn validate(
        mut self,
        orders: &[CustomerOrder],
        bom: &[BomEdge],
        capacity: &[CapacityRecord],
    ) -> Result<()> {
        self.check_orders(orders);
        self.check_bom(bom);
        self.check_capacity(capacity);

        if self.issues.is_empty() {
            Ok(())
        } else {
            for issue in &self.issues {
                tracing::warn!("{}", issue);
            }
            Err(MrpError::Validation(self.issues))
        }
    }

    fn push(&mut self, dataset: DatasetKind, row: usize, field: &str, message: String) {
        self.issues.push(ValidationIssue {
            dataset,
            row,
            field: field.to_string(),
            message,
        });
    }

    fn check_orders(&mut self, orders: &[CustomerOrder]) {
        let mut seen = HashSet::new();

        for (row, order) in orders.iter().enumerate() {
            if order.order_id.trim().is_empty() {
                self.push(DatasetKind::Orders, row, "order_id", "訂單號為空".to_string());
            } else if !seen.insert(order.order_id.as_str()) {
                self.push(
                    DatasetKind::Orders,
                    row,
                    "order_id",
                    format!("訂單號重複: {}", order.order_id),
                );
            }

            if order.product_code.trim().is_empty() {
                self.push(DatasetKind::Orders, row, "product_code", "產品型號為空".to_string());
            }

            if order.quantity <= self.config.min_quantity {
                self.push(
                    DatasetKind::Orders,
                    row,
                    "quantity",
                    format!("數量必須為正數，目前為 {}", order.quantity),
                );
            }

            if order.start_date > order.due_date {
                self.push(
                    DatasetKind::Orders,
                    row,
                    "start_date",
                    format!(
                        "開工日期 {} 晚於交付日期 {}",
                        order.start_date, order.due_date
                    ),
                );
            }
        }
    }

    fn check_bom(&mut self, bom: &[BomEdge]) {
        let max_level = self.config.max_bom_level;

        for (row, edge) in bom.iter().enumerate() {
            if edge.parent_code.trim().is_empty() {
                self.push(DatasetKind::Bom, row, "parent_code", "父物料編碼為空".to_string());
            }

            if edge.child_code.trim().is_empty() {
                self.push(DatasetKind::Bom, row, "child_code", "子物料編碼為空".to_string());
            }

            if edge.usage_per_parent <= self.config.min_quantity {
                self.push(
                    DatasetKind::Bom,
                    row,
                    "usage_per_parent",
                    format!("用量必須為正數，目前為 {}", edge.usage_per_parent),
                );
            }

            if edge.level < 1 || edge.level > max_level {
                self.push(
                    DatasetKind::Bom,
                    row,
                    "level",
                    format!("BOM層級 {} 超出範圍 1..={}", edge.level, max_level),
                );
            }
        }
    }

    fn check_capacity(&mut self, capacity: &[CapacityRecord]) {
        for (row, record) in capacity.iter().enumerate() {
            if record.material_code.trim().is_empty() {
                self.push(
                    DatasetKind::Capacity,
                    row,
                    "material_code",
                    "物料編碼為空".to_string(),
                );
            }

            if record.daily_capacity_limit == 0 {
                self.push(
                    DatasetKind::Capacity,
                    row,
                    "daily_capacity_limit",
                    "日產能上限必須為正數".to_string(),
                );
            }
        }
    }
}

/// 便利函式：以指定配置驗證資料
pub fn validate_dataset(
    config: &PlanningConfig,
    orders: &[CustomerOrder],
    bom: &[BomEdge],
    capacity: &[CapacityRecord],
) -> Result<()> {
    DatasetValidator::new(config).validate(orders, bom, capacity)
}

/// 數量是否可視為零
pub fn is_negligible(quantity: Decimal, min_quantity: Decimal) -> bool {
    quantity.abs() < min_quantity
}
