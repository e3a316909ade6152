//! BOM 關係模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{MrpError, Result};

/// BOM 父子關係（一條邊）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomEdge {
    /// 父物料編碼
    pub parent_code: String,

    /// 子物料編碼
    pub child_code: String,

    /// 單位父件用量
    pub usage_per_parent: Decimal,

    /// BOM 層級（1 = 成品的直接子件）
    pub level: u32,

    /// 生產周期（工作日）
    pub lead_time_days: u32,
}

impl BomEdge {
    pub fn new(
        parent_code: impl Into<String>,
        child_code: impl Into<String>,
        usage_per_parent: Decimal,
        level: u32,
        lead_time_days: u32,
    ) -> Self {
        Self {
            parent_code: parent_code.into(),
            child_code: child_code.into(),
            usage_per_parent,
            level,
            lead_time_days,
        }
    }

    pub fn is_self_reference(&self) -> bool {
        self.parent_code == self.child_code
    }

    /// 子件需求量 = 父件數量 × 用量
    pub fn child_quantity(&self, parent_quantity: Decimal) -> Result<Decimal> {
        parent_quantity
            .checked_mul(self.usage_per_parent)
            .ok_or_else(|| MrpError::QuantityOverflow {
                material_code: self.child_code.clone(),
            })
    }
}
