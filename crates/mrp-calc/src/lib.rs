//! # MRP Calculation Engine
//!
//! BOM 圖、生產周期推算與多層 BOM 展開的需求彙總

pub mod bom_graph;
pub mod calculator;
pub mod lead_time;

use mrp_core::MaterialRequirement;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// Re-export 主要類型
pub use bom_graph::BomGraph;
pub use calculator::MrpCalculator;
pub use lead_time::LeadTimeCalculator;

/// MRP 計算結果
#[derive(Debug, Clone)]
pub struct MrpResult {
    /// 物料需求（按層級、最早要求日期排序）
    pub requirements: Vec<MaterialRequirement>,

    /// 警告信息
    pub warnings: Vec<MrpWarning>,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}

impl MrpResult {
    /// 創建空的計算結果
    pub fn empty() -> Self {
        Self {
            requirements: Vec::new(),
            warnings: Vec::new(),
            calculation_time_ms: None,
        }
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: MrpWarning) {
        self.warnings.push(warning);
    }

    /// 按物料編碼查找需求
    pub fn requirement(&self, material_code: &str) -> Option<&MaterialRequirement> {
        self.requirements
            .iter()
            .find(|r| r.material_code == material_code)
    }

    pub fn summary(&self) -> RequirementSummary {
        RequirementSummary::from_requirements(&self.requirements)
    }
}

/// MRP 警告（不影響計算，但需要人工確認的情況）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MrpWarning {
    pub component_id: String,
    pub message: String,
}

impl MrpWarning {
    pub fn new(component_id: String, message: String) -> Self {
        Self {
            component_id,
            message,
        }
    }
}

/// 需求彙總統計
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequirementSummary {
    /// 物料數
    pub material_count: usize,

    /// 所有物料需求量合計
    pub total_quantity: Decimal,

    /// 各層級的物料數
    pub level_distribution: BTreeMap<u32, usize>,
}

impl RequirementSummary {
    pub fn from_requirements(requirements: &[MaterialRequirement]) -> Self {
        let mut summary = Self {
            material_count: requirements.len(),
            ..Self::default()
        };
        for requirement in requirements {
            summary.total_quantity += requirement.total_quantity;
            *summary
                .level_distribution
                .entry(requirement.level)
                .or_insert(0) += 1;
        }
        summary
    }
}
