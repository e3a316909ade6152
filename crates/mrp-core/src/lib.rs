//! # MRP Core
//!
//! 核心資料模型與類型定義：訂單、BOM 關係、產能表、工作日曆、
//! 計劃參數，以及各計算階段產出的衍生記錄。

pub mod bom;
pub mod calendar;
pub mod capacity;
pub mod config;
pub mod delivery;
pub mod order;
pub mod requirement;
pub mod schedule;
pub mod validation;

use std::fmt;

// Re-export 主要類型
pub use bom::BomEdge;
pub use calendar::WorkCalendar;
pub use capacity::{CapacityRecord, CapacityTable, DuplicateCapacity};
pub use config::PlanningConfig;
pub use delivery::{
    AlertLevel, BottleneckClass, BottleneckRecord, CapacityGap, CapacityRecommendation,
    DeliveryVerdict,
};
pub use order::{earliest_start_date, CustomerOrder};
pub use requirement::{DemandDetail, MaterialRequirement};
pub use schedule::{DailyProduction, ScheduleResult, ScheduleStatus};
pub use validation::{validate_dataset, DatasetKind, DatasetValidator, ValidationIssue};

/// BOM 循環引用錯誤
///
/// `path` 從被重新進入的節點開始，繞一圈回到自己，
/// 例如 `["A", "B", "C", "A"]`。自引用為 `["A", "A"]`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleError {
    pub path: Vec<String>,
}

impl CycleError {
    pub fn new(path: Vec<String>) -> Self {
        Self { path }
    }

    /// 自引用（父件 == 子件）
    pub fn self_loop(material_code: &str) -> Self {
        Self {
            path: vec![material_code.to_string(), material_code.to_string()],
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.path.len() == 2 && self.path[0] == self.path[1]
    }
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.join(" -> "))
    }
}

impl std::error::Error for CycleError {}

/// MRP 錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum MrpError {
    #[error("BOM 存在循環引用: {0}")]
    Cycle(#[from] CycleError),

    #[error("BOM 展開深度超過上限 {max_level}（物料 {material_code}）")]
    BomDepthExceeded { material_code: String, max_level: u32 },

    #[error("無效的工作日曆: {0}")]
    InvalidCalendar(String),

    #[error("無效的計劃參數: {0}")]
    InvalidConfig(String),

    #[error("無效的日期: {0}")]
    InvalidDate(String),

    #[error("數量溢出（物料 {material_code}）")]
    QuantityOverflow { material_code: String },

    #[error("資料驗證失敗，共 {} 項問題", .0.len())]
    Validation(Vec<ValidationIssue>),
}

pub type Result<T> = std::result::Result<T, MrpError>;
