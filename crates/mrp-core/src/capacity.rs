//! 產能模型

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 單一物料的日產能記錄
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityRecord {
    /// 物料編碼
    pub material_code: String,

    /// 日產能上限
    pub daily_capacity_limit: u32,
}

impl CapacityRecord {
    pub fn new(material_code: impl Into<String>, daily_capacity_limit: u32) -> Self {
        Self {
            material_code: material_code.into(),
            daily_capacity_limit,
        }
    }
}

/// 去重時被捨棄的產能記錄
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateCapacity {
    pub material_code: String,
    pub kept_limit: u32,
    pub dropped_limit: u32,
}

/// 產能表（每個物料僅一筆）
#[derive(Debug, Clone, Default)]
pub struct CapacityTable {
    limits: HashMap<String, u32>,
}

impl CapacityTable {
    /// 創建空的產能表
    pub fn new() -> Self {
        Self::default()
    }

    /// 從原始記錄建立產能表
    ///
    /// 同一物料出現多次時保留第一筆，其餘記錄回傳給呼叫端。
    pub fn from_records(records: &[CapacityRecord]) -> (Self, Vec<DuplicateCapacity>) {
        let mut table = Self::new();
        let mut duplicates = Vec::new();

        for record in records {
            match table.limits.get(&record.material_code) {
                Some(&kept_limit) => {
                    tracing::warn!(
                        "產能資料中物料 {} 重複，保留第一筆記錄（{}），捨棄 {}",
                        record.material_code,
                        kept_limit,
                        record.daily_capacity_limit
                    );
                    duplicates.push(DuplicateCapacity {
                        material_code: record.material_code.clone(),
                        kept_limit,
                        dropped_limit: record.daily_capacity_limit,
                    });
                }
                None => {
                    table
                        .limits
                        .insert(record.material_code.clone(), record.daily_capacity_limit);
                }
            }
        }

        (table, duplicates)
    }

    /// 設置物料日產能（覆蓋既有值）
    pub fn insert(&mut self, material_code: impl Into<String>, daily_capacity_limit: u32) {
        self.limits.insert(material_code.into(), daily_capacity_limit);
    }

    /// 查詢物料日產能
    pub fn daily_capacity(&self, material_code: &str) -> Option<u32> {
        self.limits.get(material_code).copied()
    }

    pub fn contains(&self, material_code: &str) -> bool {
        self.limits.contains_key(material_code)
    }

    pub fn len(&self) -> usize {
        self.limits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }
}

impl FromIterator<(String, u32)> for CapacityTable {
    fn from_iter<I: IntoIterator<Item = (String, u32)>>(iter: I) -> Self {
        Self {
            limits: iter.into_iter().collect(),
        }
    }
}
