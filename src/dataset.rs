//! JSON 資料集與配置檔載入

use mrp_core::{BomEdge, CapacityRecord, CustomerOrder, PlanningConfig};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 資料載入錯誤
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("無法讀取檔案 {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("無法解析檔案 {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// 一次計算所需的全部輸入
///
/// ```json
/// { "orders": [...], "bom": [...], "capacity": [...] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub orders: Vec<CustomerOrder>,
    pub bom: Vec<BomEdge>,
    pub capacity: Vec<CapacityRecord>,
}

impl Dataset {
    pub fn new(orders: Vec<CustomerOrder>, bom: Vec<BomEdge>, capacity: Vec<CapacityRecord>) -> Self {
        Self {
            orders,
            bom,
            capacity,
        }
    }

    /// 從 JSON 檔載入
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let dataset: Self = read_json(path.as_ref())?;
        tracing::info!(
            "載入資料集：訂單 {} 筆，BOM {} 筆，產能 {} 筆",
            dataset.orders.len(),
            dataset.bom.len(),
            dataset.capacity.len()
        );
        Ok(dataset)
    }
}

/// 載入計劃參數；未提供的欄位使用預設值
pub fn load_config(path: impl AsRef<Path>) -> Result<PlanningConfig, DatasetError> {
    read_json(path.as_ref())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DatasetError> {
    let content = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| DatasetError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
