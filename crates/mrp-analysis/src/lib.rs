//! # MRP Analysis
//!
//! 交付能力分析（關鍵路徑、預警）與瓶頸檢測（產能缺口、提升建議）

pub mod bottleneck;
pub mod delivery;

// Re-export 主要類型
pub use bottleneck::{top_bottlenecks, BottleneckDetector};
pub use delivery::{delayed_orders, DeliveryAlerts, DeliveryAnalyzer, DeliverySummary};
