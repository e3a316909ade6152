//! 物料需求模型（BOM 展開結果）

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{MrpError, Result};

/// 需求明細：某張訂單經由某個父件對此物料產生的需求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandDetail {
    /// 來源訂單號
    pub order_id: String,

    /// 需求量
    pub quantity: Decimal,

    /// 最晚完成日期
    pub latest_required_date: NaiveDate,

    /// 父物料
    pub parent_code: String,
}

/// 物料需求（跨訂單彙總）
///
/// 只能由第一筆需求明細建立，因此日期欄位永遠有值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRequirement {
    /// 物料編碼
    pub material_code: String,

    /// BOM 層級（取第一次出現時的層級）
    pub level: u32,

    /// 生產周期（工作日）
    pub lead_time_days: u32,

    /// 總需求量
    pub total_quantity: Decimal,

    /// 最早要求日期（明細中的最小值）
    pub earliest_required_date: NaiveDate,

    /// 最晚要求日期（明細中的最大值）
    pub latest_required_date: NaiveDate,

    /// 涉及訂單數
    pub distinct_order_count: usize,

    /// 需求明細（按展開順序）
    pub demand_details: Vec<DemandDetail>,
}

impl MaterialRequirement {
    /// 以第一筆需求明細創建物料需求
    pub fn new(
        material_code: String,
        level: u32,
        lead_time_days: u32,
        first_demand: DemandDetail,
    ) -> Self {
        Self {
            material_code,
            level,
            lead_time_days,
            total_quantity: first_demand.quantity,
            earliest_required_date: first_demand.latest_required_date,
            latest_required_date: first_demand.latest_required_date,
            distinct_order_count: 1,
            demand_details: vec![first_demand],
        }
    }

    /// 累加一筆需求明細
    ///
    /// `new_order` 由呼叫方判定（此訂單第一次對此物料產生需求），
    /// 這裡不掃描既有明細。
    pub fn add_demand(&mut self, detail: DemandDetail, new_order: bool) -> Result<()> {
        self.total_quantity = self
            .total_quantity
            .checked_add(detail.quantity)
            .ok_or_else(|| MrpError::QuantityOverflow {
                material_code: self.material_code.clone(),
            })?;
        if new_order {
            self.distinct_order_count += 1;
        }
        self.earliest_required_date = self.earliest_required_date.min(detail.latest_required_date);
        self.latest_required_date = self.latest_required_date.max(detail.latest_required_date);
        self.demand_details.push(detail);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(order_id: &str, qty: i64, day: u32) -> DemandDetail {
        DemandDetail {
            order_id: order_id.to_string(),
            quantity: Decimal::from(qty),
            latest_required_date: NaiveDate::from_ymd_opt(2025, 11, day).unwrap(),
            parent_code: "BIKE".to_string(),
        }
    }

    #[test]
    fn test_accumulate_demand() {
        let mut req = MaterialRequirement::new("WHEEL".to_string(), 1, 3, detail("SO-1", 200, 10));
        req.add_demand(detail("SO-2", 50, 4), true).unwrap();
        req.add_demand(detail("SO-1", 20, 18), false).unwrap();

        assert_eq!(req.total_quantity, Decimal::from(270));
        assert_eq!(req.demand_details.len(), 3);
        assert_eq!(
            req.earliest_required_date,
            NaiveDate::from_ymd_opt(2025, 11, 4).unwrap()
        );
        assert_eq!(
            req.latest_required_date,
            NaiveDate::from_ymd_opt(2025, 11, 18).unwrap()
        );
        assert_eq!(req.distinct_order_count, 2);
    }

    #[test]
    fn test_single_demand() {
        let req = MaterialRequirement::new("WHEEL".to_string(), 1, 3, detail("SO-1", 5, 7));

        assert_eq!(req.total_quantity, Decimal::from(5));
        assert_eq!(req.earliest_required_date, req.latest_required_date);
        assert_eq!(req.distinct_order_count, 1);
    }

    #[test]
    fn test_total_quantity_overflow() {
        let mut req = MaterialRequirement::new("WHEEL".to_string(), 1, 3, detail("SO-1", 5, 7));
        req.total_quantity = Decimal::MAX;

        let err = req.add_demand(detail("SO-2", 1, 8), true).unwrap_err();
        assert!(matches!(err, MrpError::QuantityOverflow { .. }));
        assert_eq!(req.total_quantity, Decimal::MAX);
        assert_eq!(req.distinct_order_count, 1);
        assert_eq!(req.demand_details.len(), 1);
    }
}
