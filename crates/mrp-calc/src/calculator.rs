//! MRP 主計算器：BOM 展開與物料需求彙總

use chrono::NaiveDate;
use mrp_core::{
    BomEdge, CustomerOrder, DemandDetail, MaterialRequirement, MrpError, PlanningConfig,
};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

use crate::bom_graph::BomGraph;
use crate::lead_time::LeadTimeCalculator;
use crate::{MrpResult, MrpWarning};

/// 展開工作清單中的一步：沿著一條 BOM 邊往下
#[derive(Debug, Clone, Copy)]
struct ExplosionStep<'g> {
    edge: &'g BomEdge,
    parent_quantity: Decimal,
    parent_required_date: NaiveDate,
    /// 此邊距離成品的層數（直接子件 = 1）
    depth: u32,
}

/// 物料需求累加器（以物料編碼索引的 arena）
#[derive(Debug, Default)]
struct RequirementAccumulator {
    index: HashMap<String, usize>,
    requirements: Vec<MaterialRequirement>,

    /// 與 `requirements` 對齊：各物料已出現的訂單號
    order_ids: Vec<HashSet<String>>,
}

impl RequirementAccumulator {
    fn add(&mut self, edge: &BomEdge, detail: DemandDetail) -> mrp_core::Result<()> {
        match self.index.get(&edge.child_code) {
            Some(&i) => {
                let orders = &mut self.order_ids[i];
                let new_order = !orders.contains(&detail.order_id);
                if new_order {
                    orders.insert(detail.order_id.clone());
                }
                self.requirements[i].add_demand(detail, new_order)?;
            }
            None => {
                self.index
                    .insert(edge.child_code.clone(), self.requirements.len());
                self.order_ids
                    .push(HashSet::from([detail.order_id.clone()]));
                self.requirements.push(MaterialRequirement::new(
                    edge.child_code.clone(),
                    edge.level,
                    edge.lead_time_days,
                    detail,
                ));
            }
        }
        Ok(())
    }

    /// 按（層級, 最早要求日期）排序；相同時保留首次展開順序
    fn into_sorted(self) -> Vec<MaterialRequirement> {
        let mut requirements = self.requirements;
        requirements.sort_by(|a, b| {
            a.level
                .cmp(&b.level)
                .then(a.earliest_required_date.cmp(&b.earliest_required_date))
        });
        requirements
    }
}

/// MRP 計算器
pub struct MrpCalculator<'a> {
    /// BOM 圖
    bom_graph: &'a BomGraph,

    /// 計劃參數
    config: &'a PlanningConfig,
}

impl<'a> MrpCalculator<'a> {
    /// 創建新的 MRP 計算器
    pub fn new(bom_graph: &'a BomGraph, config: &'a PlanningConfig) -> Self {
        Self { bom_graph, config }
    }

    /// 主 MRP 計算入口
    ///
    /// 先確認 BOM 無循環，再逐張訂單展開並彙總物料需求。
    pub fn calculate(&self, orders: &[CustomerOrder]) -> mrp_core::Result<MrpResult> {
        tracing::info!(
            "開始 MRP 計算：訂單 {} 筆，BOM 關係 {} 筆",
            orders.len(),
            self.bom_graph.edge_count()
        );

        let start_time = std::time::Instant::now();

        self.bom_graph.validate_acyclic()?;

        let mut accumulator = RequirementAccumulator::default();
        let mut result = MrpResult::empty();

        for order in orders {
            if !self.bom_graph.has_children(&order.product_code) {
                tracing::warn!(
                    "訂單 {} 的產品 {} 沒有 BOM，無法展開",
                    order.order_id,
                    order.product_code
                );
                result.add_warning(MrpWarning::new(
                    order.product_code.clone(),
                    format!("訂單 {} 的產品沒有 BOM 子件", order.order_id),
                ));
                continue;
            }

            self.explode_order(order, &mut accumulator)?;
        }

        result.requirements = accumulator.into_sorted();
        result.calculation_time_ms = Some(start_time.elapsed().as_millis());

        tracing::info!(
            "MRP 計算完成，物料 {} 個，耗時 {:?}",
            result.requirements.len(),
            start_time.elapsed()
        );

        Ok(result)
    }

    /// 展開單張訂單
    ///
    /// 以顯式工作清單代替遞迴；彈出順序與遞迴前序相同，
    /// 因此需求明細的順序即為「子件、子件的子樹、下一個子件」。
    fn explode_order(
        &self,
        order: &CustomerOrder,
        accumulator: &mut RequirementAccumulator,
    ) -> mrp_core::Result<()> {
        let mut stack: Vec<ExplosionStep<'_>> = self
            .bom_graph
            .children_of(&order.product_code)
            .rev()
            .map(|edge| ExplosionStep {
                edge,
                parent_quantity: order.quantity,
                parent_required_date: order.due_date,
                depth: 1,
            })
            .collect();

        while let Some(step) = stack.pop() {
            if step.depth > self.config.max_bom_level {
                return Err(MrpError::BomDepthExceeded {
                    material_code: step.edge.child_code.clone(),
                    max_level: self.config.max_bom_level,
                });
            }

            let edge = step.edge;
            let child_quantity = edge.child_quantity(step.parent_quantity)?;
            let child_required_date = LeadTimeCalculator::calculate_child_required_date(
                step.parent_required_date,
                edge.lead_time_days,
                &self.config.calendar,
            )?;

            tracing::debug!(
                "BOM 展開: {} → {} (數量: {}, 日期: {})",
                edge.parent_code,
                edge.child_code,
                child_quantity,
                child_required_date
            );

            accumulator.add(
                edge,
                DemandDetail {
                    order_id: order.order_id.clone(),
                    quantity: child_quantity,
                    latest_required_date: child_required_date,
                    parent_code: edge.parent_code.clone(),
                },
            )?;

            stack.extend(
                self.bom_graph
                    .children_of(&edge.child_code)
                    .rev()
                    .map(|child| ExplosionStep {
                        edge: child,
                        parent_quantity: child_quantity,
                        parent_required_date: child_required_date,
                        depth: step.depth + 1,
                    }),
            );
        }

        Ok(())
    }
}
